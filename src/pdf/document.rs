//! Opening documents and exposing the catalog

use std::path::Path;

use log::{debug, warn};
use lopdf::{Document, ObjectId};

use super::dictionary::DictNode;
use super::object::PdfValue;
use crate::error::{Error, Result};

/// An opened, unlocked PDF document
///
/// This is the entry point for every walk: [`PdfDocument::catalog`] is the root
/// of the typed object tree. Page ids are collected once when the document is opened.
#[derive(Debug)]
pub struct PdfDocument {
    inner: Document,
    page_ids: Vec<ObjectId>,
}

impl PdfDocument {
    /// Open a PDF file, unlocking it with `password` if it is encrypted
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pdf_catalog::pdf::PdfDocument;
    /// use std::path::Path;
    ///
    /// let doc = PdfDocument::open(Path::new("form.pdf"), None).expect("Failed to open");
    /// println!("{} pages", doc.page_count());
    /// ```
    pub fn open(path: &Path, password: Option<&str>) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        debug!("Opening {}", path.display());
        let doc = Document::load(path).map_err(Error::UnableToOpen)?;
        Self::unlock(doc, password)
    }

    /// Open a PDF held in memory
    pub fn from_bytes(bytes: &[u8], password: Option<&str>) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(Error::UnableToOpen)?;
        Self::unlock(doc, password)
    }

    /// Wrap a document that is already loaded and decrypted
    pub fn from_lopdf(inner: Document) -> Self {
        let page_ids = inner.get_pages().into_values().collect();
        Self { inner, page_ids }
    }

    /// Apply the unlock policy to a freshly loaded document
    ///
    /// lopdf decrypts files that open with the empty password while loading them and
    /// records `encryption_state`; the trailer keeps its `Encrypt` entry. Any other
    /// encrypted file is loaded without its objects, so a password that authenticates
    /// but leaves no catalog behind still counts as a failed unlock.
    fn unlock(mut doc: Document, password: Option<&str>) -> Result<Self> {
        if !doc.is_encrypted() || doc.encryption_state.is_some() {
            return Ok(Self::from_lopdf(doc));
        }

        let Some(password) = password else {
            debug!("Document needs a user password");
            return Err(Error::PasswordRequired);
        };
        doc.decrypt(password).map_err(|e| {
            debug!("Decryption failed: {}", e);
            Error::CouldNotUnlock
        })?;
        if doc.catalog().is_err() {
            warn!("Password accepted but the document catalog could not be read");
            return Err(Error::CouldNotUnlock);
        }

        Ok(Self::from_lopdf(doc))
    }

    /// The underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// PDF header version, e.g. "1.7"
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// Root catalog dictionary, or `None` when the trailer has no usable `Root`
    pub fn catalog(&self) -> Option<DictNode<'_>> {
        let root = self.inner.trailer.get(b"Root").ok()?;
        PdfValue::from_object(&self.inner, root).as_dict().cloned()
    }

    /// Decoded trailer entry, e.g. `Info`
    pub fn trailer_value(&self, key: &str) -> Option<PdfValue<'_>> {
        let raw = self.inner.trailer.get(key.as_bytes()).ok()?;
        Some(PdfValue::from_object(&self.inner, raw))
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Page object ids in document order
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    /// Page dictionary at a zero-based index
    pub fn page(&self, index: usize) -> Option<DictNode<'_>> {
        let id = *self.page_ids.get(index)?;
        DictNode::from_id(&self.inner, id)
    }

    /// 1-based page number of the page dictionary with this object id
    pub fn page_number_of(&self, id: ObjectId) -> Option<u32> {
        self.page_ids
            .iter()
            .position(|page_id| *page_id == id)
            .map(|index| index as u32 + 1)
    }
}
