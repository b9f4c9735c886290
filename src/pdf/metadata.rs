//! PDF metadata extraction

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use log::debug;

use super::dictionary::DictNode;
use super::document::PdfDocument;
use crate::date::parse_pdf_date;
use crate::error::Result;

/// PDF metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    /// PDF header version, e.g. "1.7"
    pub version: String,
    /// Number of leaf pages found in the page tree
    pub page_count: usize,
    /// `Count` declared on the root Pages node, which may disagree with `page_count`
    pub declared_page_count: Option<usize>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<DateTime<FixedOffset>>,
    pub modification_date: Option<DateTime<FixedOffset>>,
    /// Whether the catalog carries an AcroForm with at least one field
    pub has_form: bool,
}

impl DocumentInfo {
    pub fn from_document(doc: &PdfDocument) -> Self {
        let catalog = doc.catalog();
        let info = doc
            .trailer_value("Info")
            .and_then(|value| value.as_dict().cloned());
        if info.is_none() {
            debug!("Document has no Info dictionary");
        }

        let text = |key: &str| info.as_ref().and_then(|dict| dict.get_text(key));
        let date = |key: &str| text(key).and_then(|raw| parse_pdf_date(&raw));

        Self {
            version: doc.version().to_string(),
            page_count: doc.page_count(),
            declared_page_count: catalog.as_ref().and_then(declared_page_count),
            title: text("Title"),
            author: text("Author"),
            subject: text("Subject"),
            keywords: text("Keywords"),
            creator: text("Creator"),
            producer: text("Producer"),
            creation_date: date("CreationDate"),
            modification_date: date("ModDate"),
            has_form: catalog
                .as_ref()
                .and_then(|c| c.get_dict("AcroForm"))
                .and_then(|form| form.get_array("Fields"))
                .is_some_and(|fields| !fields.is_empty()),
        }
    }
}

impl PdfDocument {
    /// Metadata of this document
    pub fn info(&self) -> DocumentInfo {
        DocumentInfo::from_document(self)
    }
}

fn declared_page_count(catalog: &DictNode<'_>) -> Option<usize> {
    let count = catalog.get_dict("Pages")?.get_i64("Count")?;
    usize::try_from(count).ok()
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path, password: Option<&str>) -> Result<DocumentInfo> {
    let doc = PdfDocument::open(path, password)?;
    Ok(doc.info())
}

/// Count the pages of a PDF file by walking its page tree
pub fn count_pages(path: &Path, password: Option<&str>) -> Result<usize> {
    Ok(PdfDocument::open(path, password)?.page_count())
}
