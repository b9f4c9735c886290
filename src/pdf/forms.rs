//! AcroForm field enumeration
//!
//! Walks `catalog.AcroForm.Fields` down to the widget annotations and builds one
//! [`FormField`] per widget. Inheritable entries (`FT`, `Ff`, `V`, `T`) are taken
//! from the widget itself or from the nearest ancestor field that defines them.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use log::{debug, info};
use lopdf::ObjectId;

use super::cancel::CancelToken;
use super::dictionary::DictNode;
use super::document::PdfDocument;
use super::object::PdfValue;
use super::pages::{self, PageLocator, TerminalNode};
use crate::error::Result;
use crate::layout::Rect;

/// Kind of form field, from the `FT` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `Btn`: push buttons, checkboxes and radio buttons
    Button,
    /// `Tx`
    Text,
    /// `Ch`: list boxes and combo boxes
    Choice,
    /// `Sig`
    Signature,
}

impl FieldType {
    pub fn from_pdf_name(name: &str) -> Option<Self> {
        match name {
            "Btn" => Some(FieldType::Button),
            "Tx" => Some(FieldType::Text),
            "Ch" => Some(FieldType::Choice),
            "Sig" => Some(FieldType::Signature),
            _ => None,
        }
    }

    pub fn pdf_name(&self) -> &'static str {
        match self {
            FieldType::Button => "Btn",
            FieldType::Text => "Tx",
            FieldType::Choice => "Ch",
            FieldType::Signature => "Sig",
        }
    }
}

/// Field flag bits from the `Ff` entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFlags(pub u32);

impl FieldFlags {
    pub const READ_ONLY: u32 = 1 << 0;
    pub const REQUIRED: u32 = 1 << 1;
    pub const NO_EXPORT: u32 = 1 << 2;
    pub const MULTILINE: u32 = 1 << 12;
    pub const PASSWORD: u32 = 1 << 13;
    pub const NO_TOGGLE_TO_OFF: u32 = 1 << 14;
    pub const RADIO: u32 = 1 << 15;
    pub const PUSHBUTTON: u32 = 1 << 16;
    pub const COMBO: u32 = 1 << 17;
    pub const EDIT: u32 = 1 << 18;
    pub const SORT: u32 = 1 << 19;
    pub const FILE_SELECT: u32 = 1 << 20;
    pub const MULTI_SELECT: u32 = 1 << 21;
    pub const DO_NOT_SPELL_CHECK: u32 = 1 << 22;
    pub const DO_NOT_SCROLL: u32 = 1 << 23;
    pub const COMB: u32 = 1 << 24;
    pub const RADIOS_IN_UNISON: u32 = 1 << 25;
    pub const COMMIT_ON_SEL_CHANGE: u32 = 1 << 26;

    pub fn contains(&self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn is_read_only(&self) -> bool {
        self.contains(Self::READ_ONLY)
    }

    pub fn is_required(&self) -> bool {
        self.contains(Self::REQUIRED)
    }

    pub fn is_radio(&self) -> bool {
        self.contains(Self::RADIO)
    }

    pub fn is_pushbutton(&self) -> bool {
        self.contains(Self::PUSHBUTTON)
    }

    pub fn is_multiline(&self) -> bool {
        self.contains(Self::MULTILINE)
    }

    pub fn is_password(&self) -> bool {
        self.contains(Self::PASSWORD)
    }

    pub fn is_combo(&self) -> bool {
        self.contains(Self::COMBO)
    }
}

/// One widget of an AcroForm field
///
/// Owns all of its data so it can be sent across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// Object id of the widget dictionary, when it is an indirect object
    pub object_id: Option<ObjectId>,
    pub field_type: Option<FieldType>,
    pub rect: Option<Rect>,
    pub flags: FieldFlags,
    /// Partial name `T`, from the widget or its nearest named ancestor
    pub name: Option<String>,
    /// Partial names of all ancestors and the widget joined with `.`
    pub full_name: String,
    /// Appearance state that means "on" for checkboxes and radio buttons
    pub export_value: Option<String>,
    /// Current value `V`
    pub value: Option<String>,
    /// Display texts of a choice field's `Opt` entries
    pub options: Vec<String>,
    /// 1-based page the widget sits on, when it could be determined
    pub page: Option<u32>,
}

impl FormField {
    fn from_terminal<'a>(terminal: &TerminalNode<'a>, locator: &PageLocator<'a>) -> Self {
        let widget = &terminal.node;
        let lineage = Lineage::new(terminal);

        let field_type = lineage
            .find(|dict| dict.get_name("FT"))
            .and_then(|name| FieldType::from_pdf_name(&name));
        let flags = lineage
            .find(|dict| dict.get_i64("Ff"))
            .and_then(|bits| u32::try_from(bits).ok())
            .map(FieldFlags)
            .unwrap_or_default();

        let export_value = match field_type {
            Some(FieldType::Button) => export_value(widget),
            _ => None,
        };

        Self {
            object_id: widget.id(),
            field_type,
            rect: widget.get_rect("Rect"),
            flags,
            name: lineage.find(|dict| dict.get_string("T")),
            full_name: lineage.full_name(),
            export_value,
            value: lineage.find(|dict| dict.get("V")).and_then(value_text),
            options: lineage
                .find(|dict| dict.get_array("Opt"))
                .map(|opt| opt.iter().filter_map(option_text).collect())
                .unwrap_or_default(),
            page: locator.locate(widget),
        }
    }

    pub fn is_checkbox(&self) -> bool {
        self.field_type == Some(FieldType::Button)
            && !self.flags.is_radio()
            && !self.flags.is_pushbutton()
    }

    pub fn is_radio(&self) -> bool {
        self.field_type == Some(FieldType::Button) && self.flags.is_radio()
    }

    /// Whether a checkbox or radio button is currently switched on
    pub fn is_checked(&self) -> bool {
        match (&self.value, &self.export_value) {
            (Some(value), Some(export)) => value == export,
            _ => false,
        }
    }
}

/// A widget and its ancestors, nearest first
struct Lineage<'n, 'a> {
    chain: Vec<&'n DictNode<'a>>,
}

impl<'n, 'a> Lineage<'n, 'a> {
    fn new(terminal: &'n TerminalNode<'a>) -> Self {
        let mut chain = vec![&terminal.node];
        chain.extend(terminal.ancestors.iter().rev());
        Self { chain }
    }

    /// First value produced by the widget or an ancestor
    fn find<T>(&self, lookup: impl Fn(&DictNode<'a>) -> Option<T>) -> Option<T> {
        self.chain.iter().find_map(|dict| lookup(*dict))
    }

    fn full_name(&self) -> String {
        self.chain
            .iter()
            .rev()
            .filter_map(|dict| dict.get_string("T"))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// First appearance state of `AP.N` that is not `Off`
fn export_value(widget: &DictNode<'_>) -> Option<String> {
    let normal = widget.get_dict("AP")?.get_dict("N")?;
    normal
        .keys()
        .into_iter()
        .find(|key| key != "Off" && key != "OFF")
}

fn value_text(value: PdfValue<'_>) -> Option<String> {
    match value {
        PdfValue::String(text) | PdfValue::Name(text) => Some(text),
        PdfValue::Array(items) => {
            let values: Vec<&str> = items.iter().filter_map(PdfValue::as_text).collect();
            if values.is_empty() {
                None
            } else {
                Some(values.join(", "))
            }
        }
        _ => None,
    }
}

/// An `Opt` entry is a text or an `[export display]` pair
fn option_text(entry: &PdfValue<'_>) -> Option<String> {
    match entry {
        PdfValue::String(text) | PdfValue::Name(text) => Some(text.clone()),
        PdfValue::Array(pair) => pair.get(1).and_then(PdfValue::as_text).map(str::to_string),
        _ => None,
    }
}

/// Every widget of every field in the document's AcroForm
///
/// A document without an AcroForm yields no fields.
pub fn form_fields(doc: &PdfDocument, token: &CancelToken) -> Result<Vec<FormField>> {
    let Some(fields) = doc
        .catalog()
        .and_then(|catalog| catalog.get_dict("AcroForm"))
        .and_then(|form| form.get_array("Fields"))
    else {
        debug!("Document has no AcroForm fields");
        return Ok(Vec::new());
    };

    let terminals = pages::terminal_kids(&fields, token)?;
    let locator = PageLocator::new(doc);

    let mut found = Vec::with_capacity(terminals.len());
    for terminal in &terminals {
        token.check()?;
        found.push(FormField::from_terminal(terminal, &locator));
    }

    info!("Found {} form field widgets", found.len());
    Ok(found)
}

/// Enumerate form fields on a worker thread
///
/// The result is delivered once on the returned channel. Cancelling `token` makes the
/// worker stop at its next step and deliver `Err(Error::Cancelled)`.
pub fn spawn_field_scan(
    doc: Arc<PdfDocument>,
    token: CancelToken,
) -> Receiver<Result<Vec<FormField>>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let result = form_fields(&doc, &token);
        if sender.send(result).is_err() {
            debug!("Field scan finished after its receiver was dropped");
        }
    });
    receiver
}
