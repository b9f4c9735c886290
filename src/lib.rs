//! PDF Catalog Library
//!
//! A library for walking the object tree of a PDF document.
//! This library provides functionality to:
//! - Open plain and encrypted PDFs
//! - Decode catalog objects lazily into a typed, cycle-safe tree
//! - Enumerate pages, annotations and AcroForm fields
//! - Resolve link and outline actions, including named destinations
//! - Extract document metadata
//!
//! # Example
//!
//! ```no_run
//! use pdf_catalog::pdf::{form_fields, CancelToken, PdfDocument};
//! use std::path::Path;
//!
//! let doc = PdfDocument::open(Path::new("application.pdf"), None).expect("Failed to open PDF");
//! for field in form_fields(&doc, &CancelToken::new()).expect("Failed to read fields") {
//!     println!("{} on page {:?}", field.full_name, field.page);
//! }
//! ```

pub mod error;
pub mod pdf;
pub mod date;
pub mod layout;

// Re-export commonly used items
pub use error::{Error, Result};
