//! Typed PDF object tree and the walkers built on it

pub mod action;
pub mod array;
pub mod cancel;
pub mod dictionary;
pub mod document;
pub mod forms;
pub mod metadata;
pub mod name_tree;
pub mod object;
pub mod outline;
pub mod pages;
pub mod text;

// Re-export commonly used items
pub use action::{links, Action, ActionResolver, Link};
pub use array::ArrayNode;
pub use cancel::CancelToken;
pub use dictionary::DictNode;
pub use document::PdfDocument;
pub use forms::{form_fields, spawn_field_scan, FieldFlags, FieldType, FormField};
pub use metadata::{count_pages, extract_metadata, DocumentInfo};
pub use name_tree::NameTree;
pub use object::{PdfValue, MAX_DEPTH};
pub use outline::{outline, OutlineItem};
pub use pages::{annotations, page_tree, terminal_kids, PageEntry, PageLocator, TerminalNode};
