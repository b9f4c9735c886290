//! Typed view of a single decoded PDF object

use log::{debug, warn};
use lopdf::{Document, Object, ObjectId};

use super::array::ArrayNode;
use super::dictionary::DictNode;
use super::text::{decode_name, decode_text_string};

/// Maximum nesting of arrays decoded eagerly, and of any tree walk
pub const MAX_DEPTH: usize = 64;

/// Longest chain of indirect references followed before giving up
const MAX_REFERENCE_CHAIN: usize = 32;

/// One decoded PDF primitive
///
/// Indirect references never appear here: they are followed when the value is
/// created, and the object id of a referenced array, dictionary or stream is kept
/// on the node. Anything that cannot be decoded becomes `Null`.
#[derive(Debug, Clone)]
pub enum PdfValue<'a> {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Name(String),
    /// Text string, already decoded to Unicode
    String(String),
    Array(ArrayNode<'a>),
    Dictionary(DictNode<'a>),
    /// A stream's own dictionary; the payload is not decoded
    Stream(DictNode<'a>),
    Null,
}

impl<'a> PdfValue<'a> {
    /// Decode a raw object, following indirect references
    pub fn from_object(doc: &'a Document, object: &'a Object) -> Self {
        Self::decode(doc, object, &mut Vec::new())
    }

    /// Decode the object stored under `id`
    pub fn from_id(doc: &'a Document, id: ObjectId) -> Self {
        match doc.get_object(id) {
            Ok(object) => Self::with_id(doc, Some(id), object, &mut Vec::new()),
            Err(e) => {
                debug!("Object {:?} could not be loaded: {}", id, e);
                PdfValue::Null
            }
        }
    }

    /// Decode with the chain of arrays currently being decoded, for cycle detection
    pub(crate) fn decode(
        doc: &'a Document,
        object: &'a Object,
        visiting: &mut Vec<Option<ObjectId>>,
    ) -> Self {
        match resolve(doc, object) {
            Some((id, resolved)) => Self::with_id(doc, id, resolved, visiting),
            None => PdfValue::Null,
        }
    }

    fn with_id(
        doc: &'a Document,
        id: Option<ObjectId>,
        object: &'a Object,
        visiting: &mut Vec<Option<ObjectId>>,
    ) -> Self {
        match object {
            Object::Null => PdfValue::Null,
            Object::Boolean(b) => PdfValue::Boolean(*b),
            Object::Integer(i) => PdfValue::Integer(*i),
            Object::Real(r) => PdfValue::Real(f64::from(*r)),
            Object::Name(name) => PdfValue::Name(decode_name(name)),
            Object::String(bytes, _) => match decode_text_string(bytes) {
                Some(text) => PdfValue::String(text),
                None => {
                    debug!("Undecodable text string in object {:?}", id);
                    PdfValue::Null
                }
            },
            Object::Array(items) => match ArrayNode::decode(doc, items, id, visiting) {
                Some(array) => PdfValue::Array(array),
                None => PdfValue::Null,
            },
            Object::Dictionary(dict) => PdfValue::Dictionary(DictNode::new(doc, dict, id)),
            Object::Stream(stream) => PdfValue::Stream(DictNode::new(doc, &stream.dict, id)),
            // Nested references are handled by `resolve`, so this cannot be reached
            Object::Reference(_) => PdfValue::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PdfValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PdfValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PdfValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an integer or real
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PdfValue::Integer(i) => Some(*i as f64),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            PdfValue::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PdfValue::String(text) => Some(text),
            _ => None,
        }
    }

    /// Text of either a string or a name
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PdfValue::String(text) | PdfValue::Name(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayNode<'a>> {
        match self {
            PdfValue::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DictNode<'a>> {
        match self {
            PdfValue::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&DictNode<'a>> {
        match self {
            PdfValue::Stream(dict) => Some(dict),
            _ => None,
        }
    }

    /// Dictionary of a plain dictionary or of a stream
    pub fn as_dict_like(&self) -> Option<&DictNode<'a>> {
        match self {
            PdfValue::Dictionary(dict) | PdfValue::Stream(dict) => Some(dict),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            PdfValue::Boolean(_) => "boolean",
            PdfValue::Integer(_) => "integer",
            PdfValue::Real(_) => "real",
            PdfValue::Name(_) => "name",
            PdfValue::String(_) => "string",
            PdfValue::Array(_) => "array",
            PdfValue::Dictionary(_) => "dictionary",
            PdfValue::Stream(_) => "stream",
            PdfValue::Null => "null",
        }
    }
}

/// Follow indirect references until a direct object is reached
///
/// Returns the id of the last reference followed, if any. Dangling references and
/// reference loops resolve to `None`.
pub(crate) fn resolve<'a>(
    doc: &'a Document,
    object: &'a Object,
) -> Option<(Option<ObjectId>, &'a Object)> {
    let mut current = object;
    let mut id = None;

    for _ in 0..MAX_REFERENCE_CHAIN {
        match current {
            Object::Reference(target) => {
                id = Some(*target);
                current = match doc.get_object(*target) {
                    Ok(object) => object,
                    Err(e) => {
                        debug!("Dangling reference {:?}: {}", target, e);
                        return None;
                    }
                };
            }
            _ => return Some((id, current)),
        }
    }

    warn!("Reference chain starting at {:?} is too long or circular", id);
    None
}
