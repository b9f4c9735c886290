//! Lazily decoded dictionary node

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::array::ArrayNode;
use super::object::PdfValue;
use super::text::decode_name;
use crate::layout::Rect;

/// Back-reference keys whose values are never expanded
///
/// Page tree nodes, form fields and annotations all point back at their parent,
/// so expanding these would turn the tree walk into an endless loop.
const BACK_REFERENCE_KEYS: [&str; 2] = ["Parent", "P"];

/// A PDF dictionary whose values are decoded on first access
///
/// Clones share the same value cache. The node borrows the raw dictionary from the
/// document, so it cannot outlive it.
#[derive(Clone)]
pub struct DictNode<'a> {
    doc: &'a Document,
    raw: &'a Dictionary,
    id: Option<ObjectId>,
    cache: Rc<RefCell<HashMap<String, PdfValue<'a>>>>,
}

impl<'a> DictNode<'a> {
    pub fn new(doc: &'a Document, raw: &'a Dictionary, id: Option<ObjectId>) -> Self {
        Self {
            doc,
            raw,
            id,
            cache: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Dictionary (or stream dictionary) stored under `id`
    pub fn from_id(doc: &'a Document, id: ObjectId) -> Option<Self> {
        PdfValue::from_id(doc, id).as_dict_like().cloned()
    }

    /// Object id this dictionary was loaded from, if it was reached indirectly
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    /// The underlying lopdf dictionary
    pub fn raw(&self) -> &'a Dictionary {
        self.raw
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Decoded value for `key`
    ///
    /// `Parent` and `P` always yield `None`; use [`DictNode::reference`] to get
    /// their object ids without expanding them.
    pub fn get(&self, key: &str) -> Option<PdfValue<'a>> {
        if BACK_REFERENCE_KEYS.contains(&key) {
            return None;
        }

        if let Some(value) = self.cache.borrow().get(key) {
            return Some(value.clone());
        }

        let raw = self.raw.get(key.as_bytes()).ok()?;
        let value = PdfValue::from_object(self.doc, raw);
        self.cache
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        Some(value)
    }

    pub fn get_array(&self, key: &str) -> Option<ArrayNode<'a>> {
        match self.get(key)? {
            PdfValue::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn get_dict(&self, key: &str) -> Option<DictNode<'a>> {
        match self.get(key)? {
            PdfValue::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Value of a text string entry
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            PdfValue::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn get_name(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            PdfValue::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Value of an entry that may be written as either a string or a name
    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            PdfValue::String(text) | PdfValue::Name(text) => Some(text),
            _ => None,
        }
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_i64()
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn get_rect(&self, key: &str) -> Option<Rect> {
        self.get_array(key)?.as_rect()
    }

    /// Whether the name entry `key` equals `expected`
    pub fn has_name(&self, key: &str, expected: &str) -> bool {
        self.get_name(key).is_some_and(|name| name == expected)
    }

    /// Object id an entry points at, without decoding it
    ///
    /// Works for every key, including `Parent` and `P`.
    pub fn reference(&self, key: &str) -> Option<ObjectId> {
        match self.raw.get(key.as_bytes()) {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        }
    }

    /// Whether the raw dictionary has `key`, suppressed keys included
    pub fn contains_key(&self, key: &str) -> bool {
        self.raw.get(key.as_bytes()).is_ok()
    }

    /// All keys in the order the decoder reports them, including `Parent` and `P`
    pub fn keys(&self) -> Vec<String> {
        self.raw.iter().map(|(key, _)| decode_name(key)).collect()
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Both nodes were loaded from the same indirect object
    pub fn same_object(&self, other: &DictNode<'_>) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }

    /// Identity when both sides know their object id, structural equality otherwise
    pub fn matches(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    fn key_set(&self) -> BTreeSet<String> {
        self.keys().into_iter().collect()
    }
}

/// Structural equality: same `Rect`, same key set, same `T`
///
/// This can report two distinct annotations with identical rectangles, keys and
/// titles as equal. Prefer [`DictNode::matches`] when object ids are available.
impl PartialEq for DictNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.get_rect("Rect") == other.get_rect("Rect")
            && self.key_set() == other.key_set()
            && self.get_string("T") == other.get_string("T")
    }
}

impl fmt::Debug for DictNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictNode")
            .field("id", &self.id)
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Object {
        Object::Array(vec![
            Object::Integer(x0),
            Object::Integer(y0),
            Object::Integer(x1),
            Object::Integer(y1),
        ])
    }

    #[test]
    fn test_parent_and_p_are_suppressed_but_listed() {
        let mut doc = Document::with_version("1.7");
        let parent_id = doc.add_object(dictionary! { "Type" => "Pages" });
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });
        let annot_id = doc.add_object(dictionary! {
            "Subtype" => "Widget",
            "Parent" => parent_id,
            "P" => page_id,
            "Inline" => dictionary! { "Kind" => "inline" },
        });

        let node = DictNode::from_id(&doc, annot_id).unwrap();
        assert!(node.get("Parent").is_none());
        assert!(node.get("P").is_none());
        assert!(node.get_dict("Parent").is_none());

        let keys = node.keys();
        assert_eq!(keys, vec!["Subtype", "Parent", "P", "Inline"]);
        assert!(node.contains_key("Parent"));

        assert_eq!(node.reference("Parent"), Some(parent_id));
        assert_eq!(node.reference("P"), Some(page_id));
        assert_eq!(
            node.get_dict("Inline").and_then(|d| d.get_name("Kind")).as_deref(),
            Some("inline")
        );
    }

    #[test]
    fn test_self_reference_does_not_recurse() {
        let mut doc = Document::with_version("1.7");
        let id = doc.new_object_id();
        doc.objects.insert(
            id,
            Object::Dictionary(dictionary! { "Self" => id, "Kids" => vec![Object::Reference(id)] }),
        );

        let node = DictNode::from_id(&doc, id).unwrap();
        let again = node.get_dict("Self").unwrap();
        assert!(again.same_object(&node));

        let kids = node.get_array("Kids").unwrap();
        assert!(kids.get(0).and_then(|v| v.as_dict()).unwrap().same_object(&node));
    }

    #[test]
    fn test_values_are_cached_across_clones() {
        let mut doc = Document::with_version("1.7");
        let id = doc.add_object(dictionary! { "Rect" => rect(0, 0, 10, 10) });

        let node = DictNode::from_id(&doc, id).unwrap();
        let copy = node.clone();
        assert!(node.get_rect("Rect").is_some());
        assert_eq!(copy.cache.borrow().len(), 1);
    }

    #[test]
    fn test_typed_accessors() {
        let doc = Document::with_version("1.7");
        let raw = dictionary! {
            "T" => Object::string_literal("name1"),
            "FT" => "Tx",
            "Ff" => Object::Integer(4096),
            "Open" => Object::Boolean(true),
            "Width" => Object::Real(2.5),
        };
        let node = DictNode::new(&doc, &raw, None);

        assert_eq!(node.get_string("T").as_deref(), Some("name1"));
        assert_eq!(node.get_name("T"), None);
        assert_eq!(node.get_text("FT").as_deref(), Some("Tx"));
        assert!(node.has_name("FT", "Tx"));
        assert_eq!(node.get_i64("Ff"), Some(4096));
        assert_eq!(node.get_bool("Open"), Some(true));
        assert_eq!(node.get_f64("Width"), Some(2.5));
        assert!(node.get("Missing").is_none());
        assert_eq!(node.len(), 5);
    }

    #[test]
    fn test_structural_equality() {
        let doc = Document::with_version("1.7");
        let a = dictionary! {
            "Rect" => rect(0, 0, 10, 20),
            "T" => Object::string_literal("field"),
            "Subtype" => "Widget",
        };
        let b = dictionary! {
            "Subtype" => "Widget",
            "T" => Object::string_literal("field"),
            "Rect" => rect(10, 20, 0, 0),
        };
        let c = dictionary! {
            "Rect" => rect(0, 0, 10, 20),
            "T" => Object::string_literal("other"),
            "Subtype" => "Widget",
        };
        let d = dictionary! {
            "Rect" => rect(0, 0, 10, 20),
            "T" => Object::string_literal("field"),
        };

        let a = DictNode::new(&doc, &a, None);
        let b = DictNode::new(&doc, &b, None);
        let c = DictNode::new(&doc, &c, None);
        let d = DictNode::new(&doc, &d, None);

        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_matches_prefers_identity() {
        let mut doc = Document::with_version("1.7");
        let first = doc.add_object(dictionary! { "Subtype" => "Link" });
        let second = doc.add_object(dictionary! { "Subtype" => "Link" });

        let a = DictNode::from_id(&doc, first).unwrap();
        let b = DictNode::from_id(&doc, second).unwrap();
        assert_eq!(a, b);
        assert!(!a.matches(&b));
        assert!(a.matches(&DictNode::from_id(&doc, first).unwrap()));

        let raw = dictionary! { "Subtype" => "Link" };
        let direct = DictNode::new(&doc, &raw, None);
        assert!(direct.matches(&a));
    }

    #[test]
    fn test_debug_lists_keys_in_order() {
        let doc = Document::with_version("1.7");
        let raw = dictionary! { "Type" => "Annot", "Subtype" => "Link" };
        let node = DictNode::new(&doc, &raw, None);
        assert_eq!(
            format!("{:?}", node),
            r#"DictNode { id: None, keys: ["Type", "Subtype"] }"#
        );
    }
}
