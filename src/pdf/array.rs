//! Eagerly decoded array node

use std::fmt;
use std::rc::Rc;

use log::warn;
use lopdf::{Document, Object, ObjectId};

use super::dictionary::DictNode;
use super::object::{PdfValue, MAX_DEPTH};
use crate::layout::Rect;

/// An immutable, ordered sequence of decoded values
///
/// Entries are decoded when the array is created. Dictionaries inside the array
/// stay lazy, so only nested arrays are followed here.
#[derive(Clone)]
pub struct ArrayNode<'a> {
    id: Option<ObjectId>,
    items: Rc<[PdfValue<'a>]>,
}

impl<'a> ArrayNode<'a> {
    /// Decode `items`, refusing to re-enter an array that is already being decoded
    pub(crate) fn decode(
        doc: &'a Document,
        items: &'a [Object],
        id: Option<ObjectId>,
        visiting: &mut Vec<Option<ObjectId>>,
    ) -> Option<Self> {
        if id.is_some() && visiting.contains(&id) {
            warn!("Array {:?} contains itself; treating the inner copy as null", id);
            return None;
        }
        if visiting.len() >= MAX_DEPTH {
            warn!("Arrays nested deeper than {} levels; truncating", MAX_DEPTH);
            return None;
        }

        visiting.push(id);
        let decoded: Vec<PdfValue<'a>> = items
            .iter()
            .map(|item| PdfValue::decode(doc, item, visiting))
            .collect();
        visiting.pop();

        Some(Self {
            id,
            items: decoded.into(),
        })
    }

    /// Object id this array was loaded from, if it was reached indirectly
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PdfValue<'a>> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[PdfValue<'a>] {
        &self.items
    }

    /// Entries in array order
    pub fn iter(&self) -> std::slice::Iter<'_, PdfValue<'a>> {
        self.items.iter()
    }

    /// Dictionaries in the array, skipping entries of any other kind
    pub fn dicts(&self) -> impl Iterator<Item = &DictNode<'a>> + '_ {
        self.items.iter().filter_map(PdfValue::as_dict)
    }

    /// Interpret `[x0 y0 x1 y1]` as a normalized rectangle
    ///
    /// Fails unless there are exactly four numeric entries.
    pub fn as_rect(&self) -> Option<Rect> {
        if self.items.len() != 4 {
            return None;
        }

        let mut coords = [0.0; 4];
        for (slot, item) in coords.iter_mut().zip(self.items.iter()) {
            *slot = item.as_f64()?;
        }

        Some(Rect::from_corners(coords[0], coords[1], coords[2], coords[3]))
    }
}

impl<'a, 'n> IntoIterator for &'n ArrayNode<'a> {
    type Item = &'n PdfValue<'a>;
    type IntoIter = std::slice::Iter<'n, PdfValue<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Debug for ArrayNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[f32]) -> Object {
        Object::Array(values.iter().map(|v| Object::Real(*v)).collect())
    }

    fn decode<'a>(doc: &'a Document, object: &'a Object) -> ArrayNode<'a> {
        PdfValue::from_object(doc, object)
            .as_array()
            .cloned()
            .expect("array")
    }

    #[test]
    fn test_as_rect_normalizes_corners() {
        let doc = Document::with_version("1.7");
        let cases = [
            ([10.0, 20.0, 110.0, 70.0], (10.0, 20.0, 100.0, 50.0)),
            ([110.0, 70.0, 10.0, 20.0], (10.0, 20.0, 100.0, 50.0)),
            ([0.0, 50.0, 30.0, -10.0], (0.0, -10.0, 30.0, 60.0)),
        ];

        for (input, (x, y, w, h)) in cases {
            let object = numbers(&input);
            let rect = decode(&doc, &object).as_rect().expect("rect");
            assert_eq!(rect, Rect { x, y, width: w, height: h });
        }
    }

    #[test]
    fn test_as_rect_accepts_mixed_integers_and_reals() {
        let doc = Document::with_version("1.7");
        let object = Object::Array(vec![
            Object::Integer(0),
            Object::Real(0.5),
            Object::Integer(612),
            Object::Integer(792),
        ]);
        let rect = decode(&doc, &object).as_rect().unwrap();
        assert_eq!(rect.y, 0.5);
        assert_eq!(rect.width, 612.0);
    }

    #[test]
    fn test_as_rect_rejects_wrong_shapes() {
        let doc = Document::with_version("1.7");

        let three = numbers(&[0.0, 0.0, 1.0]);
        assert!(decode(&doc, &three).as_rect().is_none());

        let five = numbers(&[0.0, 0.0, 1.0, 1.0, 1.0]);
        assert!(decode(&doc, &five).as_rect().is_none());

        let named = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Name(b"Wide".to_vec()),
            Object::Integer(1),
        ]);
        assert!(decode(&doc, &named).as_rect().is_none());
    }

    #[test]
    fn test_forward_iteration_order() {
        let doc = Document::with_version("1.7");
        let object = Object::Array(vec![
            Object::Integer(1),
            Object::Integer(2),
            Object::Integer(3),
        ]);
        let array = decode(&doc, &object);
        let values: Vec<i64> = array.iter().filter_map(PdfValue::as_i64).collect();
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(array.len(), 3);
        assert_eq!(array.get(2).and_then(PdfValue::as_i64), Some(3));
        assert!(array.get(3).is_none());
    }

    #[test]
    fn test_self_containing_array_terminates() {
        let mut doc = Document::with_version("1.7");
        let id = doc.new_object_id();
        doc.objects.insert(
            id,
            Object::Array(vec![Object::Integer(1), Object::Reference(id)]),
        );

        let value = PdfValue::from_id(&doc, id);
        let array = value.as_array().unwrap();
        assert_eq!(array.id(), Some(id));
        assert_eq!(array.len(), 2);
        assert!(array.get(1).unwrap().is_null());
    }

    #[test]
    fn test_deeply_nested_arrays_are_truncated() {
        let doc = Document::with_version("1.7");
        let mut object = Object::Integer(0);
        for _ in 0..(MAX_DEPTH + 10) {
            object = Object::Array(vec![object]);
        }

        let array = decode(&doc, &object);
        let mut depth = 1;
        let mut current = array;
        while let Some(inner) = current.get(0).and_then(PdfValue::as_array).cloned() {
            depth += 1;
            current = inner;
        }
        assert_eq!(depth, MAX_DEPTH);
    }
}
