//! Link and outline action resolution

use log::debug;

use super::array::ArrayNode;
use super::cancel::CancelToken;
use super::dictionary::DictNode;
use super::document::PdfDocument;
use super::name_tree::NameTree;
use super::object::PdfValue;
use super::pages;
use crate::error::Result;
use crate::layout::Rect;

/// What activating a link or outline item does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Jump to a 1-based page number
    GoTo(u32),
    OpenUrl(String),
}

/// A `Link` annotation together with its resolved action
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// 1-based page the annotation sits on
    pub page: u32,
    pub rect: Option<Rect>,
    pub action: Action,
}

impl Link {
    /// Whether a point in page space falls on the link's rectangle
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.rect.is_some_and(|rect| rect.contains(x, y))
    }
}

/// A destination before it has been turned into a page
enum Destination<'a> {
    Explicit(ArrayNode<'a>),
    /// Named by a string: looked up in the `Names.Dests` name tree
    String(String),
    /// Named by a name object: looked up in the legacy `Dests` dictionary
    Name(String),
}

impl<'a> Destination<'a> {
    fn from_value(value: PdfValue<'a>) -> Option<Self> {
        match value {
            PdfValue::Array(array) => Some(Destination::Explicit(array)),
            PdfValue::String(name) => Some(Destination::String(name)),
            PdfValue::Name(name) => Some(Destination::Name(name)),
            other => {
                debug!("Destination of unexpected kind {}", other.kind());
                None
            }
        }
    }
}

/// Resolves link and outline dictionaries to [`Action`]s
///
/// Holds the catalog so repeated lookups do not decode it again. Every failure
/// along the way yields `None`.
pub struct ActionResolver<'a> {
    doc: &'a PdfDocument,
    catalog: Option<DictNode<'a>>,
}

impl<'a> ActionResolver<'a> {
    pub fn new(doc: &'a PdfDocument) -> Self {
        Self {
            doc,
            catalog: doc.catalog(),
        }
    }

    /// Action of a link annotation or outline item
    ///
    /// An `A` action dictionary wins over a `Dest` entry. Only `GoTo` and `URI`
    /// actions are understood.
    pub fn resolve(&self, dict: &DictNode<'a>) -> Option<Action> {
        let destination = match dict.get_dict("A") {
            Some(action) => {
                let kind = action.get_name("S")?;
                match kind.as_str() {
                    "GoTo" => Destination::from_value(action.get("D")?)?,
                    "URI" => return action.get_text("URI").map(Action::OpenUrl),
                    _ => {
                        debug!("Unsupported action type {}", kind);
                        return None;
                    }
                }
            }
            None => Destination::from_value(dict.get("Dest")?)?,
        };

        let explicit = match destination {
            Destination::Explicit(array) => array,
            Destination::String(name) => self
                .lookup_name_tree(&name)
                .or_else(|| self.lookup_legacy(&name))?,
            Destination::Name(name) => self
                .lookup_legacy(&name)
                .or_else(|| self.lookup_name_tree(&name))?,
        };

        self.page_of(&explicit).map(Action::GoTo)
    }

    /// Explicit destination array registered under `name`
    pub fn named_destination(&self, name: &str) -> Option<ArrayNode<'a>> {
        self.lookup_name_tree(name)
            .or_else(|| self.lookup_legacy(name))
    }

    /// 1-based page number a named destination points at
    pub fn named_destination_page(&self, name: &str) -> Option<u32> {
        self.page_of(&self.named_destination(name)?)
    }

    /// Names registered in the `Names.Dests` tree and the legacy `Dests` dictionary
    pub fn destination_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .dests_tree()
            .map(|tree| tree.entries().into_iter().map(|(name, _)| name).collect())
            .unwrap_or_default();
        if let Some(legacy) = self.catalog.as_ref().and_then(|c| c.get_dict("Dests")) {
            names.extend(legacy.keys());
        }
        names
    }

    fn dests_tree(&self) -> Option<NameTree<'a>> {
        let root = self.catalog.as_ref()?.get_dict("Names")?.get_dict("Dests")?;
        Some(NameTree::new(root))
    }

    fn lookup_name_tree(&self, name: &str) -> Option<ArrayNode<'a>> {
        explicit_destination(self.dests_tree()?.get(name)?)
    }

    /// Keys of `Dests` are destination names, so `P` and `Parent` are read like any other
    fn lookup_legacy(&self, name: &str) -> Option<ArrayNode<'a>> {
        let dests = self.catalog.as_ref()?.get_dict("Dests")?;
        let raw = dests.raw().get(name.as_bytes()).ok()?;
        explicit_destination(PdfValue::from_object(dests.document(), raw))
    }

    /// Page targeted by `[page /XYZ ...]`
    ///
    /// The first element is a page dictionary (matched against the document's pages by
    /// object id) or, in remote-style destinations, a zero-based page index.
    fn page_of(&self, destination: &ArrayNode<'a>) -> Option<u32> {
        match destination.get(0)? {
            PdfValue::Dictionary(page) => {
                let number = self.doc.page_number_of(page.id()?);
                if number.is_none() {
                    debug!("Destination page {:?} is not in the page tree", page.id());
                }
                number
            }
            PdfValue::Integer(index) => u32::try_from(*index).ok()?.checked_add(1),
            other => {
                debug!("Destination target of unexpected kind {}", other.kind());
                None
            }
        }
    }
}

/// A named destination's value is either the array itself or a dictionary holding it in `D`
fn explicit_destination(value: PdfValue<'_>) -> Option<ArrayNode<'_>> {
    match value {
        PdfValue::Array(array) => Some(array),
        PdfValue::Dictionary(dict) => dict.get_array("D"),
        _ => None,
    }
}

/// Every `Link` annotation in the document whose action resolves
pub fn links(doc: &PdfDocument, token: &CancelToken) -> Result<Vec<Link>> {
    let resolver = ActionResolver::new(doc);
    let mut links = Vec::new();

    for (page, annot) in pages::annotations(doc, token)? {
        token.check()?;
        if !annot.has_name("Subtype", "Link") {
            continue;
        }
        match resolver.resolve(&annot) {
            Some(action) => links.push(Link {
                page,
                rect: annot.get_rect("Rect"),
                action,
            }),
            None => debug!("Link {:?} on page {} has no usable action", annot.id(), page),
        }
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, ObjectId};

    /// Document with `count` pages; returns it with the page ids
    fn document_with_pages(count: usize) -> (Document, Vec<ObjectId>, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let ids: Vec<ObjectId> = (0..count)
            .map(|_| doc.add_object(dictionary! { "Type" => "Page", "Parent" => pages_id }))
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
                "Count" => Object::Integer(count as i64),
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        (doc, ids, catalog_id)
    }

    fn set_catalog_entry(doc: &mut Document, catalog_id: ObjectId, key: &str, value: Object) {
        if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
            catalog.set(key, value);
        }
    }

    fn xyz(target: Object) -> Object {
        Object::Array(vec![
            target,
            "XYZ".into(),
            Object::Null,
            Object::Null,
            Object::Null,
        ])
    }

    #[test]
    fn test_uri_action() {
        let (doc, _, _) = document_with_pages(1);
        let doc = PdfDocument::from_lopdf(doc);
        let link = dictionary! {
            "Subtype" => "Link",
            "A" => dictionary! {
                "S" => "URI",
                "URI" => Object::string_literal("https://example.com"),
            },
        };

        let resolver = ActionResolver::new(&doc);
        let node = DictNode::new(doc.inner(), &link, None);
        assert_eq!(
            resolver.resolve(&node),
            Some(Action::OpenUrl("https://example.com".to_string()))
        );
    }

    #[test]
    fn test_goto_with_page_reference() {
        let (doc, ids, _) = document_with_pages(3);
        let doc = PdfDocument::from_lopdf(doc);
        let link = dictionary! {
            "A" => dictionary! { "S" => "GoTo", "D" => xyz(Object::Reference(ids[2])) },
        };

        let resolver = ActionResolver::new(&doc);
        let node = DictNode::new(doc.inner(), &link, None);
        assert_eq!(resolver.resolve(&node), Some(Action::GoTo(3)));
    }

    #[test]
    fn test_dest_with_integer_index() {
        let (doc, _, _) = document_with_pages(3);
        let doc = PdfDocument::from_lopdf(doc);
        let link = dictionary! { "Dest" => xyz(Object::Integer(2)) };

        let resolver = ActionResolver::new(&doc);
        let node = DictNode::new(doc.inner(), &link, None);
        assert_eq!(resolver.resolve(&node), Some(Action::GoTo(3)));
    }

    #[test]
    fn test_string_named_destination_through_name_tree() {
        let (mut doc, ids, catalog_id) = document_with_pages(3);
        let dests = doc.add_object(dictionary! {
            "Names" => vec![
                Object::string_literal("chapter1"), xyz(Object::Reference(ids[0])),
                Object::string_literal("chapter2"), Object::Dictionary(dictionary! {
                    "D" => xyz(Object::Reference(ids[1])),
                }),
            ],
        });
        set_catalog_entry(
            &mut doc,
            catalog_id,
            "Names",
            Object::Dictionary(dictionary! { "Dests" => dests }),
        );
        let doc = PdfDocument::from_lopdf(doc);
        let resolver = ActionResolver::new(&doc);

        let link = dictionary! { "Dest" => Object::string_literal("chapter2") };
        let node = DictNode::new(doc.inner(), &link, None);
        assert_eq!(resolver.resolve(&node), Some(Action::GoTo(2)));

        let link = dictionary! {
            "A" => dictionary! { "S" => "GoTo", "D" => Object::string_literal("chapter1") },
        };
        let node = DictNode::new(doc.inner(), &link, None);
        assert_eq!(resolver.resolve(&node), Some(Action::GoTo(1)));

        assert_eq!(resolver.named_destination_page("chapter2"), Some(2));
        assert_eq!(resolver.destination_names(), vec!["chapter1", "chapter2"]);

        let link = dictionary! { "Dest" => Object::string_literal("missing") };
        let node = DictNode::new(doc.inner(), &link, None);
        assert_eq!(resolver.resolve(&node), None);
    }

    #[test]
    fn test_name_named_destination_through_legacy_dests() {
        let (mut doc, ids, catalog_id) = document_with_pages(2);
        set_catalog_entry(
            &mut doc,
            catalog_id,
            "Dests",
            Object::Dictionary(dictionary! { "Intro" => xyz(Object::Reference(ids[1])) }),
        );
        let doc = PdfDocument::from_lopdf(doc);
        let resolver = ActionResolver::new(&doc);

        let link = dictionary! { "Dest" => "Intro" };
        let node = DictNode::new(doc.inner(), &link, None);
        assert_eq!(resolver.resolve(&node), Some(Action::GoTo(2)));
    }

    #[test]
    fn test_legacy_destinations_named_like_back_references() {
        let (mut doc, ids, catalog_id) = document_with_pages(2);
        set_catalog_entry(
            &mut doc,
            catalog_id,
            "Dests",
            Object::Dictionary(dictionary! {
                "P" => xyz(Object::Reference(ids[1])),
                "Parent" => xyz(Object::Reference(ids[0])),
                "Q" => xyz(Object::Reference(ids[1])),
            }),
        );
        let doc = PdfDocument::from_lopdf(doc);
        let cases = [("P", 2), ("Parent", 1), ("Q", 2)];
        let links: Vec<_> = cases
            .iter()
            .map(|(name, _)| dictionary! { "Dest" => *name })
            .collect();
        let resolver = ActionResolver::new(&doc);

        for ((name, page), link) in cases.into_iter().zip(&links) {
            let node = DictNode::new(doc.inner(), link, None);
            assert_eq!(resolver.resolve(&node), Some(Action::GoTo(page)), "{}", name);
            assert_eq!(resolver.named_destination_page(name), Some(page), "{}", name);
        }
        assert_eq!(resolver.destination_names(), vec!["P", "Parent", "Q"]);
    }

    #[test]
    fn test_malformed_actions_yield_nothing() {
        let (doc, _, _) = document_with_pages(1);
        let doc = PdfDocument::from_lopdf(doc);
        let resolver = ActionResolver::new(&doc);

        let cases = vec![
            dictionary! {},
            dictionary! { "A" => dictionary! { "S" => "Launch" } },
            dictionary! { "A" => dictionary! { "S" => "GoTo" } },
            dictionary! { "A" => dictionary! { "S" => "URI" } },
            dictionary! { "Dest" => Object::Integer(4) },
            dictionary! { "Dest" => Object::Array(vec![]) },
            dictionary! { "Dest" => xyz(Object::Integer(-1)) },
            dictionary! { "Dest" => xyz(Object::Reference((999, 0))) },
        ];

        for case in &cases {
            let node = DictNode::new(doc.inner(), case, None);
            assert_eq!(resolver.resolve(&node), None, "case {:?}", node);
        }
    }

    #[test]
    fn test_links_on_second_page() {
        let (mut doc, ids, _) = document_with_pages(3);
        let link = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![
                Object::Integer(10),
                Object::Integer(10),
                Object::Integer(60),
                Object::Integer(30),
            ],
            "Dest" => xyz(Object::Integer(1)),
        });
        let note = doc.add_object(dictionary! { "Type" => "Annot", "Subtype" => "Text" });
        if let Ok(Object::Dictionary(page)) = doc.get_object_mut(ids[1]) {
            page.set("Annots", vec![Object::Reference(note), Object::Reference(link)]);
        }

        let doc = PdfDocument::from_lopdf(doc);
        let found = links(&doc, &CancelToken::new()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].page, 2);
        assert_eq!(found[0].action, Action::GoTo(2));
        assert_eq!(found[0].rect.unwrap().width, 50.0);
        assert!(found[0].contains(35.0, 20.0));
        assert!(!found[0].contains(70.0, 20.0));
    }
}
