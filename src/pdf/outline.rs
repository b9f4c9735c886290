//! Document outline (bookmarks)

use std::collections::HashSet;

use log::{debug, warn};
use lopdf::ObjectId;

use super::action::{Action, ActionResolver};
use super::cancel::CancelToken;
use super::dictionary::DictNode;
use super::document::PdfDocument;
use super::object::MAX_DEPTH;
use crate::error::Result;

/// One bookmark and the bookmarks nested under it
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineItem {
    pub title: String,
    /// 0 for top-level items
    pub depth: usize,
    pub action: Option<Action>,
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    /// This item followed by all of its descendants, depth first
    pub fn flatten(&self) -> Vec<&OutlineItem> {
        let mut items = vec![self];
        for child in &self.children {
            items.extend(child.flatten());
        }
        items
    }
}

struct OutlineWalk<'a, 't> {
    resolver: ActionResolver<'a>,
    token: &'t CancelToken,
    visited: HashSet<ObjectId>,
}

impl<'a> OutlineWalk<'a, '_> {
    /// Items of the sibling chain starting at `first`
    fn siblings(&mut self, first: Option<DictNode<'a>>, depth: usize) -> Result<Vec<OutlineItem>> {
        let mut items = Vec::new();
        if depth > MAX_DEPTH {
            warn!("Outline nested deeper than {} levels; truncating", MAX_DEPTH);
            return Ok(items);
        }

        let mut current = first;
        while let Some(node) = current {
            self.token.check()?;
            if let Some(id) = node.id() {
                if !self.visited.insert(id) {
                    warn!("Outline item {:?} reached twice; stopping this level", id);
                    break;
                }
            }

            let children = self.siblings(node.get_dict("First"), depth + 1)?;
            items.push(OutlineItem {
                title: node.get_text("Title").unwrap_or_default(),
                depth,
                action: self.resolver.resolve(&node),
                children,
            });
            current = node.get_dict("Next");
        }
        Ok(items)
    }
}

/// The document's bookmarks in display order
///
/// A document without `Outlines` yields an empty list.
pub fn outline(doc: &PdfDocument, token: &CancelToken) -> Result<Vec<OutlineItem>> {
    let Some(root) = doc.catalog().and_then(|catalog| catalog.get_dict("Outlines")) else {
        debug!("Document has no outline");
        return Ok(Vec::new());
    };

    let mut walk = OutlineWalk {
        resolver: ActionResolver::new(doc),
        token,
        visited: HashSet::new(),
    };
    if let Some(id) = root.id() {
        walk.visited.insert(id);
    }
    walk.siblings(root.get_dict("First"), 0)
}
