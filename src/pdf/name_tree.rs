//! Name tree lookup
//!
//! A name tree maps strings to values through a tree of nodes. Leaves carry a
//! `Names` array of alternating key/value entries; intermediate nodes carry `Kids`.
//! Every node except the root may carry `Limits [lowest highest]`, which lets a
//! lookup skip whole subtrees.

use std::collections::HashSet;

use log::warn;
use lopdf::ObjectId;

use super::dictionary::DictNode;
use super::object::{PdfValue, MAX_DEPTH};

/// A name tree rooted at a dictionary, e.g. `catalog.Names.Dests`
#[derive(Debug, Clone)]
pub struct NameTree<'a> {
    root: DictNode<'a>,
}

impl<'a> NameTree<'a> {
    pub fn new(root: DictNode<'a>) -> Self {
        Self { root }
    }

    /// Value stored under `name`
    pub fn get(&self, name: &str) -> Option<PdfValue<'a>> {
        self.get_observed(name, |_| {})
    }

    /// Like [`NameTree::get`], calling `on_visit` for every node inspected
    pub fn get_observed(
        &self,
        name: &str,
        mut on_visit: impl FnMut(&DictNode<'a>),
    ) -> Option<PdfValue<'a>> {
        let mut visited = HashSet::new();
        find(&self.root, name, 0, &mut visited, &mut on_visit)
    }

    /// Every key/value pair in tree order
    pub fn entries(&self) -> Vec<(String, PdfValue<'a>)> {
        let mut entries = Vec::new();
        collect(&self.root, 0, &mut HashSet::new(), &mut entries);
        entries
    }
}

/// Returns `false` when the node was already seen or the tree is too deep
fn enter(node: &DictNode<'_>, depth: usize, visited: &mut HashSet<ObjectId>) -> bool {
    if depth > MAX_DEPTH {
        warn!("Name tree deeper than {} levels", MAX_DEPTH);
        return false;
    }
    match node.id() {
        Some(id) if !visited.insert(id) => {
            warn!("Name tree node {:?} reached twice", id);
            false
        }
        _ => true,
    }
}

/// Whether `name` falls outside the node's `Limits`
///
/// Nodes without usable limits never reject.
fn outside_limits(node: &DictNode<'_>, name: &str) -> bool {
    let Some(limits) = node.get_array("Limits") else {
        return false;
    };
    match (
        limits.get(0).and_then(PdfValue::as_text),
        limits.get(1).and_then(PdfValue::as_text),
    ) {
        (Some(lowest), Some(highest)) => name < lowest || name > highest,
        _ => false,
    }
}

fn find<'a>(
    node: &DictNode<'a>,
    name: &str,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
    on_visit: &mut impl FnMut(&DictNode<'a>),
) -> Option<PdfValue<'a>> {
    on_visit(node);

    if !enter(node, depth, visited) || outside_limits(node, name) {
        return None;
    }

    if let Some(names) = node.get_array("Names") {
        let found = names
            .as_slice()
            .chunks_exact(2)
            .find(|pair| pair[0].as_text() == Some(name))
            .map(|pair| pair[1].clone());
        if found.is_some() {
            return found;
        }
    }

    let kids = node.get_array("Kids")?;
    let found = kids
        .dicts()
        .find_map(|kid| find(kid, name, depth + 1, visited, on_visit));
    found
}

fn collect<'a>(
    node: &DictNode<'a>,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
    entries: &mut Vec<(String, PdfValue<'a>)>,
) {
    if !enter(node, depth, visited) {
        return;
    }

    if let Some(names) = node.get_array("Names") {
        for pair in names.as_slice().chunks_exact(2) {
            if let Some(key) = pair[0].as_text() {
                entries.push((key.to_string(), pair[1].clone()));
            }
        }
    }

    if let Some(kids) = node.get_array("Kids") {
        for kid in kids.dicts() {
            collect(kid, depth + 1, visited, entries);
        }
    }
}
