//! Page tree and Kids-array enumeration

use std::collections::HashSet;

use log::{debug, warn};
use lopdf::ObjectId;

use super::array::ArrayNode;
use super::cancel::CancelToken;
use super::dictionary::DictNode;
use super::document::PdfDocument;
use super::object::MAX_DEPTH;
use crate::error::Result;
use crate::layout::Rect;

/// One leaf of the page tree
#[derive(Debug, Clone)]
pub struct PageEntry<'a> {
    /// 1-based page number in document order
    pub number: u32,
    pub dict: DictNode<'a>,
    /// MediaBox, inherited from ancestor `Pages` nodes when the page has none
    pub media_box: Option<Rect>,
    /// Dictionaries listed in the page's `Annots` array
    pub annotations: Vec<DictNode<'a>>,
}

impl PageEntry<'_> {
    pub fn id(&self) -> Option<ObjectId> {
        self.dict.id()
    }
}

/// A terminal dictionary found under a Kids array
#[derive(Debug, Clone)]
pub struct TerminalNode<'a> {
    /// 1-based position of the top-level kid this node was reached from
    pub ordinal: u32,
    pub node: DictNode<'a>,
    /// Intermediate nodes from the top-level kid down to the parent of `node`
    pub ancestors: Vec<DictNode<'a>>,
}

/// Guards shared by every recursive walk: cancellation, revisits, depth
struct WalkGuard<'t> {
    token: &'t CancelToken,
    visited: HashSet<ObjectId>,
}

impl<'t> WalkGuard<'t> {
    fn new(token: &'t CancelToken) -> Self {
        Self {
            token,
            visited: HashSet::new(),
        }
    }

    /// `Ok(false)` when the node must be skipped
    fn enter(&mut self, node: &DictNode<'_>, depth: usize) -> Result<bool> {
        self.token.check()?;

        if depth > MAX_DEPTH {
            warn!("Tree deeper than {} levels; skipping {:?}", MAX_DEPTH, node.id());
            return Ok(false);
        }
        if let Some(id) = node.id() {
            if !self.visited.insert(id) {
                warn!("Object {:?} reached twice; skipping the repeat", id);
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Walk `catalog.Pages` and return every page in document order
///
/// A document without a catalog or page tree yields no pages.
pub fn page_tree<'a>(doc: &'a PdfDocument, token: &CancelToken) -> Result<Vec<PageEntry<'a>>> {
    let Some(root) = doc.catalog().and_then(|catalog| catalog.get_dict("Pages")) else {
        debug!("Document has no page tree");
        return Ok(Vec::new());
    };

    let mut guard = WalkGuard::new(token);
    let mut pages = Vec::new();
    visit_page_node(&root, None, 0, &mut guard, &mut pages)?;
    Ok(pages)
}

fn visit_page_node<'a>(
    node: &DictNode<'a>,
    inherited_media_box: Option<Rect>,
    depth: usize,
    guard: &mut WalkGuard<'_>,
    pages: &mut Vec<PageEntry<'a>>,
) -> Result<()> {
    if !guard.enter(node, depth)? {
        return Ok(());
    }

    let media_box = node.get_rect("MediaBox").or(inherited_media_box);

    if !node.has_name("Type", "Page") {
        if let Some(kids) = node.get_array("Kids") {
            for kid in kids.dicts() {
                visit_page_node(kid, media_box, depth + 1, guard, pages)?;
            }
            return Ok(());
        }
        if node.has_name("Type", "Pages") {
            debug!("Pages node {:?} has no Kids", node.id());
            return Ok(());
        }
    }

    let annotations = node
        .get_array("Annots")
        .map(|annots| annots.dicts().cloned().collect())
        .unwrap_or_default();

    pages.push(PageEntry {
        number: pages.len() as u32 + 1,
        dict: node.clone(),
        media_box,
        annotations,
    });
    Ok(())
}

/// Every annotation in the document paired with its 1-based page number
pub fn annotations<'a>(
    doc: &'a PdfDocument,
    token: &CancelToken,
) -> Result<Vec<(u32, DictNode<'a>)>> {
    Ok(page_tree(doc, token)?
        .into_iter()
        .flat_map(|page| {
            let number = page.number;
            page.annotations.into_iter().map(move |annot| (number, annot))
        })
        .collect())
}

/// A dictionary is terminal when it is an annotation or widget
fn is_terminal(node: &DictNode<'_>) -> bool {
    node.contains_key("Subtype") || node.has_name("Type", "Annot")
}

/// Collect the terminal dictionaries under a Kids array
///
/// Each top-level kid is numbered from 1 in array order; everything found below it
/// carries that number. Intermediate nodes are descended through their own `Kids`.
pub fn terminal_kids<'a>(
    kids: &ArrayNode<'a>,
    token: &CancelToken,
) -> Result<Vec<TerminalNode<'a>>> {
    let mut guard = WalkGuard::new(token);
    let mut found = Vec::new();
    let mut ancestors = Vec::new();

    for (index, kid) in kids.dicts().enumerate() {
        visit_kid(kid, index as u32 + 1, 0, &mut ancestors, &mut guard, &mut found)?;
    }
    Ok(found)
}

fn visit_kid<'a>(
    node: &DictNode<'a>,
    ordinal: u32,
    depth: usize,
    ancestors: &mut Vec<DictNode<'a>>,
    guard: &mut WalkGuard<'_>,
    found: &mut Vec<TerminalNode<'a>>,
) -> Result<()> {
    if !guard.enter(node, depth)? {
        return Ok(());
    }

    if is_terminal(node) {
        found.push(TerminalNode {
            ordinal,
            node: node.clone(),
            ancestors: ancestors.clone(),
        });
        return Ok(());
    }

    match node.get_array("Kids") {
        Some(kids) => {
            ancestors.push(node.clone());
            for kid in kids.dicts() {
                visit_kid(kid, ordinal, depth + 1, ancestors, guard, found)?;
            }
            ancestors.pop();
        }
        None => debug!("Skipping {:?}: neither terminal nor has Kids", node.id()),
    }
    Ok(())
}

/// Finds which page an annotation or widget dictionary sits on
///
/// Uses the dictionary's `/P` reference when it names a known page. Otherwise every
/// page's `Annots` array is scanned for a matching dictionary (identity when both
/// sides have object ids, structural equality otherwise). The scan is not indexed:
/// each lookup costs O(pages × annotations per page).
pub struct PageLocator<'a> {
    doc: &'a PdfDocument,
    annots: Vec<(u32, Vec<DictNode<'a>>)>,
}

impl<'a> PageLocator<'a> {
    pub fn new(doc: &'a PdfDocument) -> Self {
        let annots = (0..doc.page_count())
            .filter_map(|index| {
                let page = doc.page(index)?;
                let list = page.get_array("Annots")?.dicts().cloned().collect();
                Some((index as u32 + 1, list))
            })
            .collect();
        Self { doc, annots }
    }

    /// 1-based page number of the page holding `node`
    pub fn locate(&self, node: &DictNode<'a>) -> Option<u32> {
        if let Some(page) = node
            .reference("P")
            .and_then(|id| self.doc.page_number_of(id))
        {
            return Some(page);
        }

        self.annots
            .iter()
            .find(|(_, list)| list.iter().any(|annot| annot.matches(node)))
            .map(|(number, _)| *number)
    }
}
