//! Hierarchy reconstruction.
//!
//! The [`Tree`] is a pure derived view over one document's ordered record
//! sequence: an arena of nodes addressed by record position, each storing its
//! parent index and child indices. It is built once per document and never
//! patched — if the input changes, it is rebuilt.

use std::num::NonZeroU32;

use tracing::{debug, instrument};

use super::{
    record::Record,
    reference::{self, HierarchyPath, TokenKind},
};

/// One tree node, bound to exactly one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    order_index: usize,
    path: HierarchyPath,
    fuzzy: bool,
    orphan: bool,
    token: TokenKind,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl Node {
    /// Position of the bound record in the source document.
    #[must_use]
    pub const fn order_index(&self) -> usize {
        self.order_index
    }

    /// The node's normalized path.
    #[must_use]
    pub const fn path(&self) -> &HierarchyPath {
        &self.path
    }

    /// True when any path segment was inferred from an ambiguous token.
    #[must_use]
    pub const fn fuzzy(&self) -> bool {
        self.fuzzy
    }

    /// True when the record's path did not extend the open context and the
    /// node was attached as a new root.
    #[must_use]
    pub const fn orphan(&self) -> bool {
        self.orphan
    }

    /// The grammar the reference token matched.
    #[must_use]
    pub const fn token(&self) -> TokenKind {
        self.token
    }

    /// Arena index of the parent node, or `None` for roots.
    #[must_use]
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Arena indices of the child nodes, in document order.
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Depth of the node (number of path segments).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.depth()
    }
}

/// The reconstructed hierarchy of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Builds the tree from one document's records, in `order_index` order.
    ///
    /// Construction is total and deterministic: every record gets a node,
    /// malformed references are repaired or replaced with synthetic paths,
    /// and records whose path does not extend the open context become new
    /// roots flagged as orphans.
    #[must_use]
    #[instrument(skip(records), fields(records = records.len()))]
    pub fn build(records: &[Record]) -> Self {
        let mut nodes: Vec<Node> = Vec::with_capacity(records.len());

        // Open paths, strictly nested, deepest last. Each entry pairs an open
        // path with the arena index of its node.
        let mut stack: Vec<(HierarchyPath, usize)> = Vec::new();

        // The path bare parentheticals compose onto. Tracks the most recent
        // root-establishing token; unparseable rows leave it untouched.
        let mut context: Option<HierarchyPath> = None;

        for (idx, record) in records.iter().enumerate() {
            let parsed = reference::parse(&record.reference_raw, record.order_index);
            let mut path = parsed.path;
            let mut fuzzy = parsed.fuzzy;
            let mut token = parsed.kind;
            let mut orphan = false;

            match token {
                TokenKind::Parenthetical => {
                    if let Some(open) = &context {
                        path = open.child(path.last());
                    } else {
                        // No open root at the expected depth. Guessing a
                        // parent would silently misfile the item, so the
                        // record becomes a flagged root instead.
                        orphan = true;
                    }
                }
                TokenKind::Synthetic => {
                    if let Some(group) = group_fallback(record) {
                        path = HierarchyPath::root(group);
                        token = TokenKind::BareNumeral;
                        fuzzy = true;
                    }
                }
                _ => {}
            }

            context = match token {
                TokenKind::SlashPath | TokenKind::BareNumeral | TokenKind::FuzzyNumeral => {
                    Some(path.clone())
                }
                // `6.(1)` opens root `6`; a following `(2)` means `6/2`.
                TokenKind::Composite => path.segments().next().map(HierarchyPath::root),
                TokenKind::Parenthetical | TokenKind::Synthetic => context,
            };

            let parent = if token == TokenKind::Synthetic {
                // Synthetic rows are placed as roots without disturbing the
                // open stack, so the surrounding numbering keeps composing.
                None
            } else {
                while let Some((open, _)) = stack.last() {
                    if open.is_ancestor_of(&path) {
                        break;
                    }
                    stack.pop();
                }

                let parent = match stack.last() {
                    Some((open, parent_idx)) if open.is_parent_of(&path) => Some(*parent_idx),
                    _ => {
                        if path.depth() > 1 {
                            // The immediate parent level was never opened.
                            orphan = true;
                            stack.clear();
                        }
                        None
                    }
                };
                stack.push((path.clone(), idx));
                parent
            };

            if orphan {
                debug!(
                    order_index = record.order_index,
                    reference = %record.reference_raw,
                    path = %path,
                    "orphan path attached as new root"
                );
            }

            if let Some(parent_idx) = parent {
                nodes[parent_idx].children.push(idx);
            }

            nodes.push(Node {
                order_index: record.order_index,
                path,
                fuzzy,
                orphan,
                token,
                parent,
                children: Vec::new(),
            });
        }

        Self { nodes }
    }

    /// The number of nodes (always equal to the number of records).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node at the given arena index.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Iterates over all nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Iterates over the arena indices of the root nodes, in document order.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(idx, _)| idx)
    }

    /// Iterates over the orphan nodes.
    pub fn orphans(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.orphan)
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// When the reference matched no grammar but the record's own group field is
/// a pure integer, that integer stands in as the root segment.
fn group_fallback(record: &Record) -> Option<NonZeroU32> {
    record
        .group
        .as_set()
        .and_then(|s| s.parse::<u32>().ok())
        .and_then(NonZeroU32::new)
}
