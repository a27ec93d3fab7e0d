//! Filter tree with single-selection checkboxes per filter
//!
//! The tree has exactly three levels: an invisible root, one filter node per
//! [`FilterKind`] in catalog order, and one variant node per selectable value.
//! Nodes live in an arena and are addressed by [`NodeId`]; children keep a
//! plain index back to their parent. Every tree is stamped on construction
//! and its ids carry that stamp, so an id kept across a rebuild is detected
//! instead of addressing whatever node now sits at its index.
//!
//! Each filter node stores the set of checked child rows. Toggling a variant
//! makes it the only checked row of its filter (or clears the filter if it
//! was already checked), so the set never holds more than one row. The
//! `checked`/`checkable` flags exposed to a front end are derived from that
//! set rather than stored.

use super::{DynamicVariants, FilterKind, SongMatch};
use crate::{Error, Result, UsdbSong};
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TREE_STAMP: AtomicU64 = AtomicU64::new(0);

/// Index of a node in a [`FilterTree`]
///
/// Only valid for the tree that handed it out (and clones of that tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    tree: u64,
    index: usize,
}

#[derive(Debug, Clone)]
enum NodeData {
    Root,
    Filter {
        kind: FilterKind,
        checked_rows: BTreeSet<usize>,
    },
    Variant(SongMatch),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    row_in_parent: usize,
    children: Vec<NodeId>,
}

/// The filter tree
#[derive(Debug, Clone)]
pub struct FilterTree {
    stamp: u64,
    nodes: Vec<Node>,
}

impl Default for FilterTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterTree {
    /// Tree with static variants only; dynamic filters get no variants
    pub fn new() -> Self {
        match Self::build(&DynamicVariants::new()) {
            Ok(tree) => tree,
            Err(e) => unreachable!("static variants are distinct: {}", e),
        }
    }

    /// Build the tree in one pass: root, then filters in catalog order, each
    /// followed by its variants
    ///
    /// Dynamic filters take their values from `dynamic`. A value listed twice
    /// for the same filter is rejected with [`Error::DuplicateVariant`].
    pub fn build(dynamic: &DynamicVariants) -> Result<Self> {
        let mut tree = Self {
            stamp: NEXT_TREE_STAMP.fetch_add(1, Ordering::Relaxed),
            nodes: vec![Node {
                data: NodeData::Root,
                parent: None,
                row_in_parent: 0,
                children: Vec::new(),
            }],
        };

        for kind in FilterKind::ALL {
            let filter = tree.add_child(
                tree.root(),
                NodeData::Filter {
                    kind,
                    checked_rows: BTreeSet::new(),
                },
            );

            let variants: Vec<SongMatch> = if kind.is_dynamic() {
                let values = dynamic.values(kind);
                let mut seen = HashSet::with_capacity(values.len());
                for value in values {
                    if !seen.insert(value.as_str()) {
                        return Err(Error::DuplicateVariant {
                            filter: kind,
                            value: value.clone(),
                        });
                    }
                }
                values.iter().map(|v| kind.variant_for_value(v.as_str())).collect()
            } else {
                kind.static_variants()
            };

            for variant in variants {
                tree.add_child(filter, NodeData::Variant(variant));
            }
        }

        tracing::debug!(
            nodes = tree.nodes.len(),
            filters = FilterKind::ALL.len(),
            "Built filter tree"
        );
        Ok(tree)
    }

    fn add_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.id_at(self.nodes.len());
        let row_in_parent = self.nodes[parent.index].children.len();
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            row_in_parent,
            children: Vec::new(),
        });
        self.nodes[parent.index].children.push(id);
        id
    }

    fn id_at(&self, index: usize) -> NodeId {
        NodeId {
            tree: self.stamp,
            index,
        }
    }

    pub fn root(&self) -> NodeId {
        self.id_at(0)
    }

    /// True if `id` was handed out by this tree (or the tree it was cloned from)
    pub fn contains(&self, id: NodeId) -> bool {
        id.tree == self.stamp && id.index < self.nodes.len()
    }

    /// Read access to a node
    ///
    /// # Panics
    /// If `id` does not belong to this tree, see [`FilterTree::contains`].
    pub fn node(&self, id: NodeId) -> NodeView<'_> {
        assert!(self.contains(id), "node {:?} is not part of this tree", id);
        NodeView { tree: self, id }
    }

    /// Filter nodes in catalog order
    pub fn filters(&self) -> impl Iterator<Item = NodeView<'_>> + '_ {
        self.nodes[0]
            .children
            .iter()
            .map(move |id| self.node(*id))
    }

    /// The filter node of `kind`
    pub fn filter_node(&self, kind: FilterKind) -> NodeId {
        match self.filters().find(|f| f.filter_kind() == Some(kind)) {
            Some(filter) => filter.id(),
            None => unreachable!("tree has a node for every filter kind"),
        }
    }

    /// The variant of `kind` whose label equals `label`
    pub fn find_variant(&self, kind: FilterKind, label: &str) -> Option<NodeId> {
        self.node(self.filter_node(kind))
            .children()
            .iter()
            .copied()
            .find(|id| self.node(*id).label() == label)
    }

    /// Toggle the checkbox of a node
    ///
    /// - variant, unchecked: becomes the only checked variant of its filter
    /// - variant, checked: its filter is cleared
    /// - filter: clears the filter if it has a checked variant
    /// - root: no-op
    ///
    /// Ids from another tree are logged and ignored.
    pub fn toggle(&mut self, id: NodeId) {
        if !self.contains(id) {
            tracing::warn!(node = ?id, "Ignoring toggle of a node from another tree");
            return;
        }
        let node = &self.nodes[id.index];
        let is_variant = match node.data {
            NodeData::Root => return,
            NodeData::Filter { .. } => false,
            NodeData::Variant(_) => true,
        };
        let (parent, row) = (node.parent, node.row_in_parent);
        let checked = self.node(id).checked();

        if !is_variant {
            if checked {
                self.uncheck_children(id);
            }
            return;
        }

        let Some(parent) = parent else {
            unreachable!("variant nodes always have a parent");
        };
        if checked {
            self.uncheck_children(parent);
        } else {
            self.check_child(parent, row);
        }
    }

    fn checked_rows_mut(&mut self, filter: NodeId) -> &mut BTreeSet<usize> {
        match &mut self.nodes[filter.index].data {
            NodeData::Filter { checked_rows, .. } => checked_rows,
            _ => unreachable!("node {:?} is not a filter", filter),
        }
    }

    fn uncheck_children(&mut self, filter: NodeId) {
        self.checked_rows_mut(filter).clear();
        tracing::debug!(filter = %self.node(filter).label(), "Filter cleared");
    }

    fn check_child(&mut self, filter: NodeId, row: usize) {
        let rows = self.checked_rows_mut(filter);
        rows.clear();
        rows.insert(row);
        tracing::debug!(
            filter = %self.node(filter).label(),
            variant = %self.node(self.nodes[filter.index].children[row]).label(),
            "Filter variant checked"
        );
    }

    /// Uncheck every filter
    pub fn clear(&mut self) {
        let filters: Vec<NodeId> = self.nodes[0].children.clone();
        for filter in filters {
            self.checked_rows_mut(filter).clear();
        }
    }

    /// True if the song passes every filter
    ///
    /// A filter without checked variants accepts every song; otherwise the
    /// song must match at least one checked variant.
    pub fn accepts(&self, song: &UsdbSong) -> bool {
        self.filters().all(|filter| filter.accepts(song))
    }

    /// Checked variants of all filters, in tree order
    pub fn checked_variants(&self) -> Vec<(FilterKind, &SongMatch)> {
        self.filters()
            .flat_map(|filter| {
                filter
                    .checked_children()
                    .into_iter()
                    .filter_map(move |id| self.node(id).predicate())
                    .map(move |predicate| (predicate.kind(), predicate))
            })
            .collect()
    }

    /// Owned copy of the current selection
    ///
    /// Filtering a collection from several threads should go through a
    /// snapshot so that one pass sees one consistent selection.
    pub fn snapshot(&self) -> FilterSnapshot {
        let filters = self
            .filters()
            .filter(|filter| filter.checked())
            .filter_map(|filter| {
                let kind = filter.filter_kind()?;
                let predicates = filter
                    .checked_children()
                    .into_iter()
                    .filter_map(|id| self.node(id).predicate().cloned())
                    .collect();
                Some((kind, predicates))
            })
            .collect();
        FilterSnapshot { filters }
    }
}

/// Read-only view of one tree node
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    tree: &'a FilterTree,
    id: NodeId,
}

impl<'a> NodeView<'a> {
    fn inner(&self) -> &'a Node {
        &self.tree.nodes[self.id.index]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_root(&self) -> bool {
        matches!(self.inner().data, NodeData::Root)
    }

    /// Display text: empty for the root, the kind label for filters and the
    /// value label for variants
    pub fn label(&self) -> String {
        match &self.inner().data {
            NodeData::Root => String::new(),
            NodeData::Filter { kind, .. } => kind.label().to_string(),
            NodeData::Variant(predicate) => predicate.label(),
        }
    }

    pub fn checked(&self) -> bool {
        let node = self.inner();
        match &node.data {
            NodeData::Root => false,
            NodeData::Filter { checked_rows, .. } => !checked_rows.is_empty(),
            NodeData::Variant(_) => node
                .parent
                .map(|parent| self.tree.node(parent).checked_rows().contains(&node.row_in_parent))
                .unwrap_or(false),
        }
    }

    /// Whether a front end should show a checkbox
    ///
    /// Variants always have one; a filter only while one of its variants is
    /// checked, so that its box can clear the filter.
    pub fn checkable(&self) -> bool {
        match &self.inner().data {
            NodeData::Root => false,
            NodeData::Filter { .. } => self.checked(),
            NodeData::Variant(_) => true,
        }
    }

    pub fn children(&self) -> &'a [NodeId] {
        &self.inner().children
    }

    pub fn row_in_parent(&self) -> usize {
        self.inner().row_in_parent
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.inner().parent
    }

    /// Kind of a filter node, `None` for root and variants
    pub fn filter_kind(&self) -> Option<FilterKind> {
        match &self.inner().data {
            NodeData::Filter { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Predicate of a variant node, `None` for root and filters
    pub fn predicate(&self) -> Option<&'a SongMatch> {
        match &self.inner().data {
            NodeData::Variant(predicate) => Some(predicate),
            _ => None,
        }
    }

    /// Rows of checked children (filters only; empty otherwise)
    pub fn checked_rows(&self) -> BTreeSet<usize> {
        match &self.inner().data {
            NodeData::Filter { checked_rows, .. } => checked_rows.clone(),
            _ => BTreeSet::new(),
        }
    }

    /// Ids of checked children
    pub fn checked_children(&self) -> Vec<NodeId> {
        let children = self.children();
        self.checked_rows().into_iter().map(|row| children[row]).collect()
    }

    /// Song acceptance of this node
    ///
    /// Filters accept per their checked variants, variants per their
    /// predicate, the root per all filters.
    pub fn accepts(&self, song: &UsdbSong) -> bool {
        match &self.inner().data {
            NodeData::Root => self.tree.accepts(song),
            NodeData::Filter { checked_rows, .. } => {
                checked_rows.is_empty()
                    || checked_rows.iter().any(|row| {
                        self.tree.node(self.children()[*row]).accepts(song)
                    })
            }
            NodeData::Variant(predicate) => predicate.matches(song),
        }
    }
}

/// Owned, thread-safe copy of the checked filter variants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSnapshot {
    filters: Vec<(FilterKind, Vec<SongMatch>)>,
}

impl FilterSnapshot {
    /// True if no filter is constrained
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn accepts(&self, song: &UsdbSong) -> bool {
        self.filters
            .iter()
            .all(|(_, predicates)| predicates.iter().any(|p| p.matches(song)))
    }
}
