use indextree::{Arena, NodeId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::node::{MeasureData, NodeKind, NodeKindTag, ScoreData, StaffData, TreeNode};
use crate::core::types::ModelSize;
use crate::error::{ScoreError, ScoreResult};

/// Scope of the counter that hands out measure identifiers.
///
/// `PerStaff` restarts numbering at 1 on every staff. `PerScore` numbers all
/// measures of the score continuously in traversal order, which keeps ids
/// unique when staves are later split or merged across systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MeasureIdScope {
    #[default]
    PerStaff,
    PerScore,
}

/// Where an accepted child ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Direct,
    ClefList,
}

fn placement_for(parent: NodeKindTag, child: NodeKindTag) -> Option<Placement> {
    use NodeKindTag as K;
    match (parent, child) {
        (K::Score, K::Page)
        | (K::Page, K::System)
        | (K::System, K::Staff)
        | (K::Staff, K::Measure)
        | (K::Measure, K::Barline | K::TimeSignature)
        | (K::ClefList, K::Clef) => Some(Placement::Direct),
        (K::Measure, K::Clef) => Some(Placement::ClefList),
        _ => None,
    }
}

/// Score hierarchy stored in an index arena.
///
/// Nodes are owned top-down by the arena. The container of a node is its
/// arena parent, a lookup-only relation rewritten when a node is redirected
/// into a sub-collection.
#[derive(Debug, Clone)]
pub struct ScoreTree {
    pub(crate) arena: Arena<TreeNode>,
    root: NodeId,
    id_scope: MeasureIdScope,
}

impl ScoreTree {
    #[must_use]
    pub fn new(size: ModelSize) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(TreeNode::new(NodeKind::Score(ScoreData {
            size,
            last_measure_id: 0,
        })));
        Self {
            arena,
            root,
            id_scope: MeasureIdScope::default(),
        }
    }

    #[must_use]
    pub fn with_id_scope(mut self, id_scope: MeasureIdScope) -> Self {
        self.id_scope = id_scope;
        self
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn id_scope(&self) -> MeasureIdScope {
        self.id_scope
    }

    pub fn set_id_scope(&mut self, id_scope: MeasureIdScope) {
        self.id_scope = id_scope;
    }

    #[must_use]
    pub fn size(&self) -> ModelSize {
        match self.node(self.root).map(TreeNode::kind) {
            Ok(NodeKind::Score(score)) => score.size,
            _ => ModelSize::default(),
        }
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.arena.get(node).is_some_and(|entry| !entry.is_removed())
    }

    pub fn node(&self, node: NodeId) -> ScoreResult<&TreeNode> {
        match self.arena.get(node) {
            Some(entry) if !entry.is_removed() => Ok(entry.get()),
            _ => Err(ScoreError::UnknownNode(node)),
        }
    }

    pub(crate) fn node_mut(&mut self, node: NodeId) -> ScoreResult<&mut TreeNode> {
        match self.arena.get_mut(node) {
            Some(entry) if !entry.is_removed() => Ok(entry.get_mut()),
            _ => Err(ScoreError::UnknownNode(node)),
        }
    }

    pub fn kind_of(&self, node: NodeId) -> ScoreResult<NodeKindTag> {
        self.node(node).map(TreeNode::tag)
    }

    /// Logical container of `node`, `None` for the root.
    pub fn container(&self, node: NodeId) -> ScoreResult<Option<NodeId>> {
        self.node(node)?;
        Ok(self.arena.get(node).and_then(|entry| entry.parent()))
    }

    /// Direct children in reading order.
    pub fn children(&self, node: NodeId) -> ScoreResult<Vec<NodeId>> {
        self.node(node)?;
        Ok(node.children(&self.arena).collect())
    }

    pub(crate) fn child_ids(&self, node: NodeId) -> SmallVec<[NodeId; 8]> {
        node.children(&self.arena).collect()
    }

    pub fn previous_sibling(&self, node: NodeId) -> ScoreResult<Option<NodeId>> {
        self.node(node)?;
        Ok(self.arena.get(node).and_then(|entry| entry.previous_sibling()))
    }

    pub fn next_sibling(&self, node: NodeId) -> ScoreResult<Option<NodeId>> {
        self.node(node)?;
        Ok(self.arena.get(node).and_then(|entry| entry.next_sibling()))
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.descendants(&self.arena).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children(&self.arena).next().is_none()
    }

    /// Nearest staff among `node` and its containers.
    pub fn staff_of(&self, node: NodeId) -> ScoreResult<Option<NodeId>> {
        self.node(node)?;
        Ok(node
            .ancestors(&self.arena)
            .find(|id| matches!(self.kind_of(*id), Ok(NodeKindTag::Staff))))
    }

    pub fn staff_data(&self, staff: NodeId) -> ScoreResult<&StaffData> {
        match self.node(staff)?.kind() {
            NodeKind::Staff(data) => Ok(data),
            other => Err(ScoreError::UnexpectedKind {
                node: staff,
                expected: NodeKindTag::Staff,
                actual: other.tag(),
            }),
        }
    }

    pub(crate) fn staff_data_mut(&mut self, staff: NodeId) -> ScoreResult<&mut StaffData> {
        match &mut self.node_mut(staff)?.kind {
            NodeKind::Staff(data) => Ok(data),
            other => Err(ScoreError::UnexpectedKind {
                node: staff,
                expected: NodeKindTag::Staff,
                actual: other.tag(),
            }),
        }
    }

    pub fn measure_data(&self, measure: NodeId) -> ScoreResult<&MeasureData> {
        match self.node(measure)?.kind() {
            NodeKind::Measure(data) => Ok(data),
            other => Err(ScoreError::UnexpectedKind {
                node: measure,
                expected: NodeKindTag::Measure,
                actual: other.tag(),
            }),
        }
    }

    pub(crate) fn measure_data_mut(&mut self, measure: NodeId) -> ScoreResult<&mut MeasureData> {
        match &mut self.node_mut(measure)?.kind {
            NodeKind::Measure(data) => Ok(data),
            other => Err(ScoreError::UnexpectedKind {
                node: measure,
                expected: NodeKindTag::Measure,
                actual: other.tag(),
            }),
        }
    }

    /// Measures of `staff` in reading order.
    pub fn measures(&self, staff: NodeId) -> ScoreResult<Vec<NodeId>> {
        self.staff_data(staff)?;
        Ok(staff
            .children(&self.arena)
            .filter(|id| matches!(self.kind_of(*id), Ok(NodeKindTag::Measure)))
            .collect())
    }

    /// All staves of the score in traversal order.
    #[must_use]
    pub fn staves(&self) -> Vec<NodeId> {
        self.root
            .descendants(&self.arena)
            .filter(|id| matches!(self.kind_of(*id), Ok(NodeKindTag::Staff)))
            .collect()
    }

    /// Inserts a new child built from `kind` under `parent`.
    ///
    /// Dispatch depends on both kinds: a clef given to a measure lands in the
    /// measure's clef list, barlines and time signatures are recorded on the
    /// measure. Any pairing not listed is a structural violation and leaves
    /// the tree untouched.
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind) -> ScoreResult<NodeId> {
        let parent_tag = self.kind_of(parent)?;
        let child_tag = kind.tag();
        let Some(placement) = placement_for(parent_tag, child_tag) else {
            return Err(ScoreError::StructuralViolation {
                parent: parent_tag,
                child: child_tag,
            });
        };

        let container = match placement {
            Placement::Direct => parent,
            Placement::ClefList => self.ensure_clef_list(parent)?,
        };

        if parent_tag == NodeKindTag::Measure {
            let measure = self.measure_data(parent)?;
            let occupied = match child_tag {
                NodeKindTag::Barline => measure.barline.is_some(),
                NodeKindTag::TimeSignature => measure.time_signature.is_some(),
                _ => false,
            };
            if occupied {
                return Err(ScoreError::StructuralViolation {
                    parent: parent_tag,
                    child: child_tag,
                });
            }
        }

        let child = self.attach(container, kind)?;
        match child_tag {
            NodeKindTag::Measure => {
                self.allocate_clef_list(child)?;
            }
            NodeKindTag::Barline => {
                self.measure_data_mut(parent)?.barline = Some(child);
            }
            NodeKindTag::TimeSignature => {
                self.measure_data_mut(parent)?.time_signature = Some(child);
            }
            _ => {}
        }

        trace!(
            parent = ?parent,
            container = ?container,
            child = ?child,
            kind = ?child_tag,
            "add child"
        );
        Ok(child)
    }

    fn attach(&mut self, container: NodeId, kind: NodeKind) -> ScoreResult<NodeId> {
        let child = self.arena.new_node(TreeNode::new(kind));
        container
            .checked_append(child, &mut self.arena)
            .map_err(|err| ScoreError::InvalidData(format!("failed to attach node: {err}")))?;
        Ok(child)
    }

    fn allocate_clef_list(&mut self, measure: NodeId) -> ScoreResult<NodeId> {
        let list = self.attach(measure, NodeKind::ClefList)?;
        self.measure_data_mut(measure)?.clefs = Some(list);
        Ok(list)
    }

    fn ensure_clef_list(&mut self, measure: NodeId) -> ScoreResult<NodeId> {
        match self.measure_data(measure)?.clefs {
            Some(list) if self.contains(list) => Ok(list),
            _ => self.allocate_clef_list(measure),
        }
    }

    /// Clefs of `measure`, in insertion order.
    pub fn clefs(&self, measure: NodeId) -> ScoreResult<Vec<NodeId>> {
        match self.measure_data(measure)?.clefs {
            Some(list) => self.children(list),
            None => Ok(Vec::new()),
        }
    }

    /// Removes every direct child of `node` except those of kind `keep`.
    ///
    /// Cached derived attributes of a measure are cleared and its clef list
    /// is reallocated empty. Returns whether anything below the kept children
    /// still needs a recompute pass; `false` when the node is now empty apart
    /// from leaf children of the preserved kind.
    pub fn cleanup(&mut self, node: NodeId, keep: NodeKindTag) -> ScoreResult<bool> {
        let tag = self.kind_of(node)?;
        let doomed: SmallVec<[NodeId; 8]> = self
            .child_ids(node)
            .into_iter()
            .filter(|child| !matches!(self.kind_of(*child), Ok(kind) if kind == keep))
            .collect();
        for child in &doomed {
            child.remove_subtree(&mut self.arena);
        }

        if tag == NodeKindTag::Measure {
            let measure = self.measure_data_mut(node)?;
            measure.left_x.set(None);
            measure.time_signature = None;
            measure.clefs = None;
            let dropped_barline = keep != NodeKindTag::Barline && measure.barline.take().is_some();
            self.allocate_clef_list(node)?;
            // The next left edge was derived from the removed barline.
            if dropped_barline {
                if let Some(next) = self.next_measure(node)? {
                    self.measure_data(next)?.left_x.set(None);
                }
            }
        }
        self.node_mut(node)?.stale = true;

        let remaining = self
            .child_ids(node)
            .into_iter()
            .filter(|child| matches!(self.kind_of(*child), Ok(kind) if kind == keep))
            .any(|child| child.children(&self.arena).next().is_some());

        debug!(
            node = ?node,
            kind = ?tag,
            keep = ?keep,
            removed = doomed.len(),
            remaining,
            "cleanup node"
        );
        Ok(remaining)
    }
}
