use indextree::NodeId;
use tracing::{debug, warn};

use crate::core::{BarSegment, NodeKind, NodeKindTag};
use crate::error::ScoreResult;
use crate::render::Renderer;

use super::ScoreEngine;

/// Structural change to a score tree.
///
/// Interactive corrections and batch replay go through the same type so that
/// both end in the same recomputed state.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreEdit {
    Insert { parent: NodeId, kind: NodeKind },
    /// Drops every child of `node` except those of kind `keep`.
    Cleanup { node: NodeId, keep: NodeKindTag },
    ResetMeasure { measure: NodeId },
    MoveBarline {
        measure: NodeId,
        segments: Vec<BarSegment>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Inserted(NodeId),
    /// Whether any kept child still has children of its own.
    CleanedUp { kept_has_children: bool },
    Reset,
    BarlineMoved,
}

impl<R: Renderer> ScoreEngine<R> {
    /// Applies one edit and recomputes the tree.
    pub fn apply_edit(&mut self, edit: ScoreEdit) -> ScoreResult<EditOutcome> {
        let outcome = self.apply_edit_without_recompute(edit);
        self.recompute()?;
        outcome
    }

    /// Replays `edits` in order, stopping at the first failure.
    ///
    /// The tree is recomputed once at the end, including after a failure, so
    /// the edits already applied leave consistent derived state.
    pub fn apply_edits(
        &mut self,
        edits: impl IntoIterator<Item = ScoreEdit>,
    ) -> ScoreResult<Vec<EditOutcome>> {
        let mut outcomes = Vec::new();
        for edit in edits {
            match self.apply_edit_without_recompute(edit) {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    warn!(applied = outcomes.len(), error = %err, "edit replay stopped");
                    self.recompute()?;
                    return Err(err);
                }
            }
        }
        self.recompute()?;
        debug!(applied = outcomes.len(), "edit replay finished");
        Ok(outcomes)
    }

    fn apply_edit_without_recompute(&mut self, edit: ScoreEdit) -> ScoreResult<EditOutcome> {
        match edit {
            ScoreEdit::Insert { parent, kind } => {
                self.tree.add_child(parent, kind).map(EditOutcome::Inserted)
            }
            ScoreEdit::Cleanup { node, keep } => self
                .tree
                .cleanup(node, keep)
                .map(|kept_has_children| EditOutcome::CleanedUp { kept_has_children }),
            ScoreEdit::ResetMeasure { measure } => {
                self.tree.reset_measure(measure).map(|()| EditOutcome::Reset)
            }
            ScoreEdit::MoveBarline { measure, segments } => self
                .tree
                .move_barline(measure, segments)
                .map(|()| EditOutcome::BarlineMoved),
        }
    }
}
