//! Pre-order traversal engine and the four per-node passes.
//!
//! Every pass visits a node before its children and children left to right.
//! A hook returning `false` prunes the subtree below that node only.

use indextree::NodeId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::node::{NodeKind, NodeKindTag};
use crate::core::tree::{MeasureIdScope, ScoreTree};
use crate::core::types::ModelPoint;
use crate::error::{ScoreError, ScoreResult};
use crate::interaction::{MarkChannel, MarkContext};
use crate::render::{
    CanvasLayerKind, Color, LayeredRenderFrame, LinePrimitive, RectPrimitive, TextHAlign,
    TextPrimitive,
};
use crate::zoom::ScaleTransform;

const MEASURE_ID_FONT_SIZE_PX: f64 = 10.0;
const MEASURE_ID_OFFSET_X_PX: i32 = -5;
const MEASURE_ID_OFFSET_Y_PX: i32 = -15;
const STAFF_LINE_COUNT: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pass {
    Recompute,
    Mark,
    Paint,
    Render,
}

/// Outcome of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    pub pass: Pass,
    pub visited: usize,
    /// Nodes whose hook stopped descent.
    pub pruned: usize,
}

impl PassSummary {
    fn new(pass: Pass) -> Self {
        Self {
            pass,
            visited: 0,
            pruned: 0,
        }
    }
}

impl ScoreTree {
    /// Walks `start` and its descendants in pre-order.
    ///
    /// `visit` returns whether to continue into the children of the node.
    pub fn walk<F>(&self, start: NodeId, pass: Pass, visit: &mut F) -> ScoreResult<PassSummary>
    where
        F: FnMut(&ScoreTree, NodeId) -> ScoreResult<bool>,
    {
        self.node(start)?;
        let mut summary = PassSummary::new(pass);
        self.walk_node(start, visit, &mut summary)?;
        Ok(summary)
    }

    fn walk_node<F>(&self, node: NodeId, visit: &mut F, summary: &mut PassSummary) -> ScoreResult<()>
    where
        F: FnMut(&ScoreTree, NodeId) -> ScoreResult<bool>,
    {
        summary.visited += 1;
        if !visit(self, node)? {
            summary.pruned += 1;
            return Ok(());
        }
        for child in self.child_ids(node) {
            self.walk_node(child, visit, summary)?;
        }
        Ok(())
    }

    /// Mutable pre-order walk. Children are read after the hook of their
    /// parent ran, so a hook may fix up state that its children rely on.
    fn walk_mut<F>(&mut self, start: NodeId, pass: Pass, visit: &mut F) -> ScoreResult<PassSummary>
    where
        F: FnMut(&mut ScoreTree, NodeId) -> ScoreResult<bool>,
    {
        self.node(start)?;
        let mut summary = PassSummary::new(pass);
        self.walk_node_mut(start, visit, &mut summary)?;
        Ok(summary)
    }

    fn walk_node_mut<F>(
        &mut self,
        node: NodeId,
        visit: &mut F,
        summary: &mut PassSummary,
    ) -> ScoreResult<()>
    where
        F: FnMut(&mut ScoreTree, NodeId) -> ScoreResult<bool>,
    {
        summary.visited += 1;
        if !visit(self, node)? {
            summary.pruned += 1;
            return Ok(());
        }
        for child in self.child_ids(node) {
            self.walk_node_mut(child, visit, summary)?;
        }
        Ok(())
    }

    /// Rebuilds derived state of the whole tree after structural edits.
    ///
    /// Measures are renumbered left to right and their staff link refreshed.
    pub fn recompute(&mut self) -> ScoreResult<PassSummary> {
        self.recompute_from(self.root())
    }

    /// Recomputes the subtree holding `start`.
    ///
    /// The pass is widened to the node owning the measure counter (the
    /// enclosing staff, or the whole score under
    /// [`MeasureIdScope::PerScore`]) so ids stay dense and in sibling order.
    pub fn recompute_from(&mut self, start: NodeId) -> ScoreResult<PassSummary> {
        let start = self.counter_owner(start)?;
        let summary = self.walk_mut(start, Pass::Recompute, &mut |tree, node| {
            tree.recompute_node(node)
        })?;
        debug!(start = ?start, visited = summary.visited, "recompute pass");
        Ok(summary)
    }

    fn counter_owner(&self, start: NodeId) -> ScoreResult<NodeId> {
        match self.id_scope() {
            MeasureIdScope::PerStaff => Ok(self.staff_of(start)?.unwrap_or(start)),
            MeasureIdScope::PerScore => {
                self.node(start)?;
                Ok(self.root())
            }
        }
    }

    fn recompute_node(&mut self, node: NodeId) -> ScoreResult<bool> {
        let scope = self.id_scope();
        let entry = self.node_mut(node)?;
        entry.stale = false;
        let is_measure = matches!(entry.kind, NodeKind::Measure(_));
        match &mut entry.kind {
            NodeKind::Score(score) if scope == MeasureIdScope::PerScore => {
                score.last_measure_id = 0;
            }
            NodeKind::Staff(staff) if scope == MeasureIdScope::PerStaff => {
                staff.last_measure_id = 0;
            }
            _ => {}
        }
        if is_measure {
            self.recompute_measure(node)?;
        }
        Ok(true)
    }

    fn recompute_measure(&mut self, measure: NodeId) -> ScoreResult<()> {
        let Some(staff) = self.staff_of(measure)? else {
            return Err(ScoreError::InvalidData(format!(
                "measure {measure:?} is not contained in a staff"
            )));
        };
        let id = self.next_measure_id(staff)?;
        let data = self.measure_data_mut(measure)?;
        data.staff = Some(staff);
        data.id = id;
        data.left_x.set(None);
        if data.barline.is_none() {
            warn!(measure = ?measure, id, "measure has no ending barline");
        }
        Ok(())
    }

    fn next_measure_id(&mut self, staff: NodeId) -> ScoreResult<u32> {
        match self.id_scope() {
            MeasureIdScope::PerStaff => {
                let data = self.staff_data_mut(staff)?;
                data.last_measure_id += 1;
                Ok(data.last_measure_id)
            }
            MeasureIdScope::PerScore => {
                let root = self.root();
                match &mut self.node_mut(root)?.kind {
                    NodeKind::Score(score) => {
                        score.last_measure_id += 1;
                        Ok(score.last_measure_id)
                    }
                    other => Err(ScoreError::UnexpectedKind {
                        node: root,
                        expected: NodeKindTag::Score,
                        actual: other.tag(),
                    }),
                }
            }
        }
    }

    /// Propagates a highlight `marker` through `channel`.
    pub fn mark(
        &self,
        context: &mut MarkContext,
        channel: MarkChannel,
        marker: Color,
    ) -> ScoreResult<PassSummary> {
        self.mark_from(self.root(), context, channel, marker)
    }

    pub fn mark_from(
        &self,
        start: NodeId,
        context: &mut MarkContext,
        channel: MarkChannel,
        marker: Color,
    ) -> ScoreResult<PassSummary> {
        self.walk(start, Pass::Mark, &mut |tree, node| {
            tree.mark_node(node, context, channel, marker)
        })
    }

    fn mark_node(
        &self,
        node: NodeId,
        context: &mut MarkContext,
        channel: MarkChannel,
        marker: Color,
    ) -> ScoreResult<bool> {
        match self.node(node)?.kind() {
            NodeKind::Measure(data) => {
                if let Some(barline) = data.barline {
                    for section in self.barline_geometry(barline)?.sections() {
                        context.assign(channel, section, marker);
                    }
                }
            }
            NodeKind::Clef(clef) => {
                for section in &clef.sections {
                    context.assign(channel, *section, marker);
                }
            }
            _ => {}
        }
        Ok(true)
    }

    /// Draws underlay content (measure numbers) into the background layer.
    pub fn paint_background(
        &self,
        frame: &mut LayeredRenderFrame,
        zoom: &ScaleTransform,
    ) -> ScoreResult<PassSummary> {
        self.walk(self.root(), Pass::Paint, &mut |tree, node| {
            tree.paint_node(node, frame, zoom)
        })
    }

    fn paint_node(
        &self,
        node: NodeId,
        frame: &mut LayeredRenderFrame,
        zoom: &ScaleTransform,
    ) -> ScoreResult<bool> {
        let NodeKind::Measure(data) = self.node(node)?.kind() else {
            return Ok(true);
        };
        let staff = match data.staff {
            Some(staff) if self.contains(staff) => Some(staff),
            _ => self.staff_of(node)?,
        };
        let Some(staff) = staff else {
            return Ok(true);
        };
        let staff = self.staff_data(staff)?;
        // Numbers are drawn once per system, above its first staff.
        if staff.stafflink != 0 {
            return Ok(true);
        }
        let left_x = self.left_x(node)?;
        let x = zoom.scaled(f64::from(staff.origin.x + left_x)) + MEASURE_ID_OFFSET_X_PX;
        let y = zoom.scaled(f64::from(staff.origin.y)) + MEASURE_ID_OFFSET_Y_PX;
        frame.push_text(
            CanvasLayerKind::Background,
            TextPrimitive::new(
                data.id.to_string(),
                f64::from(x),
                f64::from(y),
                MEASURE_ID_FONT_SIZE_PX,
                Color::LIGHT_GRAY,
                TextHAlign::Left,
            ),
        );
        Ok(true)
    }

    /// Draws the primary geometry into the foreground layer.
    pub fn render_foreground(
        &self,
        frame: &mut LayeredRenderFrame,
        zoom: &ScaleTransform,
    ) -> ScoreResult<PassSummary> {
        self.walk(self.root(), Pass::Render, &mut |tree, node| {
            tree.render_node(node, frame, zoom)
        })
    }

    fn render_node(
        &self,
        node: NodeId,
        frame: &mut LayeredRenderFrame,
        zoom: &ScaleTransform,
    ) -> ScoreResult<bool> {
        match self.node(node)?.kind() {
            NodeKind::Staff(staff) => {
                let left = f64::from(zoom.scaled(f64::from(staff.origin.x)));
                let right = f64::from(zoom.scaled(f64::from(staff.origin.x + staff.width)));
                for line in 0..STAFF_LINE_COUNT {
                    let y = f64::from(
                        zoom.scaled(f64::from(staff.origin.y + line * staff.interline)),
                    );
                    frame.push_line(
                        CanvasLayerKind::Foreground,
                        LinePrimitive::new(left, y, right, y, 1.0, Color::BLACK),
                    );
                }
            }
            NodeKind::Measure(data) => {
                if let Some(barline) = data.barline {
                    let origin = self.staff_origin(node)?;
                    for segment in self.barline_geometry(barline)?.segments() {
                        let rect = zoom.scaled_rect(segment.bounds.translated(origin));
                        frame.push_rect(
                            CanvasLayerKind::Foreground,
                            RectPrimitive::from_display(rect, Color::BLACK),
                        );
                    }
                }
            }
            NodeKind::Clef(clef) => {
                let interline = self.staff_interline(node)?;
                let at = self.staff_origin(node)?.offset(clef.center);
                let position = zoom.scaled_point(at);
                frame.push_text(
                    CanvasLayerKind::Foreground,
                    TextPrimitive::new(
                        clef.shape.symbol(),
                        f64::from(position.x),
                        f64::from(position.y),
                        glyph_size(zoom, 4 * interline),
                        Color::BLACK,
                        TextHAlign::Center,
                    ),
                );
            }
            NodeKind::TimeSignature(signature) => {
                let interline = self.staff_interline(node)?;
                let at = self.staff_origin(node)?.offset(signature.center);
                let position = zoom.scaled_point(at);
                frame.push_text(
                    CanvasLayerKind::Foreground,
                    TextPrimitive::new(
                        format!("{}/{}", signature.numerator, signature.denominator),
                        f64::from(position.x),
                        f64::from(position.y),
                        glyph_size(zoom, 2 * interline),
                        Color::BLACK,
                        TextHAlign::Center,
                    ),
                );
            }
            _ => {}
        }
        Ok(true)
    }

    fn staff_origin(&self, node: NodeId) -> ScoreResult<ModelPoint> {
        match self.staff_of(node)? {
            Some(staff) => Ok(self.staff_data(staff)?.origin),
            None => Ok(ModelPoint::default()),
        }
    }

    fn staff_interline(&self, node: NodeId) -> ScoreResult<i32> {
        match self.staff_of(node)? {
            Some(staff) => Ok(self.staff_data(staff)?.interline),
            None => Ok(1),
        }
    }
}

fn glyph_size(zoom: &ScaleTransform, model_height: i32) -> f64 {
    f64::from(zoom.scaled(f64::from(model_height))).max(1.0)
}
