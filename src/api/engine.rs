use indextree::NodeId;
use tracing::{debug, warn};

use crate::core::{PassSummary, ScoreTree, Viewport};
use crate::error::ScoreResult;
use crate::interaction::{MarkChannel, MarkContext};
use crate::render::{Color, LayeredRenderFrame, Renderer};
use crate::zoom::{ScaleTransform, ZoomFactor};

use super::ScoreEngineConfig;

/// Main orchestration facade consumed by host applications.
///
/// `ScoreEngine` owns the score tree, the zoom transform of the view and the
/// renderer, and runs the traversal passes in the order a frame needs them.
pub struct ScoreEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) tree: ScoreTree,
    pub(super) zoom: ScaleTransform,
    pub(super) recompute_pending: bool,
}

impl<R: Renderer> ScoreEngine<R> {
    pub fn new(renderer: R, config: ScoreEngineConfig) -> ScoreResult<Self> {
        config.validate()?;
        let tree = ScoreTree::new(config.score_size).with_id_scope(config.measure_ids);
        let zoom = ScaleTransform::new(config.zoom)?;
        debug!(
            width = config.score_size.width,
            height = config.score_size.height,
            ratio = config.zoom.initial_ratio,
            "score engine created"
        );
        Ok(Self {
            renderer,
            tree,
            zoom,
            recompute_pending: false,
        })
    }

    #[must_use]
    pub fn tree(&self) -> &ScoreTree {
        &self.tree
    }

    /// Raw structural access. The tree is considered stale until the next
    /// [`recompute`](Self::recompute).
    pub fn tree_mut(&mut self) -> &mut ScoreTree {
        self.recompute_pending = true;
        &mut self.tree
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    #[must_use]
    pub fn zoom(&self) -> &ScaleTransform {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ScaleTransform {
        &mut self.zoom
    }

    #[must_use]
    pub fn factor(&self) -> ZoomFactor {
        self.zoom.factor()
    }

    #[must_use]
    pub fn is_recompute_pending(&self) -> bool {
        self.recompute_pending
    }

    pub fn recompute(&mut self) -> ScoreResult<PassSummary> {
        let summary = self.tree.recompute()?;
        self.recompute_pending = false;
        Ok(summary)
    }

    pub fn mark(
        &self,
        context: &mut MarkContext,
        channel: MarkChannel,
        marker: Color,
    ) -> ScoreResult<PassSummary> {
        self.tree.mark(context, channel, marker)
    }

    /// Display extent of the whole score at the current ratio.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        let size = self.zoom.scaled_size(self.tree.size());
        Viewport::new(
            u32::try_from(size.width.max(1)).unwrap_or(1),
            u32::try_from(size.height.max(1)).unwrap_or(1),
        )
    }

    /// Runs the paint pass then the render pass into a fresh frame.
    pub fn build_layered_frame(&self) -> ScoreResult<LayeredRenderFrame> {
        let mut frame = LayeredRenderFrame::new(self.viewport());
        self.tree.paint_background(&mut frame, &self.zoom)?;
        self.tree.render_foreground(&mut frame, &self.zoom)?;
        Ok(frame)
    }

    pub fn render(&mut self) -> ScoreResult<()> {
        if self.recompute_pending {
            warn!("rendering a score tree with a pending recompute");
        }
        let frame = self.build_layered_frame()?;
        frame.validate()?;
        self.renderer.render(&frame.flatten())
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
