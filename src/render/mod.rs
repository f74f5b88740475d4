mod frame;
mod layer_stack;
mod layered_frame;
mod null_renderer;
mod primitives;

pub use frame::RenderFrame;
pub use layer_stack::CanvasLayerKind;
pub use layered_frame::{LayerPrimitives, LayeredRenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};

use crate::error::ScoreResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `RenderFrame`, so drawing code stays
/// isolated from the score tree and its traversal passes.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ScoreResult<()>;
}
