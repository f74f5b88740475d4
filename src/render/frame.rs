use crate::core::Viewport;
use crate::error::{ScoreError, ScoreResult};
use crate::render::{LinePrimitive, RectPrimitive, TextPrimitive};

/// Flat primitive list handed to a [`Renderer`](crate::render::Renderer).
///
/// Produced by [`LayeredRenderFrame::flatten`](crate::render::LayeredRenderFrame::flatten),
/// so measure labels always precede staff and barline geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl RenderFrame {
    pub(crate) fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            lines: Vec::new(),
            rects: Vec::new(),
            texts: Vec::new(),
        }
    }

    /// Checks the viewport, then every primitive in draw order.
    pub fn validate(&self) -> ScoreResult<()> {
        if !self.viewport.is_valid() {
            return Err(ScoreError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        self.lines.iter().try_for_each(|line| line.validate())?;
        self.rects.iter().try_for_each(|rect| rect.validate())?;
        self.texts.iter().try_for_each(TextPrimitive::validate)
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.lines.len() + self.rects.len() + self.texts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }
}
