use crate::core::Viewport;
use crate::error::ScoreResult;

use super::{CanvasLayerKind, LinePrimitive, RectPrimitive, RenderFrame, TextPrimitive};

#[derive(Debug, Clone, PartialEq)]
pub struct LayerPrimitives {
    pub kind: CanvasLayerKind,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl LayerPrimitives {
    #[must_use]
    pub fn new(kind: CanvasLayerKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            rects: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rects.is_empty() && self.texts.is_empty()
    }
}

/// Drawing surface handed to the paint and render passes.
///
/// Each pass writes into its own layer; [`flatten`](Self::flatten) composes
/// them bottom-up for a [`Renderer`](super::Renderer).
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredRenderFrame {
    pub viewport: Viewport,
    pub layers: Vec<LayerPrimitives>,
}

impl LayeredRenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            layers: CanvasLayerKind::CANONICAL
                .into_iter()
                .map(LayerPrimitives::new)
                .collect(),
        }
    }

    pub fn push_line(&mut self, kind: CanvasLayerKind, line: LinePrimitive) {
        if let Some(layer) = self.layer_mut(kind) {
            layer.lines.push(line);
        }
    }

    pub fn push_rect(&mut self, kind: CanvasLayerKind, rect: RectPrimitive) {
        if let Some(layer) = self.layer_mut(kind) {
            layer.rects.push(rect);
        }
    }

    pub fn push_text(&mut self, kind: CanvasLayerKind, text: TextPrimitive) {
        if let Some(layer) = self.layer_mut(kind) {
            layer.texts.push(text);
        }
    }

    #[must_use]
    pub fn layer(&self, kind: CanvasLayerKind) -> Option<&LayerPrimitives> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }

    fn layer_mut(&mut self, kind: CanvasLayerKind) -> Option<&mut LayerPrimitives> {
        self.layers.iter_mut().find(|layer| layer.kind == kind)
    }

    #[must_use]
    pub fn flatten(&self) -> RenderFrame {
        let mut frame = RenderFrame::new(self.viewport);
        for layer in &self.layers {
            frame.lines.extend(layer.lines.iter().copied());
            frame.rects.extend(layer.rects.iter().copied());
            frame.texts.extend(layer.texts.iter().cloned());
        }
        frame
    }

    pub fn validate(&self) -> ScoreResult<()> {
        self.flatten().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::LayeredRenderFrame;
    use crate::core::Viewport;
    use crate::render::{CanvasLayerKind, Color, LinePrimitive, TextHAlign, TextPrimitive};

    #[test]
    fn flatten_keeps_background_before_foreground() {
        let mut frame = LayeredRenderFrame::new(Viewport::new(200, 100));
        frame.push_line(
            CanvasLayerKind::Foreground,
            LinePrimitive::new(0.0, 0.0, 10.0, 0.0, 1.0, Color::BLACK),
        );
        frame.push_line(
            CanvasLayerKind::Background,
            LinePrimitive::new(0.0, 5.0, 10.0, 5.0, 1.0, Color::LIGHT_GRAY),
        );
        frame.push_text(
            CanvasLayerKind::Background,
            TextPrimitive::new("1", 4.0, 4.0, 10.0, Color::LIGHT_GRAY, TextHAlign::Left),
        );

        let flat = frame.flatten();
        flat.validate().expect("valid frame");
        assert_eq!(flat.lines.len(), 2);
        assert_eq!(flat.lines[0].color, Color::LIGHT_GRAY);
        assert_eq!(flat.texts.len(), 1);
    }
}
