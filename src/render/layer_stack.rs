use serde::{Deserialize, Serialize};

/// Output layer filled by one drawing pass.
///
/// The background pass (labels, underlays) is always composed beneath the
/// foreground pass (primary geometry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanvasLayerKind {
    Background,
    Foreground,
}

impl CanvasLayerKind {
    /// Composition order, bottom first.
    pub const CANONICAL: [Self; 2] = [Self::Background, Self::Foreground];
}

#[cfg(test)]
mod tests {
    use super::CanvasLayerKind;

    #[test]
    fn background_is_composed_first() {
        assert_eq!(
            CanvasLayerKind::CANONICAL,
            [CanvasLayerKind::Background, CanvasLayerKind::Foreground]
        );
    }
}
