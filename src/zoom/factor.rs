use serde::{Deserialize, Serialize};

use crate::core::{ModelPoint, ModelRect, ModelSize};
use crate::error::{ScoreError, ScoreResult};
use crate::zoom::{DisplayPoint, DisplayRect, DisplaySize};

/// Validated model-to-display ratio.
///
/// Plain `Copy` value carrying the coordinate math of a
/// [`ScaleTransform`](crate::zoom::ScaleTransform). Hand this, not the
/// transform, to code running off the session thread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomFactor {
    ratio: f64,
}

impl ZoomFactor {
    pub const IDENTITY: Self = Self { ratio: 1.0 };

    pub fn new(ratio: f64) -> ScoreResult<Self> {
        validate_ratio(ratio)?;
        Ok(Self { ratio })
    }

    /// Display units per model unit.
    #[must_use]
    pub const fn ratio(self) -> f64 {
        self.ratio
    }

    /// Model -> display, rounding half away from zero.
    #[must_use]
    pub fn scaled(self, value: f64) -> i32 {
        (value * self.ratio).round() as i32
    }

    /// Model -> display, truncating toward zero so the result never
    /// overshoots the true extent of a positive value.
    #[must_use]
    pub fn trunc_scaled(self, value: f64) -> i32 {
        (value * self.ratio).trunc() as i32
    }

    /// Display -> model, rounding half away from zero.
    #[must_use]
    pub fn unscaled(self, value: f64) -> i32 {
        (value / self.ratio).round() as i32
    }

    #[must_use]
    pub fn trunc_unscaled(self, value: f64) -> i32 {
        (value / self.ratio).trunc() as i32
    }

    /// Display -> model without integer rounding.
    #[must_use]
    pub fn unscaled_exact(self, value: f64) -> f64 {
        value / self.ratio
    }

    #[must_use]
    pub fn scaled_point(self, point: ModelPoint) -> DisplayPoint {
        DisplayPoint::new(
            self.scaled(f64::from(point.x)),
            self.scaled(f64::from(point.y)),
        )
    }

    #[must_use]
    pub fn scaled_size(self, size: ModelSize) -> DisplaySize {
        DisplaySize::new(
            self.scaled(f64::from(size.width)),
            self.scaled(f64::from(size.height)),
        )
    }

    /// Component-wise mapping: origin and extent are rounded independently.
    #[must_use]
    pub fn scaled_rect(self, rect: ModelRect) -> DisplayRect {
        DisplayRect::new(
            self.scaled(f64::from(rect.x)),
            self.scaled(f64::from(rect.y)),
            self.scaled(f64::from(rect.width)),
            self.scaled(f64::from(rect.height)),
        )
    }

    #[must_use]
    pub fn unscaled_point(self, point: DisplayPoint) -> ModelPoint {
        ModelPoint::new(
            self.unscaled(f64::from(point.x)),
            self.unscaled(f64::from(point.y)),
        )
    }

    #[must_use]
    pub fn unscaled_size(self, size: DisplaySize) -> ModelSize {
        ModelSize::new(
            self.unscaled(f64::from(size.width)),
            self.unscaled(f64::from(size.height)),
        )
    }

    #[must_use]
    pub fn unscaled_rect(self, rect: DisplayRect) -> ModelRect {
        ModelRect::new(
            self.unscaled(f64::from(rect.x)),
            self.unscaled(f64::from(rect.y)),
            self.unscaled(f64::from(rect.width)),
            self.unscaled(f64::from(rect.height)),
        )
    }
}

impl Default for ZoomFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

pub(crate) fn validate_ratio(ratio: f64) -> ScoreResult<()> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(ScoreError::InvalidRatio(ratio));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ZoomFactor;
    use crate::core::{ModelPoint, ModelRect};
    use crate::zoom::{DisplayPoint, DisplayRect};

    #[test]
    fn scaled_rounds_and_trunc_scaled_floors() {
        let factor = ZoomFactor::new(2.0).expect("ratio");
        assert_eq!(factor.scaled(10.4), 21);
        assert_eq!(factor.trunc_scaled(10.4), 20);
        assert_eq!(factor.scaled(10.25), 21);
        assert_eq!(factor.scaled(-10.25), -21);
    }

    #[test]
    fn inverse_mapping_mirrors_both_variants() {
        let factor = ZoomFactor::new(4.0).expect("ratio");
        assert_eq!(factor.unscaled(10.0), 3);
        assert_eq!(factor.trunc_unscaled(10.0), 2);
        approx::assert_relative_eq!(factor.unscaled_exact(10.0), 2.5);
    }

    #[test]
    fn composite_values_map_component_wise() {
        let factor = ZoomFactor::new(0.5).expect("ratio");
        assert_eq!(
            factor.scaled_point(ModelPoint::new(101, -7)),
            DisplayPoint::new(51, -4)
        );
        assert_eq!(
            factor.scaled_rect(ModelRect::new(10, 21, 6, 3)),
            DisplayRect::new(5, 11, 3, 2)
        );
        assert_eq!(
            factor.unscaled_rect(DisplayRect::new(5, 11, 3, 2)),
            ModelRect::new(10, 22, 6, 4)
        );
    }

    #[test]
    fn non_positive_ratios_are_rejected() {
        assert!(ZoomFactor::new(0.0).is_err());
        assert!(ZoomFactor::new(-1.5).is_err());
        assert!(ZoomFactor::new(f64::NAN).is_err());
        assert!(ZoomFactor::new(f64::INFINITY).is_err());
    }
}
