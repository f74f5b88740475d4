use tracing::trace;

use crate::error::{ScoreError, ScoreResult};
use crate::zoom::{ControlUpdate, RatioControl};

/// Logarithmic zoom slider.
///
/// Integer positions map to `2^(position / divisions)`, so every doubling of
/// the ratio spans the same slider distance. Only those ratios are
/// representable.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSlider {
    id: String,
    divisions: u32,
    min_position: i32,
    max_position: i32,
    position: i32,
    adjusting: bool,
}

impl LogSlider {
    /// Slider covering `2^min_exponent ..= 2^max_exponent`.
    pub fn new(
        id: impl Into<String>,
        min_exponent: i32,
        max_exponent: i32,
        divisions: u32,
    ) -> ScoreResult<Self> {
        if min_exponent >= max_exponent {
            return Err(ScoreError::InvalidConfiguration(
                "log slider needs min_exponent < max_exponent".to_owned(),
            ));
        }
        let Ok(steps) = i32::try_from(divisions) else {
            return Err(ScoreError::InvalidConfiguration(
                "log slider divisions out of range".to_owned(),
            ));
        };
        if steps == 0 {
            return Err(ScoreError::InvalidConfiguration(
                "log slider needs at least one division per doubling".to_owned(),
            ));
        }
        Ok(Self {
            id: id.into(),
            divisions,
            min_position: min_exponent.saturating_mul(steps),
            max_position: max_exponent.saturating_mul(steps),
            position: 0,
            adjusting: false,
        })
    }

    #[must_use]
    pub fn position(&self) -> i32 {
        self.position
    }

    #[must_use]
    pub fn bounds(&self) -> (i32, i32) {
        (self.min_position, self.max_position)
    }

    /// `true` between a drag and the matching release.
    #[must_use]
    pub fn is_adjusting(&self) -> bool {
        self.adjusting
    }

    #[must_use]
    pub fn ratio_at(&self, position: i32) -> f64 {
        (f64::from(position) / f64::from(self.divisions)).exp2()
    }

    /// Nearest representable position for `ratio`, clamped to the bounds.
    #[must_use]
    pub fn position_for(&self, ratio: f64) -> i32 {
        if !ratio.is_finite() || ratio <= 0.0 {
            return self.position;
        }
        let raw = (ratio.log2() * f64::from(self.divisions)).round();
        raw.clamp(f64::from(self.min_position), f64::from(self.max_position)) as i32
    }

    /// Moves the thumb by whole positions and settles there.
    pub fn step(&mut self, delta: i32) -> ControlUpdate {
        self.position = self
            .position
            .saturating_add(delta)
            .clamp(self.min_position, self.max_position);
        self.adjusting = false;
        ControlUpdate::final_value(self.value())
    }
}

impl RatioControl for LogSlider {
    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self) -> f64 {
        self.ratio_at(self.position)
    }

    fn set_value(&mut self, ratio: f64) -> f64 {
        self.position = self.position_for(ratio);
        trace!(
            slider = %self.id,
            requested = ratio,
            position = self.position,
            "log slider set value"
        );
        self.value()
    }

    fn drag(&mut self, ratio: f64) -> ControlUpdate {
        self.adjusting = true;
        ControlUpdate::in_progress(self.set_value(ratio))
    }

    fn release(&mut self) -> ControlUpdate {
        self.adjusting = false;
        ControlUpdate::final_value(self.value())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::LogSlider;
    use crate::zoom::{ControlPhase, RatioControl};

    #[test]
    fn set_value_quantizes_to_nearest_log_step() {
        let mut slider = LogSlider::new("zoom", -3, 5, 4).expect("slider");
        assert_relative_eq!(slider.set_value(2.0), 2.0);
        assert_eq!(slider.position(), 4);
        // 2^(1/4) ~= 1.189, 2^(2/4) ~= 1.414
        assert_relative_eq!(slider.set_value(1.25), 2f64.powf(0.25));
    }

    #[test]
    fn out_of_range_ratios_clamp_to_bounds() {
        let mut slider = LogSlider::new("zoom", -1, 1, 2).expect("slider");
        assert_relative_eq!(slider.set_value(100.0), 2.0);
        assert_relative_eq!(slider.set_value(0.001), 0.5);
    }

    #[test]
    fn drag_and_release_report_phases() {
        let mut slider = LogSlider::new("zoom", -2, 2, 1).expect("slider");
        let update = slider.drag(2.0);
        assert_eq!(update.phase, ControlPhase::InProgress);
        assert!(slider.is_adjusting());

        let update = slider.release();
        assert_eq!(update.phase, ControlPhase::Final);
        assert_relative_eq!(update.value, 2.0);
        assert!(!slider.is_adjusting());
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        assert!(LogSlider::new("zoom", 2, 2, 4).is_err());
        assert!(LogSlider::new("zoom", 0, 2, 0).is_err());
    }
}
