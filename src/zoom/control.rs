use serde::{Deserialize, Serialize};

/// Whether a control report is intermediate (still dragging) or settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlPhase {
    InProgress,
    Final,
}

/// Value reported by an interactive control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlUpdate {
    pub value: f64,
    pub phase: ControlPhase,
}

impl ControlUpdate {
    #[must_use]
    pub const fn in_progress(value: f64) -> Self {
        Self {
            value,
            phase: ControlPhase::InProgress,
        }
    }

    #[must_use]
    pub const fn final_value(value: f64) -> Self {
        Self {
            value,
            phase: ControlPhase::Final,
        }
    }

    #[must_use]
    pub fn is_final(self) -> bool {
        self.phase == ControlPhase::Final
    }
}

/// Numeric input that can drive a [`ScaleTransform`](crate::zoom::ScaleTransform).
///
/// A control only represents some ratios; it is authoritative about the
/// exact value once attached.
pub trait RatioControl {
    fn id(&self) -> &str;

    /// Current ratio shown by the control.
    fn value(&self) -> f64;

    /// Moves the control as close as it can get to `ratio` and returns the
    /// value it settled on.
    fn set_value(&mut self, ratio: f64) -> f64;

    /// User gesture: the control moves while still being held.
    fn drag(&mut self, ratio: f64) -> ControlUpdate {
        ControlUpdate::in_progress(self.set_value(ratio))
    }

    /// User gesture: the control is let go on its current value.
    fn release(&mut self) -> ControlUpdate {
        ControlUpdate::final_value(self.value())
    }
}
