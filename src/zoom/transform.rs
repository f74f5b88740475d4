use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{ModelPoint, ModelRect, ModelSize};
use crate::error::{ScoreError, ScoreResult};
use crate::zoom::factor::validate_ratio;
use crate::zoom::{
    ControlPhase, ControlUpdate, DisplayPoint, DisplayRect, DisplaySize, RatioControl, ZoomChange,
    ZoomFactor, ZoomId, ZoomListener,
};

/// Bootstrap settings of a [`ScaleTransform`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    #[serde(default = "default_initial_ratio")]
    pub initial_ratio: f64,
    /// Forward in-progress control reports, not only final ones.
    #[serde(default = "default_continuous_update")]
    pub continuous_update: bool,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            initial_ratio: default_initial_ratio(),
            continuous_update: default_continuous_update(),
        }
    }
}

impl ZoomConfig {
    #[must_use]
    pub fn with_initial_ratio(mut self, ratio: f64) -> Self {
        self.initial_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_continuous_update(mut self, enabled: bool) -> Self {
        self.continuous_update = enabled;
        self
    }
}

fn default_initial_ratio() -> f64 {
    1.0
}

fn default_continuous_update() -> bool {
    true
}

/// Zoom: the model -> display transform of one view.
///
/// Two write paths converge on the ratio: [`set_ratio`](Self::set_ratio) and
/// reports from an attached [`RatioControl`]. When a control is attached a
/// direct request is routed through it, and a report only applies when it
/// differs from the current ratio, which breaks the control/transform loop.
pub struct ScaleTransform {
    id: ZoomId,
    factor: ZoomFactor,
    continuous_update: bool,
    control: Option<Box<dyn RatioControl>>,
    listeners: Vec<Box<dyn ZoomListener>>,
    sequence: u64,
}

impl ScaleTransform {
    pub fn new(config: ZoomConfig) -> ScoreResult<Self> {
        let factor = ZoomFactor::new(config.initial_ratio)?;
        let transform = Self {
            id: ZoomId::next(),
            factor,
            continuous_update: config.continuous_update,
            control: None,
            listeners: Vec::new(),
            sequence: 0,
        };
        debug!(zoom = transform.id.raw(), ratio = factor.ratio(), "zoom created");
        Ok(transform)
    }

    pub fn with_ratio(ratio: f64) -> ScoreResult<Self> {
        Self::new(ZoomConfig::default().with_initial_ratio(ratio))
    }

    #[must_use]
    pub fn id(&self) -> ZoomId {
        self.id
    }

    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.factor.ratio()
    }

    /// Snapshot of the current ratio, detached from listeners and control.
    #[must_use]
    pub fn factor(&self) -> ZoomFactor {
        self.factor
    }

    #[must_use]
    pub fn continuous_update(&self) -> bool {
        self.continuous_update
    }

    pub fn set_continuous_update(&mut self, enabled: bool) {
        self.continuous_update = enabled;
    }

    /// Requests a new ratio.
    ///
    /// With a control attached the control decides the exact value, and the
    /// change arrives through [`on_control_update`](Self::on_control_update).
    pub fn set_ratio(&mut self, ratio: f64) -> ScoreResult<()> {
        validate_ratio(ratio)?;
        match self.control.as_mut() {
            Some(control) => {
                let settled = control.set_value(ratio);
                debug!(
                    zoom = self.id.raw(),
                    requested = ratio,
                    settled,
                    "ratio request routed through control"
                );
                self.on_control_update(ControlUpdate::final_value(settled))?;
                Ok(())
            }
            None => self.force_ratio(ratio),
        }
    }

    /// Imposes `ratio` and notifies listeners, bypassing any control.
    pub fn force_ratio(&mut self, ratio: f64) -> ScoreResult<()> {
        self.factor = ZoomFactor::new(ratio)?;
        debug!(zoom = self.id.raw(), ratio, "force ratio");
        self.fire_state_changed();
        Ok(())
    }

    /// Applies a report coming from the attached control.
    ///
    /// Returns `true` when the ratio changed and listeners were notified.
    /// In-progress reports are ignored unless continuous update is enabled.
    pub fn on_control_update(&mut self, update: ControlUpdate) -> ScoreResult<bool> {
        if self.control.is_none() {
            return Err(ScoreError::InvalidConfiguration(
                "no control is attached to this zoom".to_owned(),
            ));
        }
        if update.phase == ControlPhase::InProgress && !self.continuous_update {
            trace!(zoom = self.id.raw(), value = update.value, "skip in-progress report");
            return Ok(false);
        }
        validate_ratio(update.value)?;
        if update.value == self.factor.ratio() {
            return Ok(false);
        }
        self.force_ratio(update.value)?;
        Ok(true)
    }

    /// Links `control` to this transform, moving it to the current ratio.
    ///
    /// The control is authoritative: when it cannot represent the current
    /// ratio exactly, the transform adopts the value it settled on and
    /// notifies listeners. Only one control may be attached at a time.
    pub fn attach_control(&mut self, mut control: Box<dyn RatioControl>) -> ScoreResult<()> {
        if let Some(existing) = &self.control {
            return Err(ScoreError::InvalidConfiguration(format!(
                "control `{}` is already attached",
                existing.id()
            )));
        }
        let settled = control.set_value(self.factor.ratio());
        validate_ratio(settled)?;
        debug!(
            zoom = self.id.raw(),
            control = control.id(),
            settled,
            "attach control"
        );
        self.control = Some(control);
        if settled != self.factor.ratio() {
            self.force_ratio(settled)?;
        }
        Ok(())
    }

    /// Lets the host operate the attached control, then applies its report.
    pub fn drive_control<F>(&mut self, gesture: F) -> ScoreResult<bool>
    where
        F: FnOnce(&mut dyn RatioControl) -> ControlUpdate,
    {
        let Some(control) = self.control.as_deref_mut() else {
            return Err(ScoreError::InvalidConfiguration(
                "no control is attached to this zoom".to_owned(),
            ));
        };
        let update = gesture(control);
        self.on_control_update(update)
    }

    pub fn detach_control(&mut self) -> ScoreResult<Box<dyn RatioControl>> {
        self.control.take().ok_or_else(|| {
            ScoreError::InvalidConfiguration("no control is attached to this zoom".to_owned())
        })
    }

    #[must_use]
    pub fn control(&self) -> Option<&dyn RatioControl> {
        self.control.as_deref()
    }

    #[must_use]
    pub fn has_control(&self) -> bool {
        self.control.is_some()
    }

    /// Registers a listener with a unique identifier.
    pub fn add_listener(&mut self, listener: Box<dyn ZoomListener>) -> ScoreResult<()> {
        let listener_id = listener.id().to_owned();
        if listener_id.is_empty() {
            return Err(ScoreError::InvalidConfiguration(
                "zoom listener id must not be empty".to_owned(),
            ));
        }
        if self.listeners.iter().any(|entry| entry.id() == listener_id) {
            return Err(ScoreError::InvalidConfiguration(format!(
                "zoom listener `{listener_id}` is already registered"
            )));
        }
        self.listeners.push(listener);
        debug!(
            zoom = self.id.raw(),
            listener = %listener_id,
            count = self.listeners.len(),
            "add zoom listener"
        );
        Ok(())
    }

    /// Unregisters a listener by id. Returns `true` when removed.
    pub fn remove_listener(&mut self, listener_id: &str) -> bool {
        if let Some(position) = self
            .listeners
            .iter()
            .position(|entry| entry.id() == listener_id)
        {
            self.listeners.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn fire_state_changed(&mut self) {
        self.sequence += 1;
        let change = ZoomChange {
            source: self.id,
            ratio: self.factor.ratio(),
            sequence: self.sequence,
        };
        trace!(
            zoom = self.id.raw(),
            listeners = self.listeners.len(),
            sequence = change.sequence,
            "fire zoom change"
        );
        for listener in &mut self.listeners {
            listener.on_zoom_changed(&change);
        }
    }

    #[must_use]
    pub fn scaled(&self, value: f64) -> i32 {
        self.factor.scaled(value)
    }

    #[must_use]
    pub fn trunc_scaled(&self, value: f64) -> i32 {
        self.factor.trunc_scaled(value)
    }

    #[must_use]
    pub fn unscaled(&self, value: f64) -> i32 {
        self.factor.unscaled(value)
    }

    #[must_use]
    pub fn trunc_unscaled(&self, value: f64) -> i32 {
        self.factor.trunc_unscaled(value)
    }

    #[must_use]
    pub fn scaled_point(&self, point: ModelPoint) -> DisplayPoint {
        self.factor.scaled_point(point)
    }

    #[must_use]
    pub fn scaled_size(&self, size: ModelSize) -> DisplaySize {
        self.factor.scaled_size(size)
    }

    #[must_use]
    pub fn scaled_rect(&self, rect: ModelRect) -> DisplayRect {
        self.factor.scaled_rect(rect)
    }

    #[must_use]
    pub fn unscaled_point(&self, point: DisplayPoint) -> ModelPoint {
        self.factor.unscaled_point(point)
    }
}

impl fmt::Debug for ScaleTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleTransform")
            .field("id", &self.id)
            .field("ratio", &self.factor.ratio())
            .field("continuous_update", &self.continuous_update)
            .field("control", &self.control.as_ref().map(|control| control.id()))
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
