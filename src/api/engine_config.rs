use serde::{Deserialize, Serialize};

use crate::core::{MeasureIdScope, ModelSize};
use crate::error::{ScoreError, ScoreResult};
use crate::zoom::{ZoomConfig, ZoomFactor};

/// Public engine bootstrap configuration.
///
/// Serializable so hosts can persist a view setup alongside recognition
/// results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreEngineConfig {
    /// Page extent in model units.
    pub score_size: ModelSize,
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub measure_ids: MeasureIdScope,
}

impl ScoreEngineConfig {
    #[must_use]
    pub fn new(score_size: ModelSize) -> Self {
        Self {
            score_size,
            zoom: ZoomConfig::default(),
            measure_ids: MeasureIdScope::default(),
        }
    }

    #[must_use]
    pub fn with_zoom(mut self, zoom: ZoomConfig) -> Self {
        self.zoom = zoom;
        self
    }

    /// Sets the initial display ratio.
    #[must_use]
    pub fn with_initial_ratio(mut self, ratio: f64) -> Self {
        self.zoom.initial_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_continuous_update(mut self, enabled: bool) -> Self {
        self.zoom.continuous_update = enabled;
        self
    }

    #[must_use]
    pub fn with_measure_ids(mut self, scope: MeasureIdScope) -> Self {
        self.measure_ids = scope;
        self
    }

    pub fn validate(&self) -> ScoreResult<()> {
        if self.score_size.width <= 0 || self.score_size.height <= 0 {
            return Err(ScoreError::InvalidConfiguration(format!(
                "score size must be positive, got {}x{}",
                self.score_size.width, self.score_size.height
            )));
        }
        ZoomFactor::new(self.zoom.initial_ratio)?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> ScoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ScoreError::InvalidData(format!("failed to serialize engine config: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> ScoreResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ScoreError::InvalidData(format!("failed to parse engine config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreEngineConfig;
    use crate::core::{MeasureIdScope, ModelSize};

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = ScoreEngineConfig::from_json_str(
            r#"{ "score_size": { "width": 1200, "height": 1800 } }"#,
        )
        .expect("parse");
        assert_eq!(config, ScoreEngineConfig::new(ModelSize::new(1200, 1800)));
        assert_eq!(config.measure_ids, MeasureIdScope::PerStaff);
        assert!(config.zoom.continuous_update);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ScoreEngineConfig::new(ModelSize::new(800, 600))
            .with_initial_ratio(0.5)
            .with_continuous_update(false)
            .with_measure_ids(MeasureIdScope::PerScore);
        let json = config.to_json_pretty().expect("serialize");
        assert_eq!(ScoreEngineConfig::from_json_str(&json).expect("parse"), config);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ScoreEngineConfig::new(ModelSize::new(0, 10)).validate().is_err());
        assert!(
            ScoreEngineConfig::new(ModelSize::new(10, 10))
                .with_initial_ratio(-2.0)
                .validate()
                .is_err()
        );
    }
}
