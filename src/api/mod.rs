mod edits;
mod engine;
mod engine_config;
mod json_contract;
mod snapshot;

pub use edits::{EditOutcome, ScoreEdit};
pub use engine::ScoreEngine;
pub use engine_config::ScoreEngineConfig;
pub use json_contract::{SCORE_SNAPSHOT_JSON_SCHEMA_V1, ScoreSnapshotJsonContractV1};
pub use snapshot::{MeasureSnapshot, ProjectedMeasure, ScoreSnapshot, StaffSnapshot};
