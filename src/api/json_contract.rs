use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};
use crate::render::Renderer;

use super::{ScoreEngine, ScoreSnapshot};

pub const SCORE_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: ScoreSnapshot,
}

impl ScoreSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> ScoreResult<String> {
        let payload = ScoreSnapshotJsonContractV1 {
            schema_version: SCORE_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ScoreError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Accepts either a bare snapshot or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> ScoreResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<ScoreSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: ScoreSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ScoreError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
        })?;
        if payload.schema_version != SCORE_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(ScoreError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}

impl<R: Renderer> ScoreEngine<R> {
    pub fn snapshot_json_contract_v1_pretty(&self) -> ScoreResult<String> {
        self.snapshot()?.to_json_contract_v1_pretty()
    }
}
