use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

use super::ViewportSnapshot;

/// Bumped whenever a `ViewportSnapshot` field changes meaning or shape.
pub const VIEWPORT_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Versioned envelope for viewport regression fixtures: the x-domain, visible
/// rows, pane layout and gesture phase of one engine, tagged with the schema
/// it was written under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: ViewportSnapshot,
}

impl ViewportSnapshot {
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize snapshot json: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ViewportSnapshotJsonContractV1 {
            schema_version: VIEWPORT_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Accepts both a bare snapshot and a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<ViewportSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: ViewportSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
        })?;
        if payload.schema_version != VIEWPORT_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}
