use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ledgerflow_core::StepMetadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Contenido de `metadata.json`: todo lo necesario para reconstruir la
/// corrida salvo los valores de los resultados.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub version: String,
    pub pipeline_type: String,
    pub definition_hash: String,
    pub run_id: Uuid,
    pub parameters: Value,
    pub completed_steps: Vec<String>,
    #[serde(default)]
    pub step_ordering: Vec<String>,
    #[serde(default)]
    pub step_metadata: IndexMap<String, StepMetadata>,
    pub result_keys: Vec<String>,
    pub created: DateTime<Utc>,
}
