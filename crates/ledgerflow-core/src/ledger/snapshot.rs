use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::step::StepMetadata;

/// Copia estructural (desacoplada) del contenido de un `Ledger`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub data: IndexMap<String, Value>,
    #[serde(default)]
    pub metadata: IndexMap<String, StepMetadata>,
}
