use serde::{Deserialize, Serialize};

use super::StepMetadata;

/// Información estática de un step más su estado de completitud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    pub name: String,
    pub description: Option<String>,
    pub creates: Vec<String>,
    pub creates_flags: Vec<String>,
    pub requires: Vec<String>,
    pub requires_flags: Vec<String>,
    pub completed: bool,
}

/// Entrada de `metadata_report`: nombre del step + su metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: String,
    #[serde(flatten)]
    pub metadata: StepMetadata,
}
