use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ArchiveMetadata, FORMAT_VERSION};
use crate::codec::CodecMetadata;

/// Contenido de `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub archive_info: ArchiveInfo,
    pub analysis: AnalysisInfo,
    pub results: IndexMap<String, ResultEntry>,
    pub steps: IndexMap<String, StepEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    pub version: String,
    pub created: DateTime<Utc>,
    pub ledgerflow_format: String,
    pub pipeline_type: String,
    pub run_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInfo {
    pub completed_steps: Vec<String>,
    pub step_ordering: Vec<String>,
    /// Parámetros en forma de texto.
    pub parameters: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    pub module: String,
    pub format: String,
    pub size_bytes: u64,
    /// blake3 del blob.
    pub checksum: String,
}

impl ResultEntry {
    pub fn codec_metadata(&self) -> CodecMetadata {
        CodecMetadata { format: self.format.clone(),
                        type_name: self.type_name.clone(),
                        module_name: self.module.clone(),
                        size_bytes: self.size_bytes }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub creates: Vec<String>,
    pub requires: Vec<String>,
    pub elapsed: f64,
    pub timestamp: DateTime<Utc>,
}

impl Manifest {
    /// `descriptions`: texto libre declarado por cada step, si lo tiene.
    pub fn build(metadata: &ArchiveMetadata,
                 results: IndexMap<String, ResultEntry>,
                 descriptions: &IndexMap<String, String>)
                 -> Self {
        let mut completed = metadata.completed_steps.clone();
        completed.sort();
        let steps = metadata.step_metadata
                            .iter()
                            .map(|(step, info)| {
                                let mut creates = info.creates.clone();
                                let mut requires = info.requires.clone();
                                creates.sort();
                                requires.sort();
                                (step.clone(),
                                 StepEntry { description: descriptions.get(step).cloned(),
                                             creates,
                                             requires,
                                             elapsed: info.elapsed,
                                             timestamp: info.timestamp })
                            })
                            .collect();
        Self { archive_info: ArchiveInfo { version: metadata.version.clone(),
                                           created: metadata.created,
                                           ledgerflow_format: FORMAT_VERSION.to_string(),
                                           pipeline_type: metadata.pipeline_type.clone(),
                                           run_id: metadata.run_id },
               analysis: AnalysisInfo { completed_steps: completed,
                                        step_ordering: metadata.step_ordering.clone(),
                                        parameters: metadata.parameters.to_string() },
               results,
               steps }
    }
}
