use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ledgerflow_core::{Ledger, LedgerSnapshot, Name, PipelineError, StepMetadata, StepReport};
use serde_json::Value;
use uuid::Uuid;

use crate::codec::CodecRegistry;
use crate::error::ArchiveError;
use crate::options::LoadOptions;
use crate::reader::{read_archive, ArchiveContents};

/// Reconstrucción de sólo lectura de una corrida, independiente de su tipo
/// de pipeline original.
#[derive(Debug, Clone)]
pub struct Portable {
    pipeline_type: String,
    definition_hash: String,
    run_id: Uuid,
    format_version: String,
    created: DateTime<Utc>,
    parameters: Value,
    completed: BTreeSet<String>,
    step_ordering: Vec<String>,
    stored_results: Vec<String>,
    ledger: Ledger,
}

impl Portable {
    /// Carga un archivo siempre en forma portable.
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions, codecs: &CodecRegistry) -> Result<Self, ArchiveError> {
        Ok(Self::from_contents(read_archive(path, options, codecs)?))
    }

    pub(crate) fn from_contents(contents: ArchiveContents) -> Self {
        let ArchiveContents { metadata, results, .. } = contents;
        let ledger = Ledger::restore(LedgerSnapshot { data: results,
                                                      metadata: metadata.step_metadata });
        Self { pipeline_type: metadata.pipeline_type,
               definition_hash: metadata.definition_hash,
               run_id: metadata.run_id,
               format_version: metadata.version,
               created: metadata.created,
               parameters: metadata.parameters,
               completed: metadata.completed_steps.into_iter().collect(),
               step_ordering: metadata.step_ordering,
               stored_results: metadata.result_keys,
               ledger }
    }

    pub fn pipeline_type(&self) -> &str {
        &self.pipeline_type
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Parámetros tal como se guardaron (JSON).
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    /// Resultados cargados (puede ser un subconjunto de los guardados).
    pub fn results(&self) -> &Ledger {
        &self.ledger
    }

    /// Todos los resultados presentes en el archivo, cargados o no.
    pub fn stored_results(&self) -> &[String] {
        &self.stored_results
    }

    pub fn completed_steps(&self) -> Vec<&str> {
        self.completed.iter().map(String::as_str).collect()
    }

    pub fn step_ordering(&self) -> &[String] {
        &self.step_ordering
    }

    pub fn get_step_metadata(&self, step: &str) -> Result<&StepMetadata, PipelineError> {
        self.ledger.step_metadata(step).ok_or_else(|| PipelineError::NotCompleted(step.to_string()))
    }

    /// Valores (no flags) creados por el step que estén cargados.
    pub fn get_step_results(&self, step: &str) -> Result<IndexMap<String, Value>, PipelineError> {
        let metadata = self.get_step_metadata(step)?;
        Ok(metadata.creates
                   .iter()
                   .filter(|name| !Name::from(name.as_str()).is_flag())
                   .filter_map(|name| self.ledger.get(name).ok().map(|v| (name.clone(), v.clone())))
                   .collect())
    }

    pub fn metadata_report(&self) -> Vec<StepReport> {
        self.step_ordering
            .iter()
            .filter_map(|step| {
                self.ledger.step_metadata(step).map(|metadata| StepReport { step: step.clone(),
                                                                            metadata: metadata.clone() })
            })
            .collect()
    }
}
