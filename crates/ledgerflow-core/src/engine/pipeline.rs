use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;
use uuid::Uuid;

use super::PipelineState;
use crate::errors::PipelineError;
use crate::ledger::Ledger;
use crate::step::{StepInfo, StepMetadata, StepRegistry, StepReport};

/// Una corrida de un tipo de pipeline.
///
/// Posee en exclusiva su ledger. Los steps se invocan con `invoke` /
/// `run_step` o en bloque con `execute` / `execute_all`.
pub struct Pipeline<P> {
    pub(super) registry: Arc<StepRegistry<P>>,
    pub(super) params: P,
    pub(super) ledger: Ledger,
    pub(super) completed: BTreeSet<String>,
    pub(super) step_ordering: Vec<String>,
    run_id: Uuid,
}

impl<P> Pipeline<P> {
    pub fn new(registry: impl Into<Arc<StepRegistry<P>>>, params: P) -> Self {
        let registry = registry.into();
        let run_id = Uuid::new_v4();
        debug!("pipeline:new type={} run_id={run_id}", registry.type_name());
        Self { registry,
               params,
               ledger: Ledger::new(),
               completed: BTreeSet::new(),
               step_ordering: Vec::new(),
               run_id }
    }

    /// Reconstruye una corrida desde un snapshot.
    ///
    /// Es la única otra ruta (además del commit de un step) que escribe en
    /// el ledger, así que el estado se contrasta antes con el registro: un
    /// snapshot que nombra steps o resultados ajenos se rechaza.
    pub fn restore(registry: impl Into<Arc<StepRegistry<P>>>, state: PipelineState<P>) -> Result<Self, PipelineError> {
        let registry = registry.into();
        let steps = state.completed
                         .iter()
                         .chain(&state.step_ordering)
                         .chain(state.ledger.metadata.keys())
                         .map(String::as_str);
        registry.check_restorable(&state.type_name, steps, state.result_names())?;
        debug!("pipeline:restore type={} run_id={} completed={}",
               registry.type_name(),
               state.run_id,
               state.completed.len());
        let mut ordering = Vec::with_capacity(state.step_ordering.len());
        for step in state.step_ordering {
            if !ordering.contains(&step) {
                ordering.push(step);
            }
        }
        Ok(Self { registry,
                  params: state.params,
                  ledger: Ledger::restore(state.ledger),
                  completed: state.completed.into_iter().collect(),
                  step_ordering: ordering,
                  run_id: state.run_id })
    }

    pub fn registry(&self) -> &Arc<StepRegistry<P>> {
        &self.registry
    }

    pub fn type_name(&self) -> &str {
        self.registry.type_name()
    }

    pub fn params(&self) -> &P {
        &self.params
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Ledger de resultados (sólo lectura).
    pub fn results(&self) -> &Ledger {
        &self.ledger
    }

    /// Steps del registro en orden de declaración.
    pub fn available_steps(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Steps completados, ordenados alfabéticamente.
    pub fn completed_steps(&self) -> Vec<&str> {
        self.completed.iter().map(String::as_str).collect()
    }

    pub fn is_completed(&self, step: &str) -> bool {
        self.completed.contains(step)
    }

    /// Steps en orden de primera finalización.
    pub fn step_ordering(&self) -> &[String] {
        &self.step_ordering
    }

    pub fn get_step_info(&self, step: &str) -> Result<StepInfo, PipelineError> {
        let def = self.registry.get(step).ok_or_else(|| PipelineError::UnknownStep(step.to_string()))?;
        Ok(StepInfo { name: def.name().to_string(),
                      description: def.description().map(str::to_string),
                      creates: def.create_values().to_vec(),
                      creates_flags: def.create_flags().to_vec(),
                      requires: def.require_values().to_vec(),
                      requires_flags: def.require_flags().to_vec(),
                      completed: self.completed.contains(step) })
    }

    pub fn get_step_metadata(&self, step: &str) -> Result<&StepMetadata, PipelineError> {
        if !self.registry.contains(step) {
            return Err(PipelineError::UnknownStep(step.to_string()));
        }
        if !self.completed.contains(step) {
            return Err(PipelineError::NotCompleted(step.to_string()));
        }
        self.ledger.step_metadata(step).ok_or_else(|| PipelineError::NotCompleted(step.to_string()))
    }

    /// Valores creados por un step completado.
    pub fn get_step_results(&self, step: &str) -> Result<IndexMap<String, Value>, PipelineError> {
        let def = self.registry.get(step).ok_or_else(|| PipelineError::UnknownStep(step.to_string()))?;
        if !self.completed.contains(step) {
            return Err(PipelineError::NotCompleted(step.to_string()));
        }
        Ok(self.current_values(def.create_values()))
    }

    /// Metadata de cada step en orden de primera finalización.
    pub fn metadata_report(&self) -> Vec<StepReport> {
        self.step_ordering
            .iter()
            .filter_map(|step| {
                self.ledger.step_metadata(step).map(|metadata| StepReport { step: step.clone(),
                                                                            metadata: metadata.clone() })
            })
            .collect()
    }

    /// Valores actuales de los nombres dados que existan en el ledger.
    pub(super) fn current_values(&self, names: &[String]) -> IndexMap<String, Value> {
        names.iter()
             .filter_map(|name| self.ledger.get(name).ok().map(|v| (name.clone(), v.clone())))
             .collect()
    }

    /// Copia desacoplada del estado de la corrida.
    pub fn snapshot(&self) -> PipelineState<P>
        where P: Clone
    {
        PipelineState { type_name: self.registry.type_name().to_string(),
                        definition_hash: self.registry.definition_hash().to_string(),
                        run_id: self.run_id,
                        params: self.params.clone(),
                        completed: self.completed.iter().cloned().collect(),
                        step_ordering: self.step_ordering.clone(),
                        ledger: self.ledger.snapshot() }
    }
}

impl<P: std::fmt::Debug> std::fmt::Debug for Pipeline<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
         .field("type_name", &self.registry.type_name())
         .field("run_id", &self.run_id)
         .field("params", &self.params)
         .field("completed", &self.completed)
         .field("results", &self.ledger.names())
         .finish()
    }
}
