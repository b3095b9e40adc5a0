use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::LedgerSnapshot;

/// Estado completo y desacoplado de una corrida.
///
/// Es lo que persiste el archivo: modificarlo no afecta al pipeline del que
/// se tomó.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState<P> {
    pub type_name: String,
    pub definition_hash: String,
    pub run_id: Uuid,
    pub params: P,
    /// Completados, ordenados.
    pub completed: Vec<String>,
    pub step_ordering: Vec<String>,
    pub ledger: LedgerSnapshot,
}

impl<P> PipelineState<P> {
    /// Nombres de resultados almacenados.
    pub fn result_names(&self) -> Vec<&str> {
        self.ledger.data.keys().map(String::as_str).collect()
    }
}
