//! ledgerflow-core: pipelines de steps con dependencias declaradas sobre un
//! ledger de resultados controlado.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod hashing;
pub mod ledger;
pub mod step;
pub mod validate;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use engine::{ExecuteOptions, Pipeline, PipelineState};
pub use errors::{AccessError, BodyError, DefinitionError, LedgerError, PipelineError};
pub use graph::DependencyGraph;
pub use ledger::{Ledger, LedgerSnapshot};
pub use step::{Name, Output, StepCall, StepContext, StepDefinition, StepInfo, StepMetadata, StepOutcome, StepRegistry,
               StepReport};

/// Parámetros de un pipeline: opacos para el motor, pero serializables para
/// poder persistirlos y restaurarlos.
pub trait PipelineParams: Serialize + DeserializeOwned + Clone + std::fmt::Debug + 'static {}

impl<T> PipelineParams for T where T: Serialize + DeserializeOwned + Clone + std::fmt::Debug + 'static {}
