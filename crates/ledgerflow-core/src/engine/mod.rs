//! Instancia de pipeline e invocación/ejecución de steps.
//!
//! - `pipeline`: estado de una corrida (ledger, completados, orden).
//! - `invoke`: contrato de llamada de un step individual.
//! - `executor`: recorrido topológico completo o parcial.
//! - `state`: snapshot serializable para persistir/restaurar.

mod executor;
mod invoke;
mod pipeline;
mod state;

pub use executor::ExecuteOptions;
pub use pipeline::Pipeline;
pub use state::PipelineState;
