//! Ledgerflow
//!
//! Fachada del workspace:
//! - `ledgerflow_core`: steps, registro, ledger de resultados y ejecución por grafo.
//! - `ledgerflow_archive`: persistencia de corridas en archivos `.yax`.
//! - `errors`: error unificado para aplicaciones que usan ambos.

pub mod errors;

pub use errors::LedgerflowError;
pub use ledgerflow_archive::{load, load_portable, ArchiveExt, CodecRegistry, LoadOptions, Loaded, Portable,
                             SaveOptions};
pub use ledgerflow_core::{ExecuteOptions, Output, Pipeline, StepCall, StepContext, StepDefinition, StepOutcome,
                          StepRegistry};

#[cfg(test)]
mod tests {
	use super::errors::LedgerflowError;
	use ledgerflow_core::{DefinitionError, PipelineError};

	#[test]
	fn pipeline_errors_convert() {
		let err: LedgerflowError = PipelineError::MissingStart.into();
		assert!(matches!(err, LedgerflowError::Pipeline(_)));
	}

	#[test]
	fn definition_errors_keep_message() {
		let err: LedgerflowError = DefinitionError::DuplicateStep("a".into()).into();
		assert_eq!(err.to_string(), "duplicate step name: 'a'");
	}
}
