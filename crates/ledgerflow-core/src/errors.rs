//! Errores del core.
//!
//! Familias:
//! - `DefinitionError`: declaración inválida de un step o acceso no declarado
//!   al ledger desde el cuerpo de un step.
//! - `LedgerError`: lectura de un nombre ausente o escritura fuera del scope
//!   de mutación autorizado.
//! - `AccessError`: lectura fallida desde el cuerpo de un step.
//! - `PipelineError`: fallos de invocación y de ejecución del grafo.

use thiserror::Error;

/// Error boxed devuelto por el cuerpo de un step.
pub type BodyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("step name must not be empty")]
    EmptyStepName,
    #[error("duplicate step name: '{0}'")]
    DuplicateStep(String),
    #[error("step '{step}' declares an empty result name")]
    EmptyResultName { step: String },
    #[error("step '{step}' declares result name '{name}' with an empty, '.' or '..' path component")]
    InvalidResultName { step: String, name: String },
    #[error("step '{step}' requires names it also creates: {names:?}")]
    SelfDependency { step: String, names: Vec<String> },
    #[error("step '{step}' declares reserved keyword parameter '{param}'")]
    ReservedParameter { step: String, param: String },
    #[error("step '{step}' declares keyword parameter '{param}' more than once")]
    DuplicateParameter { step: String, param: String },
    #[error("step '{step}' has no body")]
    MissingBody { step: String },
    #[error("step '{step}' accesses undeclared results {names:?}; add them to `requires`")]
    UndeclaredAccess { step: String, names: Vec<String> },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no result named '{0}' exists")]
    NotFound(String),
    #[error("unauthorized mutation of result '{0}' outside a mutation scope")]
    UnauthorizedMutation(String),
    #[error("result '{name}' could not be decoded: {reason}")]
    Decode { name: String, reason: String },
}

/// Fallo al leer el ledger desde el cuerpo de un step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error(transparent)]
    Undeclared(#[from] DefinitionError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("no such step: '{0}'")]
    UnknownStep(String),
    #[error("step '{step}' is missing required results: {missing:?}; run the required steps first")]
    Requirement { step: String, missing: Vec<String> },
    #[error("step '{step}': result '{name}' already exists")]
    ExistingResult { step: String, name: String },
    #[error("no step without unmet dependencies; the pipeline has no valid entry point")]
    MissingStart,
    #[error("circular dependency detected among steps {unresolved:?}")]
    CircularDependency { unresolved: Vec<String> },
    #[error("step '{step}' returned ambiguous result keys {keys:?} for declared results {declared:?}")]
    AmbiguousResultKeys { step: String, keys: Vec<String>, declared: Vec<String> },
    #[error("step '{step}' returned a value that does not match declared results {declared:?}: {reason}")]
    ResultShape { step: String, declared: Vec<String>, reason: String },
    #[error("state cannot be restored into pipeline '{type_name}': {reason}")]
    IncompatibleState { type_name: String, reason: String },
    #[error("step '{0}' has not been completed")]
    NotCompleted(String),
    #[error("step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: BodyError,
    },
}

impl PipelineError {
    /// Indica si el error es estructural (detectado antes de ejecutar cualquier step).
    pub fn is_structural(&self) -> bool {
        matches!(self, PipelineError::MissingStart | PipelineError::CircularDependency { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_message_names_every_missing_result() {
        let err = PipelineError::Requirement { step: "b".into(),
                                               missing: vec!["x".into(), "_ready".into()] };
        assert_eq!(err.to_string(),
                   "step 'b' is missing required results: [\"x\", \"_ready\"]; run the required steps first");
    }

    #[test]
    fn ledger_error_converts_into_pipeline_error() {
        let err: PipelineError = LedgerError::NotFound("x".into()).into();
        assert_eq!(err.to_string(), "no result named 'x' exists");
        assert!(!err.is_structural());
    }

    #[test]
    fn structural_errors_are_flagged() {
        assert!(PipelineError::MissingStart.is_structural());
        assert!(PipelineError::CircularDependency { unresolved: vec!["a".into()] }.is_structural());
    }
}
