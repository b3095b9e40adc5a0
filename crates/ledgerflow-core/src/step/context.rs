use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::StepDefinition;
use crate::errors::{AccessError, DefinitionError, LedgerError};
use crate::ledger::Ledger;
use crate::validate::AccessGuard;

/// Vista que recibe el cuerpo de un step.
///
/// Expone los parámetros del pipeline (inmutables), los argumentos de la
/// llamada y una lectura del ledger limitada a los nombres declarados en
/// `requires`. No hay forma de escribir en el pipeline desde aquí: los
/// resultados sólo se guardan a través del valor devuelto.
pub struct StepContext<'a, P> {
    step: &'a StepDefinition<P>,
    params: &'a P,
    ledger: &'a Ledger,
    args: &'a [Value],
    kwargs: &'a IndexMap<String, Value>,
    guard: AccessGuard<'a>,
}

impl<'a, P> StepContext<'a, P> {
    pub(crate) fn new(step: &'a StepDefinition<P>,
                      params: &'a P,
                      ledger: &'a Ledger,
                      args: &'a [Value],
                      kwargs: &'a IndexMap<String, Value>)
                      -> Self {
        Self { step,
               params,
               ledger,
               args,
               kwargs,
               guard: AccessGuard::new(step.name(), step.requires_decl()) }
    }

    pub fn step_name(&self) -> &str {
        self.step.name()
    }

    pub fn params(&self) -> &'a P {
        self.params
    }

    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }

    pub fn kwargs(&self) -> &'a IndexMap<String, Value> {
        self.kwargs
    }

    pub fn kwarg(&self, name: &str) -> Option<&'a Value> {
        self.kwargs.get(name)
    }

    /// Keyword argument decodificado; `None` si no se pasó.
    pub fn kwarg_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, LedgerError> {
        self.kwargs
            .get(name)
            .map(|v| {
                T::deserialize(v).map_err(|e| LedgerError::Decode { name: name.to_string(),
                                                                   reason: e.to_string() })
            })
            .transpose()
    }

    /// Lee un resultado declarado en `requires`.
    pub fn require(&self, name: &str) -> Result<&'a Value, AccessError> {
        self.guard.check(name)?;
        Ok(self.ledger.get(name)?)
    }

    pub fn require_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, AccessError> {
        self.guard.check(name)?;
        Ok(self.ledger.get_as(name)?)
    }

    /// Estado de un flag declarado en `requires`.
    pub fn flag(&self, name: &str) -> Result<bool, AccessError> {
        self.guard.check(name)?;
        Ok(self.ledger.get(name).ok().and_then(Value::as_bool).unwrap_or(false))
    }

    /// Nombres leídos hasta ahora (incluye los rechazados).
    pub fn accessed(&self) -> Vec<String> {
        self.guard.accessed()
    }

    pub(crate) fn violation(&self) -> Option<DefinitionError> {
        self.guard.violation()
    }
}
