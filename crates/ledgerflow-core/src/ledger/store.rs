use indexmap::IndexMap;
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{LedgerSnapshot, MutationScope};
use crate::errors::LedgerError;
use crate::step::StepMetadata;

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    data: IndexMap<String, Value>,
    metadata: IndexMap<String, StepMetadata>,
    pub(super) unlocked: bool,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruye un ledger a partir de un snapshot (ruta de carga de archivos).
    pub fn restore(snapshot: LedgerSnapshot) -> Self {
        let mut ledger = Self::new();
        ledger.replace_with(snapshot);
        ledger
    }

    /// Sustituye el contenido completo bajo el permiso de mutación.
    pub(crate) fn replace_with(&mut self, snapshot: LedgerSnapshot) {
        let mut scope = self.allow_mutation();
        scope.data = snapshot.data;
        scope.metadata = snapshot.metadata;
        debug!("ledger:restore results={} steps={}", scope.data.len(), scope.metadata.len());
    }

    /// Concede el permiso de mutación hasta que se suelte el scope devuelto.
    pub(crate) fn allow_mutation(&mut self) -> MutationScope<'_> {
        MutationScope::new(self)
    }

    pub fn get(&self, name: &str) -> Result<&Value, LedgerError> {
        self.data.get(name).ok_or_else(|| LedgerError::NotFound(name.to_string()))
    }

    /// Lee un resultado y lo decodifica al tipo pedido.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, LedgerError> {
        let value = self.get(name)?;
        T::deserialize(value).map_err(|e| LedgerError::Decode { name: name.to_string(),
                                                               reason: e.to_string() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Nombres almacenados en orden de escritura.
    pub fn names(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn step_metadata(&self, step: &str) -> Option<&StepMetadata> {
        self.metadata.get(step)
    }

    pub fn metadata(&self) -> &IndexMap<String, StepMetadata> {
        &self.metadata
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<(), LedgerError> {
        self.authorize(name)?;
        self.data.insert(name.to_string(), value);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Value, LedgerError> {
        self.authorize(name)?;
        self.data.shift_remove(name).ok_or_else(|| LedgerError::NotFound(name.to_string()))
    }

    pub fn set_metadata(&mut self, step: &str, metadata: StepMetadata) -> Result<(), LedgerError> {
        self.authorize(step)?;
        self.metadata.insert(step.to_string(), metadata);
        Ok(())
    }

    /// Copia estructural para serialización.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot { data: self.data.clone(),
                         metadata: self.metadata.clone() }
    }

    fn authorize(&self, name: &str) -> Result<(), LedgerError> {
        if self.unlocked {
            Ok(())
        } else {
            Err(LedgerError::UnauthorizedMutation(name.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn writes_outside_scope_are_rejected() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.set("x", json!(1)), Err(LedgerError::UnauthorizedMutation("x".into())));
        assert!(ledger.is_empty());
    }

    #[test]
    fn scope_grants_and_revokes_permission() {
        let mut ledger = Ledger::new();
        {
            let mut scope = ledger.allow_mutation();
            scope.set("x", json!(42)).unwrap();
            scope.set("y", json!("s")).unwrap();
        }
        assert_eq!(ledger.get("x").unwrap(), &json!(42));
        assert!(matches!(ledger.remove("x"), Err(LedgerError::UnauthorizedMutation(_))));
        assert_eq!(ledger.names(), vec!["x", "y"]);
    }

    #[test]
    fn missing_name_is_not_found() {
        let ledger = Ledger::new();
        assert_eq!(ledger.get("nope"), Err(LedgerError::NotFound("nope".into())));
    }

    #[test]
    fn typed_read_reports_decode_errors() {
        let mut ledger = Ledger::new();
        ledger.allow_mutation().set("x", json!("not a number")).unwrap();
        let err = ledger.get_as::<u32>("x").unwrap_err();
        assert!(matches!(err, LedgerError::Decode { ref name, .. } if name == "x"));
    }

    #[test]
    fn snapshot_round_trips_through_restore() {
        let mut ledger = Ledger::new();
        ledger.allow_mutation().set("x", json!([1, 2])).unwrap();
        let restored = Ledger::restore(ledger.snapshot());
        assert_eq!(restored.get("x").unwrap(), &json!([1, 2]));
        // el ledger restaurado queda bloqueado
        let mut restored = restored;
        assert!(restored.set("y", json!(0)).is_err());
    }
}
