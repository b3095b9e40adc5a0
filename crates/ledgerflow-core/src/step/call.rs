use indexmap::IndexMap;
use serde_json::Value;

use crate::constants::{FORCE_PARAM, PANIC_ON_EXISTING_PARAM};

/// Argumentos de una invocación directa de un step.
///
/// `force` y `panic_on_existing` son parámetros de control: pueden fijarse
/// aquí o pasarse como kwargs con ese nombre; en ambos casos el wrapper los
/// consume y nunca llegan al cuerpo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepCall {
    pub args: Vec<Value>,
    pub kwargs: IndexMap<String, Value>,
    pub force: bool,
    pub panic_on_existing: bool,
}

/// Flags de control ya extraídos de una llamada.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub force: bool,
    pub panic_on_existing: bool,
}

impl StepCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn panic_on_existing(mut self, panic: bool) -> Self {
        self.panic_on_existing = panic;
        self
    }

    /// Extrae los flags de control (campos + kwargs homónimos).
    pub(crate) fn take_control(&mut self) -> ControlFlags {
        let kw_force = self.kwargs.shift_remove(FORCE_PARAM).map(|v| truthy(&v)).unwrap_or(false);
        let kw_panic = self.kwargs.shift_remove(PANIC_ON_EXISTING_PARAM).map(|v| truthy(&v)).unwrap_or(false);
        ControlFlags { force: self.force || kw_force,
                       panic_on_existing: self.panic_on_existing || kw_panic }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_kwargs_are_consumed() {
        let mut call = StepCall::new().kwarg("force", true).kwarg("other", 1);
        let flags = call.take_control();
        assert!(flags.force);
        assert!(!flags.panic_on_existing);
        assert!(!call.kwargs.contains_key("force"));
        assert!(call.kwargs.contains_key("other"));
    }

    #[test]
    fn fields_and_kwargs_combine() {
        let mut call = StepCall::new().panic_on_existing(true).kwarg("force", 0);
        let flags = call.take_control();
        assert_eq!(flags, ControlFlags { force: false, panic_on_existing: true });
    }
}
