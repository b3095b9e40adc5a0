//! Valor devuelto por el cuerpo de un step y su interpretación contra los
//! nombres declarados en `creates`.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::errors::PipelineError;

/// Lo que devuelve el cuerpo de un step.
///
/// `Infer` aplica la inferencia de forma (mapa por claves, secuencia
/// posicional, valor directo). `Payload` almacena el valor tal cual bajo el
/// único nombre declarado, aunque sea un mapa o una secuencia.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Output {
    #[default]
    None,
    Infer(Value),
    Payload(Value),
}

impl Output {
    pub fn none() -> Self {
        Output::None
    }

    /// Serializa cualquier valor y lo marca para inferencia.
    pub fn value<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Output::from)
    }

    /// Valor opaco: se guarda entero bajo el único resultado declarado.
    pub fn payload(value: impl Into<Value>) -> Self {
        Output::Payload(value.into())
    }

    /// Mapa nombre → valor, para steps que crean varios resultados.
    pub fn map<I, K, V>(entries: I) -> Self
        where I: IntoIterator<Item = (K, V)>,
              K: Into<String>,
              V: Into<Value>
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect::<serde_json::Map<_, _>>();
        Output::Infer(Value::Object(map))
    }

    /// Valor crudo (lo que devuelve la invocación en la ruta normal).
    pub fn into_raw(self) -> Value {
        match self {
            Output::None => Value::Null,
            Output::Infer(v) | Output::Payload(v) => v,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Output::None | Output::Infer(Value::Null) | Output::Payload(Value::Null))
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Output::None,
            other => Output::Infer(other),
        }
    }
}

/// Resultado de invocar un step.
///
/// La ruta normal devuelve el valor crudo del cuerpo; la ruta "ya existe"
/// devuelve los valores actuales de los resultados declarados.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Executed { output: Value },
    Skipped { existing: IndexMap<String, Value> },
}

impl StepOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, StepOutcome::Skipped { .. })
    }

    /// Aplana el resultado a un único valor JSON.
    pub fn into_value(self) -> Value {
        match self {
            StepOutcome::Executed { output } => output,
            StepOutcome::Skipped { existing } => Value::Object(existing.into_iter().collect()),
        }
    }
}

/// Resuelve el `Output` de un step a pares (nombre, valor) a almacenar.
pub(crate) fn resolve(step: &str, declared: &[String], output: &Output) -> Result<Vec<(String, Value)>, PipelineError> {
    let shape_error = |reason: String| PipelineError::ResultShape { step: step.to_string(),
                                                                    declared: declared.to_vec(),
                                                                    reason };
    let value = match output {
        Output::None => return Ok(Vec::new()),
        Output::Payload(v) => {
            return match declared {
                [only] => Ok(vec![(only.clone(), v.clone())]),
                _ => Err(shape_error(format!("an explicit payload needs exactly one declared result, found {}",
                                             declared.len()))),
            };
        }
        Output::Infer(v) => v,
    };
    if declared.is_empty() || value.is_null() {
        return Ok(Vec::new());
    }

    match value {
        Value::Object(map) => {
            let exact = map.len() == declared.len() && declared.iter().all(|d| map.contains_key(d));
            if exact {
                return Ok(declared.iter().map(|d| (d.clone(), map[d.as_str()].clone())).collect());
            }
            if let [only] = declared {
                return Ok(vec![(only.clone(), value.clone())]);
            }
            let extra: Vec<String> = map.keys().filter(|k| !declared.contains(*k)).cloned().collect();
            if !extra.is_empty() {
                return Err(PipelineError::AmbiguousResultKeys { step: step.to_string(),
                                                                keys: map.keys().cloned().collect(),
                                                                declared: declared.to_vec() });
            }
            let missing: Vec<&String> = declared.iter().filter(|d| !map.contains_key(d.as_str())).collect();
            Err(shape_error(format!("result mapping is missing keys {missing:?}")))
        }
        Value::Array(items) => {
            if items.len() == declared.len() {
                Ok(declared.iter().cloned().zip(items.iter().cloned()).collect())
            } else if let [only] = declared {
                Ok(vec![(only.clone(), value.clone())])
            } else {
                Err(shape_error(format!("sequence of length {} cannot be unpacked", items.len())))
            }
        }
        other => match declared {
            [only] => Ok(vec![(only.clone(), other.clone())]),
            _ => Err(shape_error("a single value cannot fill several results".to_string())),
        },
    }
}
