use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata registrada por cada ejecución exitosa (primera o forzada) de un step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMetadata {
    /// Valores y flags creados (valores primero).
    pub creates: Vec<String>,
    /// Valores y flags requeridos (valores primero).
    pub requires: Vec<String>,
    /// Inicio de la ejecución (UTC).
    pub timestamp: DateTime<Utc>,
    /// Duración en segundos.
    pub elapsed: f64,
    /// Argumentos posicionales usados, en forma de texto.
    #[serde(default)]
    pub args: Vec<String>,
    /// Keyword arguments usados (tras el filtrado), en forma de texto.
    #[serde(default)]
    pub kwargs: IndexMap<String, String>,
}

/// Representación textual de un argumento: los strings van sin comillas.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stringify_keeps_strings_bare() {
        assert_eq!(stringify(&json!("hello")), "hello");
        assert_eq!(stringify(&json!(3)), "3");
        assert_eq!(stringify(&json!([1, "a"])), r#"[1,"a"]"#);
    }
}
