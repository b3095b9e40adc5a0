//! Codecs por valor y su registro.
//!
//! Cada resultado del ledger se guarda como un blob independiente. El
//! registro elige el primer codec cuyo `can_encode` acepte el valor; el codec
//! JSON genérico queda siempre al final y acepta cualquier valor.

mod json;
mod jsonl;
mod registry;
mod text;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use json::JsonCodec;
pub use jsonl::JsonLinesCodec;
pub use registry::CodecRegistry;
pub use text::TextCodec;

/// Descripción de un blob codificado, persistida en el manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecMetadata {
    pub format: String,
    pub type_name: String,
    pub module_name: String,
    pub size_bytes: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("codec '{format}' failed: {reason}")]
pub struct CodecError {
    pub format: String,
    pub reason: String,
}

impl CodecError {
    pub fn new(format: impl Into<String>, reason: impl ToString) -> Self {
        Self { format: format.into(),
               reason: reason.to_string() }
    }
}

/// Serializador/deserializador de un formato de valor.
pub trait Codec: Send + Sync {
    /// Etiqueta del formato; también es la extensión del blob.
    fn format(&self) -> &str;

    fn can_encode(&self, value: &Value) -> bool;

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, data: &[u8], metadata: &CodecMetadata) -> Result<Value, CodecError>;

    /// Módulo que se registra en la metadata del blob.
    fn module_name(&self) -> &str {
        "serde_json"
    }
}

/// Nombre del tipo JSON de un valor.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
