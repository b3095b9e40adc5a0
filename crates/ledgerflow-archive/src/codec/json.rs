use serde_json::Value;

use super::{Codec, CodecError, CodecMetadata};

/// Fallback genérico: cualquier valor como JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub const FORMAT: &'static str = "json";
}

impl Codec for JsonCodec {
    fn format(&self) -> &str {
        Self::FORMAT
    }

    fn can_encode(&self, _value: &Value) -> bool {
        true
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::new(Self::FORMAT, e))
    }

    fn decode(&self, data: &[u8], _metadata: &CodecMetadata) -> Result<Value, CodecError> {
        serde_json::from_slice(data).map_err(|e| CodecError::new(Self::FORMAT, e))
    }
}
