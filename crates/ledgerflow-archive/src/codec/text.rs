use serde_json::Value;

use super::{Codec, CodecError, CodecMetadata};

/// Strings como UTF-8 crudo.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl TextCodec {
    pub const FORMAT: &'static str = "txt";
}

impl Codec for TextCodec {
    fn format(&self) -> &str {
        Self::FORMAT
    }

    fn can_encode(&self, value: &Value) -> bool {
        value.is_string()
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        value.as_str()
             .map(|s| s.as_bytes().to_vec())
             .ok_or_else(|| CodecError::new(Self::FORMAT, "value is not a string"))
    }

    fn decode(&self, data: &[u8], _metadata: &CodecMetadata) -> Result<Value, CodecError> {
        String::from_utf8(data.to_vec()).map(Value::String).map_err(|e| CodecError::new(Self::FORMAT, e))
    }
}
