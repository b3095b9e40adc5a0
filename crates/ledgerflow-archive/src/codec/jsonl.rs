use serde_json::Value;

use super::{Codec, CodecError, CodecMetadata};

/// Arrays de objetos, un objeto por línea (tablas de registros).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesCodec;

impl JsonLinesCodec {
    pub const FORMAT: &'static str = "jsonl";
}

impl Codec for JsonLinesCodec {
    fn format(&self) -> &str {
        Self::FORMAT
    }

    fn can_encode(&self, value: &Value) -> bool {
        value.as_array().is_some_and(|rows| !rows.is_empty() && rows.iter().all(Value::is_object))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let rows = value.as_array().ok_or_else(|| CodecError::new(Self::FORMAT, "value is not an array"))?;
        let mut out = Vec::new();
        for row in rows {
            serde_json::to_writer(&mut out, row).map_err(|e| CodecError::new(Self::FORMAT, e))?;
            out.push(b'\n');
        }
        Ok(out)
    }

    fn decode(&self, data: &[u8], _metadata: &CodecMetadata) -> Result<Value, CodecError> {
        let text = std::str::from_utf8(data).map_err(|e| CodecError::new(Self::FORMAT, e))?;
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| CodecError::new(Self::FORMAT, e)))
            .collect::<Result<Vec<Value>, _>>()
            .map(Value::Array)
    }
}
