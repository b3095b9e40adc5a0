use std::fmt;

use serde_json::Value;

use super::{value_kind, Codec, CodecError, CodecMetadata, JsonCodec, JsonLinesCodec, TextCodec};
use crate::error::ArchiveError;

/// Registro ordenado de codecs.
///
/// `register` inserta antes del fallback JSON, respetando el orden de
/// registro. Para decodificar se busca por etiqueta de formato; si dos codecs
/// comparten etiqueta gana el registrado primero.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn Codec>>,
    fallback: JsonCodec,
}

impl CodecRegistry {
    /// Sólo el fallback JSON.
    pub fn new() -> Self {
        Self { codecs: Vec::new(),
               fallback: JsonCodec }
    }

    /// Fallback más los codecs incluidos (`txt`, `jsonl`).
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(TextCodec).register(JsonLinesCodec);
        registry
    }

    pub fn register<C>(&mut self, codec: C) -> &mut Self
        where C: Codec + 'static
    {
        self.codecs.push(Box::new(codec));
        self
    }

    /// Etiquetas en orden de selección (el fallback al final).
    pub fn formats(&self) -> Vec<&str> {
        self.iter().map(|c| c.format()).collect()
    }

    fn iter(&self) -> impl Iterator<Item = &dyn Codec> {
        self.codecs.iter().map(|c| c.as_ref()).chain(std::iter::once(&self.fallback as &dyn Codec))
    }

    /// Primer codec que acepta el valor.
    pub fn select(&self, value: &Value) -> &dyn Codec {
        self.iter().find(|c| c.can_encode(value)).unwrap_or(&self.fallback)
    }

    pub fn by_format(&self, format: &str) -> Option<&dyn Codec> {
        self.iter().find(|c| c.format() == format)
    }

    pub fn encode(&self, value: &Value) -> Result<(Vec<u8>, CodecMetadata), CodecError> {
        let codec = self.select(value);
        let data = codec.encode(value)?;
        let metadata = CodecMetadata { format: codec.format().to_string(),
                                       type_name: value_kind(value).to_string(),
                                       module_name: codec.module_name().to_string(),
                                       size_bytes: data.len() as u64 };
        Ok((data, metadata))
    }

    pub fn decode(&self, data: &[u8], metadata: &CodecMetadata) -> Result<Value, ArchiveError> {
        let codec = self.by_format(&metadata.format)
                        .ok_or_else(|| ArchiveError::UnknownFormat(metadata.format.clone()))?;
        Ok(codec.decode(data, metadata)?)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry").field("formats", &self.formats()).finish()
    }
}
