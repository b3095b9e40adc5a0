//! Layout del contenedor.
//!
//! Entradas, en orden: `metadata.json`, `results/<nombre>.<formato>` por
//! resultado y `manifest.json` al final (legible por humanos).

mod manifest;
mod metadata;

pub use manifest::{AnalysisInfo, ArchiveInfo, Manifest, ResultEntry, StepEntry};
pub use metadata::ArchiveMetadata;

/// Versión del formato escrito.
pub const FORMAT_VERSION: &str = "0.3.0";
pub const METADATA_NAME: &str = "metadata.json";
pub const MANIFEST_NAME: &str = "manifest.json";
pub const RESULTS_DIR: &str = "results";
pub const EXTENSION: &str = ".yax";
pub const COMPRESSED_EXTENSION: &str = ".yax.gz";

/// Ruta interna del blob de un resultado.
pub fn result_path(name: &str, format: &str) -> String {
    format!("{RESULTS_DIR}/{name}.{format}")
}

/// Inverso de `result_path`: (nombre, formato).
pub fn parse_result_path(path: &str) -> Option<(&str, &str)> {
    path.strip_prefix(RESULTS_DIR)?.strip_prefix('/')?.rsplit_once('.')
}
