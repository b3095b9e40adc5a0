//! Errores del formato de archivo.

use std::path::PathBuf;

use ledgerflow_core::PipelineError;
use thiserror::Error;

use crate::codec::CodecError;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file already exists: '{}'", .0.display())]
    AlreadyExists(PathBuf),
    #[error("not a ledgerflow archive: '{}'", .0.display())]
    NotAnArchive(PathBuf),
    #[error("invalid archive: missing entry '{0}'")]
    MissingEntry(String),
    #[error("invalid archive: missing version in metadata")]
    MissingVersion,
    #[error("unknown serialization format: '{0}'")]
    UnknownFormat(String),
    #[error("cannot specify both select and exclude")]
    ConflictingSelection,
    #[error("requested results not found: {0:?}")]
    MissingResult(Vec<String>),
    #[error("checksum mismatch for result '{name}': expected {expected}, found {actual}")]
    ChecksumMismatch { name: String, expected: String, actual: String },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// El estado leído no encaja en el registro al restaurar.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
