use std::path::{Path, PathBuf};

use ledgerflow_core::Pipeline;
use serde::Serialize;

use crate::codec::CodecRegistry;
use crate::error::ArchiveError;
use crate::options::SaveOptions;
use crate::writer;

/// Guardado de una corrida como archivo.
pub trait ArchiveExt {
    /// Guarda con opciones del entorno y los codecs incluidos.
    fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf, ArchiveError>;

    fn save_with(&self,
                 path: impl AsRef<Path>,
                 options: &SaveOptions,
                 codecs: &CodecRegistry)
                 -> Result<PathBuf, ArchiveError>;
}

impl<P: Serialize> ArchiveExt for Pipeline<P> {
    fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf, ArchiveError> {
        self.save_with(path, &SaveOptions::from_env(), &CodecRegistry::with_builtin())
    }

    fn save_with(&self,
                 path: impl AsRef<Path>,
                 options: &SaveOptions,
                 codecs: &CodecRegistry)
                 -> Result<PathBuf, ArchiveError> {
        writer::save(self, path, options, codecs)
    }
}
