use std::path::Path;
use std::sync::Arc;

use ledgerflow_core::{LedgerSnapshot, Pipeline, PipelineParams, PipelineState, StepRegistry};
use log::{debug, warn};

use crate::codec::CodecRegistry;
use crate::error::ArchiveError;
use crate::format::{ArchiveMetadata, COMPRESSED_EXTENSION, EXTENSION};
use crate::options::LoadOptions;
use crate::portable::Portable;
use crate::reader::{open_archive, read_archive};

/// Resultado de `load`: la corrida tipada si pudo reconstruirse, o su forma
/// portable en caso contrario.
#[derive(Debug)]
pub enum Loaded<P> {
    Typed(Pipeline<P>),
    Portable(Portable),
}

impl<P> Loaded<P> {
    pub fn is_typed(&self) -> bool {
        matches!(self, Loaded::Typed(_))
    }

    pub fn typed(self) -> Option<Pipeline<P>> {
        match self {
            Loaded::Typed(p) => Some(p),
            Loaded::Portable(_) => None,
        }
    }

    pub fn portable(self) -> Option<Portable> {
        match self {
            Loaded::Portable(p) => Some(p),
            Loaded::Typed(_) => None,
        }
    }
}

/// Extensión `.yax`/`.yax.gz` y contenido legible como tar.
pub fn is_archive(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let raw = path.to_string_lossy();
    if !(raw.ends_with(EXTENSION) || raw.ends_with(COMPRESSED_EXTENSION)) || !path.is_file() {
        return false;
    }
    let Ok(mut archive) = open_archive(path) else {
        return false;
    };
    let Ok(mut entries) = archive.entries() else {
        return false;
    };
    matches!(entries.next(), Some(Ok(_)))
}

/// Motivo por el que el archivo no puede volver al tipo del registro.
fn typed_mismatch<P>(metadata: &ArchiveMetadata, registry: &StepRegistry<P>) -> Option<String> {
    let steps = metadata.completed_steps
                        .iter()
                        .chain(&metadata.step_ordering)
                        .chain(metadata.step_metadata.keys())
                        .map(String::as_str);
    let results = metadata.result_keys.iter().map(String::as_str);
    registry.check_restorable(&metadata.pipeline_type, steps, results).err().map(|e| e.to_string())
}

/// Carga un archivo intentando reconstruir el tipo de pipeline del registro;
/// si no es posible, devuelve la forma portable.
pub fn load<P: PipelineParams>(path: impl AsRef<Path>,
                               registry: impl Into<Arc<StepRegistry<P>>>,
                               options: &LoadOptions,
                               codecs: &CodecRegistry)
                               -> Result<Loaded<P>, ArchiveError> {
    let path = path.as_ref();
    if !is_archive(path) {
        return Err(ArchiveError::NotAnArchive(path.to_path_buf()));
    }
    let registry = registry.into();
    let contents = read_archive(path, options, codecs)?;

    if let Some(reason) = typed_mismatch(&contents.metadata, &*registry) {
        warn!("load:portable_fallback path={} reason={reason}", path.display());
        return Ok(Loaded::Portable(Portable::from_contents(contents)));
    }
    let params = match serde_json::from_value::<P>(contents.metadata.parameters.clone()) {
        Ok(params) => params,
        Err(e) => {
            warn!("load:portable_fallback path={} reason=parameters: {e}", path.display());
            return Ok(Loaded::Portable(Portable::from_contents(contents)));
        }
    };
    if contents.metadata.definition_hash != registry.definition_hash() {
        warn!("load:definition_changed path={} stored={} current={}",
              path.display(),
              contents.metadata.definition_hash,
              registry.definition_hash());
    }

    let metadata = contents.metadata;
    let state = PipelineState { type_name: metadata.pipeline_type,
                                definition_hash: metadata.definition_hash,
                                run_id: metadata.run_id,
                                params,
                                completed: metadata.completed_steps,
                                step_ordering: metadata.step_ordering,
                                ledger: LedgerSnapshot { data: contents.results,
                                                         metadata: metadata.step_metadata } };
    debug!("load:typed path={} type={}", path.display(), registry.type_name());
    Ok(Loaded::Typed(Pipeline::restore(registry, state)?))
}

/// Carga un archivo siempre en forma portable.
pub fn load_portable(path: impl AsRef<Path>,
                     options: &LoadOptions,
                     codecs: &CodecRegistry)
                     -> Result<Portable, ArchiveError> {
    let path = path.as_ref();
    if !is_archive(path) {
        return Err(ArchiveError::NotAnArchive(path.to_path_buf()));
    }
    Portable::load(path, options, codecs)
}
