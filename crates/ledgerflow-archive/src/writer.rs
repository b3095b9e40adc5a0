use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use indexmap::IndexMap;
use ledgerflow_core::hashing::hash_bytes;
use ledgerflow_core::Pipeline;
use log::{debug, info};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::codec::CodecRegistry;
use crate::error::ArchiveError;
use crate::format::{result_path, ArchiveMetadata, Manifest, ResultEntry, COMPRESSED_EXTENSION, EXTENSION,
                    FORMAT_VERSION, MANIFEST_NAME, METADATA_NAME};
use crate::options::SaveOptions;

/// Ruta final y compresión efectiva según la extensión pedida.
///
/// - `x.yax` + compress → `x.yax.gz`
/// - `x.yax.gz` → siempre comprimido
/// - cualquier otra ruta recibe `.yax` o `.yax.gz`
pub fn resolve_path(path: &Path, compress: bool) -> (PathBuf, bool) {
    let raw = path.to_string_lossy();
    if raw.ends_with(COMPRESSED_EXTENSION) {
        (path.to_path_buf(), true)
    } else if raw.ends_with(EXTENSION) {
        if compress {
            (PathBuf::from(format!("{raw}.gz")), true)
        } else {
            (path.to_path_buf(), false)
        }
    } else if compress {
        (PathBuf::from(format!("{raw}{COMPRESSED_EXTENSION}")), true)
    } else {
        (PathBuf::from(format!("{raw}{EXTENSION}")), false)
    }
}

/// Guarda la corrida completa en un archivo.
///
/// El contenedor se arma en un fichero temporal del directorio destino y sólo
/// se mueve a la ruta final al terminar. Devuelve la ruta final.
pub fn save<P: Serialize>(pipeline: &Pipeline<P>,
                          path: impl AsRef<Path>,
                          options: &SaveOptions,
                          codecs: &CodecRegistry)
                          -> Result<PathBuf, ArchiveError> {
    let (target, compress) = resolve_path(path.as_ref(), options.compress);
    debug!("save:start path={} compress={compress} results={}",
           target.display(),
           pipeline.results().len());
    if !options.overwrite && target.exists() {
        return Err(ArchiveError::AlreadyExists(target));
    }

    let results = pipeline.results();
    let metadata = ArchiveMetadata { version: FORMAT_VERSION.to_string(),
                                     pipeline_type: pipeline.type_name().to_string(),
                                     definition_hash: pipeline.registry().definition_hash().to_string(),
                                     run_id: pipeline.run_id(),
                                     parameters: serde_json::to_value(pipeline.params())?,
                                     completed_steps: pipeline.completed_steps().into_iter().map(String::from).collect(),
                                     step_ordering: pipeline.step_ordering().to_vec(),
                                     step_metadata: results.metadata().clone(),
                                     result_keys: results.names().into_iter().map(String::from).collect(),
                                     created: Utc::now() };

    let descriptions = step_descriptions(pipeline);

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&dir)?;
    let written = {
        let file = tmp.as_file_mut();
        if compress {
            let encoder = GzEncoder::new(file, Compression::new(options.gzip_level));
            let (encoder, written) = write_entries(encoder, pipeline, &metadata, &descriptions, codecs)?;
            encoder.finish()?;
            written
        } else {
            write_entries(file, pipeline, &metadata, &descriptions, codecs)?.1
        }
    };
    tmp.as_file().sync_all()?;

    if options.overwrite {
        tmp.persist(&target).map_err(|e| ArchiveError::Io(e.error))?;
    } else {
        tmp.persist_noclobber(&target).map_err(|e| match e.error.kind() {
                                          std::io::ErrorKind::AlreadyExists => ArchiveError::AlreadyExists(target.clone()),
                                          _ => ArchiveError::Io(e.error),
                                      })?;
    }
    info!("save:done path={} results={written} steps={}",
          target.display(),
          metadata.completed_steps.len());
    Ok(target)
}

fn step_descriptions<P>(pipeline: &Pipeline<P>) -> IndexMap<String, String> {
    pipeline.registry()
            .steps()
            .filter_map(|s| s.description().map(|d| (s.name().to_string(), d.to_string())))
            .collect()
}

/// Escribe `metadata.json`, luego cada resultado según se codifica y por
/// último `manifest.json`. Sólo un blob codificado vive en memoria a la vez.
fn write_entries<W: Write, P>(writer: W,
                              pipeline: &Pipeline<P>,
                              metadata: &ArchiveMetadata,
                              descriptions: &IndexMap<String, String>,
                              codecs: &CodecRegistry)
                              -> Result<(W, usize), ArchiveError> {
    let mtime = metadata.created.timestamp().max(0) as u64;
    let mut builder = tar::Builder::new(writer);
    append(&mut builder, METADATA_NAME, &serde_json::to_vec(metadata)?, mtime)?;

    let mut entries = IndexMap::new();
    for (name, value) in pipeline.results().iter() {
        let (data, codec_meta) = codecs.encode(value)?;
        append(&mut builder, &result_path(name, &codec_meta.format), &data, mtime)?;
        debug!("save:result name={name} format={} bytes={}", codec_meta.format, data.len());
        entries.insert(name.to_string(),
                       ResultEntry { type_name: codec_meta.type_name,
                                     module: codec_meta.module_name,
                                     format: codec_meta.format,
                                     size_bytes: codec_meta.size_bytes,
                                     checksum: hash_bytes(&data) });
    }
    let written = entries.len();
    let manifest = Manifest::build(metadata, entries, descriptions);
    append(&mut builder, MANIFEST_NAME, &serde_json::to_vec_pretty(&manifest)?, mtime)?;
    Ok((builder.into_inner()?, written))
}

fn append<W: Write>(builder: &mut tar::Builder<W>, path: &str, data: &[u8], mtime: u64) -> Result<(), ArchiveError> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(mtime);
    builder.append_data(&mut header, path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_rules() {
        assert_eq!(resolve_path(Path::new("run"), false), (PathBuf::from("run.yax"), false));
        assert_eq!(resolve_path(Path::new("run"), true), (PathBuf::from("run.yax.gz"), true));
        assert_eq!(resolve_path(Path::new("run.yax"), true), (PathBuf::from("run.yax.gz"), true));
        assert_eq!(resolve_path(Path::new("run.yax"), false), (PathBuf::from("run.yax"), false));
        assert_eq!(resolve_path(Path::new("run.yax.gz"), false), (PathBuf::from("run.yax.gz"), true));
    }
}
