use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use indexmap::IndexMap;
use ledgerflow_core::hashing::hash_bytes;
use log::debug;
use serde_json::Value;

use crate::codec::CodecRegistry;
use crate::error::ArchiveError;
use crate::format::{parse_result_path, result_path, ArchiveMetadata, Manifest, MANIFEST_NAME, METADATA_NAME};
use crate::options::LoadOptions;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Lo leído de un archivo: metadata, manifest y los resultados pedidos.
#[derive(Debug, Clone)]
pub struct ArchiveContents {
    pub metadata: ArchiveMetadata,
    /// `None` con `metadata_only`.
    pub manifest: Option<Manifest>,
    pub results: IndexMap<String, Value>,
}

/// Abre el contenedor detectando gzip por los bytes mágicos.
pub(crate) fn open_archive(path: &Path) -> Result<tar::Archive<Box<dyn Read>>, ArchiveError> {
    let mut magic = [0u8; 2];
    let compressed = {
        let mut file = File::open(path)?;
        let mut read = 0;
        while read < magic.len() {
            let n = file.read(&mut magic[read..])?;
            if n == 0 {
                break;
            }
            read += n;
        }
        read == magic.len() && magic == GZIP_MAGIC
    };
    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = if compressed { Box::new(GzDecoder::new(file)) } else { Box::new(file) };
    Ok(tar::Archive::new(reader))
}

/// Nombres a cargar según las opciones, en el orden almacenado.
fn resolve_selection(stored: &[String], options: &LoadOptions) -> Result<Vec<String>, ArchiveError> {
    if options.select.is_some() && options.exclude.is_some() {
        return Err(ArchiveError::ConflictingSelection);
    }
    if let Some(select) = &options.select {
        let missing: Vec<String> = select.iter().filter(|s| !stored.contains(s)).cloned().collect();
        if !missing.is_empty() {
            return Err(ArchiveError::MissingResult(missing));
        }
        return Ok(stored.iter().filter(|s| select.contains(s)).cloned().collect());
    }
    let excluded: HashSet<&str> = options.exclude.iter().flatten().map(String::as_str).collect();
    Ok(stored.iter().filter(|s| !excluded.contains(s.as_str())).cloned().collect())
}

fn parse_metadata(data: &[u8]) -> Result<ArchiveMetadata, ArchiveError> {
    let raw: Value = serde_json::from_slice(data)?;
    if raw.get("version").is_none() {
        return Err(ArchiveError::MissingVersion);
    }
    Ok(serde_json::from_value(raw)?)
}

/// Lee un archivo en una sola pasada.
///
/// La metadata (primera entrada al escribir) decide qué blobs se leen; el
/// resto se saltan sin cargarlos. Los blobs que aparecen antes que la
/// metadata se retienen hasta conocer la selección. Se decodifican al final,
/// cuando el manifest indica su formato y checksum.
pub fn read_archive(path: impl AsRef<Path>,
                    options: &LoadOptions,
                    codecs: &CodecRegistry)
                    -> Result<ArchiveContents, ArchiveError> {
    let path = path.as_ref();
    debug!("load:start path={} metadata_only={}", path.display(), options.metadata_only);
    if options.select.is_some() && options.exclude.is_some() {
        return Err(ArchiveError::ConflictingSelection);
    }

    let mut archive = open_archive(path)?;
    let mut metadata: Option<ArchiveMetadata> = None;
    let mut wanted: HashSet<String> = HashSet::new();
    let mut blobs: HashMap<String, Vec<u8>> = HashMap::new();
    let mut manifest: Option<Manifest> = None;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.to_string_lossy().into_owned();
        if entry_path == METADATA_NAME {
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            let parsed = parse_metadata(&data)?;
            if options.metadata_only {
                debug!("load:done path={} metadata_only=true", path.display());
                return Ok(ArchiveContents { metadata: parsed,
                                            manifest: None,
                                            results: IndexMap::new() });
            }
            wanted = resolve_selection(&parsed.result_keys, options)?.into_iter().collect();
            blobs.retain(|blob_path, _| parse_result_path(blob_path).is_some_and(|(name, _)| wanted.contains(name)));
            metadata = Some(parsed);
        } else if entry_path == MANIFEST_NAME {
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            manifest = Some(serde_json::from_slice(&data)?);
        } else if let Some((name, _)) = parse_result_path(&entry_path) {
            if metadata.is_none() || wanted.contains(name) {
                let mut data = Vec::new();
                entry.read_to_end(&mut data)?;
                blobs.insert(entry_path.clone(), data);
            }
        }
    }

    let metadata = metadata.ok_or_else(|| ArchiveError::MissingEntry(METADATA_NAME.to_string()))?;
    let to_load = resolve_selection(&metadata.result_keys, options)?;
    let mut results = IndexMap::new();
    if !to_load.is_empty() {
        let manifest = manifest.as_ref().ok_or_else(|| ArchiveError::MissingEntry(MANIFEST_NAME.to_string()))?;
        for name in to_load {
            let entry = manifest.results
                                .get(&name)
                                .ok_or_else(|| ArchiveError::MissingEntry(format!("manifest.results.{name}")))?;
            let blob_path = result_path(&name, &entry.format);
            let data = blobs.remove(&blob_path).ok_or_else(|| ArchiveError::MissingEntry(blob_path.clone()))?;
            let actual = hash_bytes(&data);
            if actual != entry.checksum {
                return Err(ArchiveError::ChecksumMismatch { name,
                                                            expected: entry.checksum.clone(),
                                                            actual });
            }
            let value = codecs.decode(&data, &entry.codec_metadata())?;
            results.insert(name, value);
        }
    }
    debug!("load:done path={} results={}", path.display(), results.len());
    Ok(ArchiveContents { metadata,
                         manifest,
                         results })
}
