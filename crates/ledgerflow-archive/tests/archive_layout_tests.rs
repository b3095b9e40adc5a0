use std::fs::File;

use ledgerflow_archive::format::{Manifest, MANIFEST_NAME, METADATA_NAME};
use ledgerflow_archive::{load_portable, ArchiveError, ArchiveExt, CodecRegistry, LoadOptions, SaveOptions};
use ledgerflow_core::{Pipeline, StepDefinition, StepRegistry};
use serde_json::json;

fn saved(dir: &std::path::Path) -> std::path::PathBuf {
    let registry = StepRegistry::<serde_json::Value>::builder("layout")
        .step(StepDefinition::new("make").creates(vec!["text", "table"]).describe("text and a table").body(|_| {
            Ok(json!({"text": "hello", "table": [{"a": 1}]}).into())
        }))
        .build()
        .unwrap();
    let mut pipeline = Pipeline::new(registry, json!({"seed": 7}));
    pipeline.run_step("make").unwrap();
    pipeline.save_with(dir.join("layout"), &SaveOptions::new(), &CodecRegistry::with_builtin()).unwrap()
}

fn entry_names(path: &std::path::Path) -> Vec<String> {
    let mut archive = tar::Archive::new(File::open(path).unwrap());
    archive.entries()
           .unwrap()
           .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
           .collect()
}

#[test]
fn entries_are_written_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = saved(dir.path());
    assert_eq!(entry_names(&path),
               vec![METADATA_NAME.to_string(),
                    "results/text.txt".to_string(),
                    "results/table.jsonl".to_string(),
                    MANIFEST_NAME.to_string()]);
}

#[test]
fn manifest_describes_results_and_steps() {
    let dir = tempfile::tempdir().unwrap();
    let path = saved(dir.path());
    let mut archive = tar::Archive::new(File::open(&path).unwrap());
    let manifest: Manifest = archive.entries()
                                    .unwrap()
                                    .map(|e| e.unwrap())
                                    .find(|e| e.path().unwrap().to_string_lossy() == MANIFEST_NAME)
                                    .map(|e| serde_json::from_reader(e).unwrap())
                                    .unwrap();
    assert_eq!(manifest.archive_info.pipeline_type, "layout");
    assert_eq!(manifest.analysis.completed_steps, vec!["make"]);
    assert_eq!(manifest.analysis.parameters, r#"{"seed":7}"#);
    assert_eq!(manifest.results["text"].format, "txt");
    assert_eq!(manifest.results["text"].type_name, "string");
    assert_eq!(manifest.results["text"].size_bytes, 5);
    assert_eq!(manifest.steps["make"].creates, vec!["table", "text"]);
    assert_eq!(manifest.steps["make"].description.as_deref(), Some("text and a table"));
}

#[test]
fn tampered_blob_fails_checksum() {
    let dir = tempfile::tempdir().unwrap();
    let path = saved(dir.path());

    let mut source = tar::Archive::new(File::open(&path).unwrap());
    let tampered = dir.path().join("tampered.yax");
    let mut builder = tar::Builder::new(File::create(&tampered).unwrap());
    for entry in source.entries().unwrap() {
        let mut entry = entry.unwrap();
        let name = entry.path().unwrap().to_string_lossy().into_owned();
        let mut data = Vec::new();
        std::io::Read::read_to_end(&mut entry, &mut data).unwrap();
        if name == "results/text.txt" {
            data = b"HELLO".to_vec();
        }
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, &name, data.as_slice()).unwrap();
    }
    builder.finish().unwrap();
    drop(builder);

    let err = load_portable(&tampered, &LoadOptions::new(), &CodecRegistry::with_builtin()).unwrap_err();
    assert!(matches!(err, ArchiveError::ChecksumMismatch { ref name, .. } if name == "text"));
}

#[test]
fn metadata_without_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.yax");
    let mut builder = tar::Builder::new(File::create(&path).unwrap());
    let data = br#"{"pipeline_type": "layout"}"#;
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    builder.append_data(&mut header, METADATA_NAME, &data[..]).unwrap();
    builder.finish().unwrap();
    drop(builder);

    let err = load_portable(&path, &LoadOptions::new(), &CodecRegistry::new()).unwrap_err();
    assert!(matches!(err, ArchiveError::MissingVersion));
}

fn read_entries(path: &std::path::Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = tar::Archive::new(File::open(path).unwrap());
    archive.entries()
           .unwrap()
           .map(|e| {
               let mut entry = e.unwrap();
               let name = entry.path().unwrap().to_string_lossy().into_owned();
               let mut data = Vec::new();
               std::io::Read::read_to_end(&mut entry, &mut data).unwrap();
               (name, data)
           })
           .collect()
}

fn write_entries(path: &std::path::Path, entries: &[(String, Vec<u8>)]) {
    let mut builder = tar::Builder::new(File::create(path).unwrap());
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, name, data.as_slice()).unwrap();
    }
    builder.finish().unwrap();
}

#[test]
fn entries_in_any_order_still_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut entries = read_entries(&saved(dir.path()));
    entries.reverse();
    assert_eq!(entries.last().map(|(name, _)| name.as_str()), Some(METADATA_NAME));
    let reordered = dir.path().join("reordered.yax");
    write_entries(&reordered, &entries);

    let codecs = CodecRegistry::with_builtin();
    let portable = load_portable(&reordered, &LoadOptions::new(), &codecs).unwrap();
    assert_eq!(portable.results().get("text").unwrap(), &json!("hello"));
    assert_eq!(portable.results().get("table").unwrap(), &json!([{"a": 1}]));

    let selected = load_portable(&reordered, &LoadOptions::new().select(["table"]), &codecs).unwrap();
    assert_eq!(selected.results().names(), vec!["table"]);
}
