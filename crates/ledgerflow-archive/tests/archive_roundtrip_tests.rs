use std::fs::File;
use std::io::Read;

use ledgerflow_archive::{is_archive, load, load_portable, ArchiveError, ArchiveExt, CodecRegistry, LoadOptions,
                         Loaded, SaveOptions};
use ledgerflow_core::{Output, Pipeline, StepCall, StepRegistry};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Params {
    label: String,
}

fn registry(type_name: &str) -> StepRegistry<Params> {
    StepRegistry::<Params>::builder(type_name)
        .define("step_a", |d| d.creates("res_a").body(|_| Ok(json!(42).into())))
        .define("step_b", |d| {
            d.requires("res_a").creates(vec!["res_b", "_checked"]).body(|ctx| {
                Ok(Output::payload(json!(format!("{}:{}", ctx.params().label, ctx.require("res_a")?))))
            })
        })
        .define("step_c", |d| {
            d.requires("res_b").creates("rows").params(["n"]).body(|ctx| {
                let n: usize = ctx.kwarg_as("n")?.unwrap_or(2);
                Ok(json!((0..n).map(|i| json!({"i": i})).collect::<Vec<_>>()).into())
            })
        })
        .build()
        .unwrap()
}

fn executed() -> Pipeline<Params> {
    let mut pipeline = Pipeline::new(registry("roundtrip"), Params { label: "x".into() });
    pipeline.run_step("step_a").unwrap();
    pipeline.run_step("step_b").unwrap();
    pipeline.invoke("step_c", StepCall::new().kwarg("n", 3)).unwrap();
    pipeline
}

fn plain() -> SaveOptions {
    SaveOptions::new()
}

#[test]
fn save_and_load_restores_the_typed_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = executed();
    let path = pipeline.save_with(dir.path().join("run"), &plain(), &CodecRegistry::with_builtin()).unwrap();
    assert_eq!(path, dir.path().join("run.yax"));
    assert!(is_archive(&path));

    let loaded = load(&path, registry("roundtrip"), &LoadOptions::new(), &CodecRegistry::with_builtin()).unwrap();
    let restored = loaded.typed().expect("typed load");
    assert_eq!(restored.params(), pipeline.params());
    assert_eq!(restored.run_id(), pipeline.run_id());
    assert_eq!(restored.completed_steps(), pipeline.completed_steps());
    assert_eq!(restored.step_ordering(), pipeline.step_ordering());
    for (name, value) in pipeline.results().iter() {
        assert_eq!(restored.results().get(name).unwrap(), value, "result {name}");
    }
    let meta = restored.get_step_metadata("step_c").unwrap();
    assert_eq!(meta.kwargs.get("n").map(String::as_str), Some("3"));
    assert_eq!(meta.timestamp, pipeline.get_step_metadata("step_c").unwrap().timestamp);
}

#[test]
fn restored_pipeline_skips_completed_steps() {
    let dir = tempfile::tempdir().unwrap();
    let path = executed().save_with(dir.path().join("run"), &plain(), &CodecRegistry::with_builtin()).unwrap();
    let mut restored = load(&path, registry("roundtrip"), &LoadOptions::new(), &CodecRegistry::with_builtin())
        .unwrap()
        .typed()
        .unwrap();
    assert!(restored.run_step("step_a").unwrap().is_skipped());
}

#[test]
fn compressed_archive_is_detected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let options = SaveOptions::new().compress(true);
    let path = executed().save_with(dir.path().join("run.yax"), &options, &CodecRegistry::with_builtin()).unwrap();
    assert_eq!(path, dir.path().join("run.yax.gz"));

    let mut magic = [0u8; 2];
    File::open(&path).unwrap().read_exact(&mut magic).unwrap();
    assert_eq!(magic, [0x1f, 0x8b]);

    let portable = load_portable(&path, &LoadOptions::new(), &CodecRegistry::with_builtin()).unwrap();
    assert_eq!(portable.results().get("res_a").unwrap(), &json!(42));
}

#[test]
fn existing_file_is_not_overwritten_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = executed();
    let codecs = CodecRegistry::with_builtin();
    let path = pipeline.save_with(dir.path().join("run.yax"), &plain(), &codecs).unwrap();
    let err = pipeline.save_with(&path, &plain(), &codecs).unwrap_err();
    assert!(matches!(err, ArchiveError::AlreadyExists(_)));
    pipeline.save_with(&path, &plain().overwrite(true), &codecs).unwrap();
}

#[test]
fn metadata_only_load_has_no_results() {
    let dir = tempfile::tempdir().unwrap();
    let path = executed().save_with(dir.path().join("run"), &plain(), &CodecRegistry::with_builtin()).unwrap();
    let portable = load_portable(&path, &LoadOptions::new().metadata_only(), &CodecRegistry::with_builtin()).unwrap();
    assert!(portable.results().is_empty());
    assert_eq!(portable.completed_steps(), vec!["step_a", "step_b", "step_c"]);
    assert_eq!(portable.stored_results().len(), 4);
    assert_eq!(portable.metadata_report().len(), 3);
}

#[test]
fn selective_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = executed().save_with(dir.path().join("run"), &plain(), &CodecRegistry::with_builtin()).unwrap();
    let codecs = CodecRegistry::with_builtin();

    let selected = load_portable(&path, &LoadOptions::new().select(["res_b"]), &codecs).unwrap();
    assert_eq!(selected.results().names(), vec!["res_b"]);

    let excluded = load_portable(&path, &LoadOptions::new().exclude(["rows"]), &codecs).unwrap();
    assert!(!excluded.results().contains("rows"));
    assert!(excluded.results().contains("res_a"));

    let missing = load_portable(&path, &LoadOptions::new().select(["nope"]), &codecs).unwrap_err();
    assert!(matches!(missing, ArchiveError::MissingResult(_)));

    let both = LoadOptions::new().select(["res_a"]).exclude(["res_b"]);
    assert!(matches!(load_portable(&path, &both, &codecs), Err(ArchiveError::ConflictingSelection)));
}

#[test]
fn other_pipeline_type_falls_back_to_portable() {
    let dir = tempfile::tempdir().unwrap();
    let path = executed().save_with(dir.path().join("run"), &plain(), &CodecRegistry::with_builtin()).unwrap();
    let loaded = load(&path, registry("renamed"), &LoadOptions::new(), &CodecRegistry::with_builtin()).unwrap();
    let portable = match loaded {
        Loaded::Portable(p) => p,
        Loaded::Typed(_) => panic!("expected portable fallback"),
    };
    assert_eq!(portable.pipeline_type(), "roundtrip");
    assert_eq!(portable.parameters(), &json!({"label": "x"}));
    assert_eq!(portable.get_step_results("step_b").unwrap().get("res_b"), Some(&json!("x:42")));
    assert!(!portable.get_step_results("step_b").unwrap().contains_key("_checked"));
}

#[test]
fn unknown_format_without_codec_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = executed().save_with(dir.path().join("run"), &plain(), &CodecRegistry::with_builtin()).unwrap();
    let err = load_portable(&path, &LoadOptions::new(), &CodecRegistry::new()).unwrap_err();
    assert!(matches!(err, ArchiveError::UnknownFormat(ref f) if f == "txt"));
}

#[test]
fn non_archives_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.yax");
    std::fs::write(&path, b"definitely not a tar stream").unwrap();
    assert!(!is_archive(&path));
    assert!(matches!(load_portable(&path, &LoadOptions::new(), &CodecRegistry::new()),
                     Err(ArchiveError::NotAnArchive(_))));
}
