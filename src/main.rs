//! Demo: define un pipeline pequeño, lo ejecuta, lo guarda como archivo y lo
//! vuelve a cargar.
//!
//! `RUST_LOG=debug cargo run --bin main-demo` muestra el detalle de cada step.

use ledgerflow::{load, ArchiveExt, CodecRegistry, ExecuteOptions, LedgerflowError, LoadOptions, Loaded, Output,
                 Pipeline, StepCall, StepRegistry};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DemoParams {
    samples: usize,
    scale: f64,
}

fn demo_registry() -> Result<StepRegistry<DemoParams>, LedgerflowError> {
    let registry = StepRegistry::<DemoParams>::builder("demo")
        .define("load_samples", |d| {
            d.creates("samples").describe("genera muestras sintéticas").body(|ctx| {
                let rows: Vec<_> = (0..ctx.params().samples).map(|i| json!({"id": i, "value": i as f64 * 1.5}))
                                                             .collect();
                Ok(json!(rows).into())
            })
        })
        .define("normalize", |d| {
            d.requires("samples").creates(vec!["normalized", "_normalized"]).body(|ctx| {
                let rows: Vec<serde_json::Value> = ctx.require_as("samples")?;
                let scale = ctx.params().scale;
                let values: Vec<f64> = rows.iter().filter_map(|r| r["value"].as_f64()).map(|v| v * scale).collect();
                Ok(Output::payload(json!(values)))
            })
        })
        .define("summarize", |d| {
            d.requires(vec!["normalized", "_normalized"])
             .creates(vec!["mean", "label"])
             .params(["label"])
             .body(|ctx| {
                 let values: Vec<f64> = ctx.require_as("normalized")?;
                 let mean = if values.is_empty() {
                     0.0
                 } else {
                     values.iter().sum::<f64>() / values.len() as f64
                 };
                 let label: String = ctx.kwarg_as("label")?.unwrap_or_else(|| "summary".to_string());
                 Ok(Output::map([("mean", json!(mean)), ("label", json!(label))]))
             })
        })
        .build()?;
    Ok(registry)
}

fn main() -> Result<(), LedgerflowError> {
    env_logger::Builder::from_default_env().init();
    ledgerflow_archive::init_dotenv();

    let params = DemoParams { samples: 8, scale: 0.5 };
    let mut pipeline = Pipeline::new(demo_registry()?, params);
    println!("Plan: {:?}", pipeline.execution_plan()?);

    pipeline.execute(ExecuteOptions::new().target("normalize"))?;
    println!("Completados tras ejecución parcial: {:?}", pipeline.completed_steps());

    pipeline.invoke("summarize", StepCall::new().kwarg("label", "demo-run"))?;
    println!("mean = {}", pipeline.results().get("mean")?);

    let path = std::env::temp_dir().join(format!("ledgerflow-demo-{}", pipeline.run_id()));
    let codecs = CodecRegistry::with_builtin();
    let saved = pipeline.save_with(&path, &ledgerflow::SaveOptions::from_env().overwrite(true), &codecs)?;
    println!("Archivo guardado en {}", saved.display());

    match load(&saved, demo_registry()?, &LoadOptions::new(), &codecs)? {
        Loaded::Typed(restored) => {
            println!("Restaurado (tipado) run_id={}", restored.run_id());
            for report in restored.metadata_report() {
                println!("  {} creates={:?} elapsed={:.6}s",
                         report.step, report.metadata.creates, report.metadata.elapsed);
            }
        }
        Loaded::Portable(portable) => {
            println!("Restaurado (portable) tipo={}", portable.pipeline_type());
        }
    }

    let portable = ledgerflow::load_portable(&saved, &LoadOptions::new().select(["mean"]), &codecs)?;
    println!("Carga selectiva: {:?}", portable.results().names());
    std::fs::remove_file(&saved).map_err(ledgerflow_archive::ArchiveError::from)?;
    Ok(())
}
