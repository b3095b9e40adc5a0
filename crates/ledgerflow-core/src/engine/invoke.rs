use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::Value;

use super::Pipeline;
use crate::errors::{DefinitionError, PipelineError};
use crate::step::output::resolve;
use crate::step::{stringify, StepCall, StepContext, StepMetadata, StepOutcome};

impl<P> Pipeline<P> {
    /// Invoca un step sin argumentos.
    pub fn run_step(&mut self, step: &str) -> Result<StepOutcome, PipelineError> {
        self.invoke(step, StepCall::new())
    }

    /// Invoca un step respetando su contrato de llamada.
    ///
    /// 1. Requisitos: todo valor y flag requerido debe existir.
    /// 2. Resultados existentes: `force` los borra y re-ejecuta,
    ///    `panic_on_existing` falla, si no se omite el cuerpo y se devuelven
    ///    los valores actuales.
    /// 3. Los kwargs no aceptados por el step se descartan.
    /// 4. El valor devuelto se interpreta contra los nombres declarados y se
    ///    guarda, junto con flags y metadata, bajo el scope de mutación.
    pub fn invoke(&mut self, step: &str, mut call: StepCall) -> Result<StepOutcome, PipelineError> {
        let registry = Arc::clone(&self.registry);
        let def = registry.get(step).ok_or_else(|| PipelineError::UnknownStep(step.to_string()))?;
        let control = call.take_control();
        debug!("invoke:start step={step} force={} panic_on_existing={}",
               control.force,
               control.panic_on_existing);

        let missing: Vec<String> = def.requires_decl()
                                      .all()
                                      .filter(|name| !self.ledger.contains(name))
                                      .map(str::to_string)
                                      .collect();
        if !missing.is_empty() {
            return Err(PipelineError::Requirement { step: step.to_string(),
                                                    missing });
        }

        let existing: Vec<String> = def.creates_decl()
                                       .all()
                                       .filter(|name| self.ledger.contains(name))
                                       .map(str::to_string)
                                       .collect();
        if let Some(first) = existing.first() {
            if control.force {
                let mut scope = self.ledger.allow_mutation();
                for name in &existing {
                    scope.remove(name)?;
                }
                debug!("invoke:force step={step} removed={existing:?}");
            } else if control.panic_on_existing {
                return Err(PipelineError::ExistingResult { step: step.to_string(),
                                                           name: first.clone() });
            } else {
                info!("invoke:skip step={step} existing={existing:?}");
                return Ok(StepOutcome::Skipped { existing: self.current_values(def.create_values()) });
            }
        }

        let mut kwargs: IndexMap<String, Value> = IndexMap::new();
        for (key, value) in call.kwargs {
            if def.accepts(&key) {
                kwargs.insert(key, value);
            } else {
                debug!("invoke:drop_kwarg step={step} kwarg={key}");
            }
        }

        let body = def.body_fn().ok_or_else(|| DefinitionError::MissingBody { step: step.to_string() })?;
        let started = Utc::now();
        let clock = Instant::now();
        let (result, accessed, violation) = {
            let ctx = StepContext::new(def, &self.params, &self.ledger, &call.args, &kwargs);
            let result = (**body)(&ctx);
            (result, ctx.accessed(), ctx.violation())
        };
        let elapsed = clock.elapsed().as_secs_f64();
        debug!("invoke:accessed step={step} names={accessed:?}");

        if let Some(violation) = violation {
            return Err(violation.into());
        }
        let output = result.map_err(|source| PipelineError::StepFailed { step: step.to_string(),
                                                                          source })?;

        if output.is_none() && !def.create_values().is_empty() {
            warn!("invoke:no_output step={step} declared={:?}", def.create_values());
        }
        let resolved = resolve(step, def.create_values(), &output)?;

        let metadata = StepMetadata { creates: def.creates_decl().all().map(str::to_string).collect(),
                                      requires: def.requires_decl().all().map(str::to_string).collect(),
                                      timestamp: started,
                                      elapsed,
                                      args: call.args.iter().map(stringify).collect(),
                                      kwargs: kwargs.iter().map(|(k, v)| (k.clone(), stringify(v))).collect() };
        {
            let mut scope = self.ledger.allow_mutation();
            for (name, value) in resolved {
                scope.set(&name, value)?;
            }
            for flag in def.create_flags() {
                scope.set(flag, Value::Bool(true))?;
            }
            scope.set_metadata(step, metadata)?;
        }

        self.completed.insert(step.to_string());
        if !self.step_ordering.iter().any(|s| s == step) {
            self.step_ordering.push(step.to_string());
        }
        info!("invoke:done step={step} elapsed={elapsed:.6}");
        Ok(StepOutcome::Executed { output: output.into_raw() })
    }
}
