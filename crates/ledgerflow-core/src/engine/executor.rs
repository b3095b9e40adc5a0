use log::{debug, info};

use super::Pipeline;
use crate::errors::PipelineError;
use crate::graph::{topological_order, DependencyGraph};
use crate::step::{StepCall, StepOutcome};

/// Opciones de `Pipeline::execute`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Step objetivo; `None` ejecuta el grafo completo.
    pub target: Option<String>,
    pub force: bool,
    pub panic_on_existing: bool,
}

impl ExecuteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, step: impl Into<String>) -> Self {
        self.target = Some(step.into());
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn panic_on_existing(mut self, panic: bool) -> Self {
        self.panic_on_existing = panic;
        self
    }
}

impl<P> Pipeline<P> {
    /// Orden de ejecución calculado, sin ejecutar nada.
    pub fn execution_plan(&self) -> Result<Vec<String>, PipelineError> {
        topological_order(&DependencyGraph::build(self.registry.as_ref()))
    }

    /// Ejecuta los steps en orden topológico.
    ///
    /// Con `target`, se recorta el orden hasta el objetivo y se limita a sus
    /// prerequisitos transitivos. Un step ya completado sólo se re-ejecuta
    /// con `force`. Devuelve el resultado del objetivo (o `None` sin
    /// objetivo); si el objetivo ya estaba completo devuelve `Skipped` con
    /// sus valores actuales.
    pub fn execute(&mut self, options: ExecuteOptions) -> Result<Option<StepOutcome>, PipelineError> {
        let graph = DependencyGraph::build(self.registry.as_ref());
        let mut order = topological_order(&graph)?;
        if let Some(target) = options.target.as_deref() {
            let position = order.iter()
                                .position(|s| s == target)
                                .ok_or_else(|| PipelineError::UnknownStep(target.to_string()))?;
            let ancestors = graph.ancestors(target);
            order.truncate(position + 1);
            order.retain(|s| s == target || ancestors.contains(s));
        }
        info!("execute:start run_id={} target={:?} steps={order:?}",
              self.run_id(),
              options.target);

        let mut outcome = None;
        for step in &order {
            let is_target = options.target.as_deref() == Some(step.as_str());
            if self.completed.contains(step) && !options.force {
                debug!("execute:skip_completed step={step}");
                if is_target {
                    let def = self.registry.get(step).ok_or_else(|| PipelineError::UnknownStep(step.clone()))?;
                    outcome = Some(StepOutcome::Skipped { existing: self.current_values(def.create_values()) });
                }
                continue;
            }
            let call = StepCall::new().force(options.force).panic_on_existing(options.panic_on_existing);
            let result = self.invoke(step, call)?;
            if is_target {
                outcome = Some(result);
            }
        }
        info!("execute:done run_id={} completed={}", self.run_id(), self.completed.len());
        Ok(outcome)
    }

    /// `execute` sin objetivo.
    pub fn execute_all(&mut self, force: bool, panic_on_existing: bool) -> Result<(), PipelineError> {
        self.execute(ExecuteOptions::new().force(force).panic_on_existing(panic_on_existing))?;
        Ok(())
    }
}
