//! Registro explícito de steps de un tipo de pipeline.
//!
//! Se construye una sola vez (`StepRegistryBuilder::build`), momento en el
//! que se ejecutan las validaciones de definición. El grafo de dependencias y
//! el executor consultan este registro; nunca inspeccionan objetos vivos.

use indexmap::IndexMap;
use serde_json::json;

use super::StepDefinition;
use crate::constants::ENGINE_VERSION;
use crate::errors::{DefinitionError, PipelineError};
use crate::hashing::hash_value;
use crate::validate::validate_registry;

pub struct StepRegistry<P> {
    type_name: String,
    steps: IndexMap<String, StepDefinition<P>>,
    definition_hash: String,
}

pub struct StepRegistryBuilder<P> {
    type_name: String,
    steps: Vec<StepDefinition<P>>,
}

impl<P> StepRegistry<P> {
    /// Inicia un registro para el tipo de pipeline `type_name`.
    ///
    /// El nombre de tipo se persiste en los archivos y decide si una carga
    /// puede reconstruir el pipeline original.
    pub fn builder(type_name: impl Into<String>) -> StepRegistryBuilder<P> {
        StepRegistryBuilder { type_name: type_name.into(),
                              steps: Vec::new() }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn get(&self, name: &str) -> Option<&StepDefinition<P>> {
        self.steps.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Nombres de steps en orden de declaración.
    pub fn names(&self) -> Vec<&str> {
        self.steps.keys().map(String::as_str).collect()
    }

    pub fn steps(&self) -> impl Iterator<Item = &StepDefinition<P>> {
        self.steps.values()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps que crean `name` (valor o flag).
    pub fn producers_of(&self, name: &str) -> Vec<&str> {
        self.steps.values().filter(|s| s.creates_decl().contains(name)).map(|s| s.name()).collect()
    }

    /// Indica si algún step declara `name` en sus creates.
    pub fn produces(&self, name: &str) -> bool {
        self.steps.values().any(|s| s.creates_decl().contains(name))
    }

    /// Comprueba que un estado guardado pueda volver a este registro: mismo
    /// tipo, sólo steps conocidos y sólo resultados que algún step crea.
    pub fn check_restorable<'a, S, R>(&self, type_name: &str, steps: S, results: R) -> Result<(), PipelineError>
        where S: IntoIterator<Item = &'a str>,
              R: IntoIterator<Item = &'a str>
    {
        let incompatible = |reason: String| PipelineError::IncompatibleState { type_name: self.type_name.clone(),
                                                                               reason };
        if type_name != self.type_name {
            return Err(incompatible(format!("pipeline type '{type_name}' does not match")));
        }
        if let Some(step) = steps.into_iter().find(|s| !self.contains(s)) {
            return Err(incompatible(format!("unknown step '{step}'")));
        }
        if let Some(name) = results.into_iter().find(|n| !self.produces(n)) {
            return Err(incompatible(format!("result '{name}' is not created by any step")));
        }
        Ok(())
    }
}

impl<P> StepRegistryBuilder<P> {
    pub fn step(mut self, step: StepDefinition<P>) -> Self {
        self.steps.push(step);
        self
    }

    /// Declara un step con el tipo de parámetros ya fijado por el builder.
    ///
    /// Los cuerpos que acceden a campos de `ctx.params()` necesitan conocer
    /// `P` antes de compilarse; `StepDefinition::new` sólo lo descubre al
    /// pasar por `step`.
    ///
    /// ```ignore
    /// StepRegistry::<Params>::builder("t")
    ///     .define("scale", |d| d.requires("x").creates("y").body(|ctx| {
    ///         let x: f64 = ctx.require_as("x")?;
    ///         Ok(json!(x * ctx.params().factor).into())
    ///     }))
    /// ```
    pub fn define<F>(self, name: impl Into<String>, declare: F) -> Self
        where F: FnOnce(StepDefinition<P>) -> StepDefinition<P>
    {
        let step = declare(StepDefinition::new(name));
        self.step(step)
    }

    pub fn build(self) -> Result<StepRegistry<P>, DefinitionError> {
        validate_registry(&self.steps)?;
        let decl = self.steps
                       .iter()
                       .map(|s| {
                           json!({
                               "name": s.name(),
                               "creates": s.creates_decl().all().collect::<Vec<_>>(),
                               "requires": s.requires_decl().all().collect::<Vec<_>>(),
                               "params": s.accepted_params(),
                           })
                       })
                       .collect::<Vec<_>>();
        let definition_hash = hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "type_name": self.type_name,
            "steps": decl,
        }));
        let steps = self.steps.into_iter().map(|s| (s.name().to_string(), s)).collect();
        Ok(StepRegistry { type_name: self.type_name,
                          steps,
                          definition_hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Output;

    fn noop(name: &str) -> StepDefinition<()> {
        StepDefinition::new(name).body(|_| Ok(Output::None))
    }

    #[test]
    fn keeps_declaration_order_and_producers() {
        let registry = StepRegistry::builder("t")
            .step(noop("b").creates("y").requires("x"))
            .step(noop("a").creates(vec!["x", "_done"]))
            .build()
            .unwrap();
        assert_eq!(registry.names(), vec!["b", "a"]);
        assert_eq!(registry.producers_of("_done"), vec!["a"]);
        assert!(registry.produces("y"));
        assert!(!registry.produces("z"));
    }

    #[test]
    fn definition_hash_depends_on_declarations() {
        let one = StepRegistry::builder("t").step(noop("a").creates("x")).build().unwrap();
        let same = StepRegistry::builder("t").step(noop("a").creates("x")).build().unwrap();
        let other = StepRegistry::builder("t").step(noop("a").creates("z")).build().unwrap();
        assert_eq!(one.definition_hash(), same.definition_hash());
        assert_ne!(one.definition_hash(), other.definition_hash());
    }

    #[derive(Debug, Clone)]
    struct Scale {
        factor: i64,
    }

    #[test]
    fn define_fixes_the_params_type_for_bodies() {
        let registry = StepRegistry::<Scale>::builder("t")
            .define("a", |d| {
                d.creates("x").body(|ctx| Ok(serde_json::json!(ctx.params().factor * 2).into()))
            })
            .build()
            .unwrap();
        let mut pipeline = crate::Pipeline::new(registry, Scale { factor: 21 });
        pipeline.run_step("a").unwrap();
        assert_eq!(pipeline.results().get("x").unwrap(), &serde_json::json!(42));
    }

    #[test]
    fn restorable_state_names_only_known_steps_and_results() {
        let registry = StepRegistry::builder("t").step(noop("a").creates(vec!["x", "_done"])).build().unwrap();
        assert!(registry.check_restorable("t", ["a"], ["x", "_done"]).is_ok());
        let err = registry.check_restorable("t", ["ghost"], ["x"]).unwrap_err();
        assert!(matches!(err, PipelineError::IncompatibleState { ref reason, .. } if reason.contains("ghost")));
        assert!(registry.check_restorable("t", ["a"], ["evil"]).is_err());
        assert!(registry.check_restorable("other", ["a"], ["x"]).is_err());
    }

    #[test]
    fn build_rejects_duplicates() {
        let err = StepRegistry::builder("t").step(noop("a")).step(noop("a")).build().err();
        assert_eq!(err, Some(DefinitionError::DuplicateStep("a".into())));
    }
}
