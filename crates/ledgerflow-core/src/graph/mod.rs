//! Grafo de dependencias entre steps y orden topológico (Kahn).
//!
//! Arista A→B por cada nombre (valor o flag) que B requiere y A crea. Un
//! requisito sin productor no genera arista: se detecta al invocar el step
//! como error de requisitos, no como error estructural.

mod order;

use indexmap::{IndexMap, IndexSet};

use crate::step::StepRegistry;

pub use order::topological_order;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// step → sucesores (steps que dependen de él), en orden de declaración.
    successors: IndexMap<String, IndexSet<String>>,
    /// step → predecesores (productores de lo que requiere).
    predecessors: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    pub fn build<P>(registry: &StepRegistry<P>) -> Self {
        let mut graph = Self::default();
        for step in registry.steps() {
            graph.successors.entry(step.name().to_string()).or_default();
            graph.predecessors.entry(step.name().to_string()).or_default();
        }
        for consumer in registry.steps() {
            for required in consumer.requires_decl().all() {
                for producer in registry.producers_of(required) {
                    graph.add_edge(producer, consumer.name());
                }
            }
        }
        graph
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        self.successors.entry(from.to_string()).or_default().insert(to.to_string());
        self.predecessors.entry(to.to_string()).or_default().insert(from.to_string());
    }

    /// Steps en orden de declaración.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.successors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    pub fn successors(&self, step: &str) -> impl Iterator<Item = &str> {
        self.successors.get(step).into_iter().flatten().map(String::as_str)
    }

    pub fn predecessors(&self, step: &str) -> impl Iterator<Item = &str> {
        self.predecessors.get(step).into_iter().flatten().map(String::as_str)
    }

    /// Aristas (productor, consumidor).
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.successors
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (from.as_str(), to.as_str())))
            .collect()
    }

    /// Cierre transitivo de prerequisitos de `step` (sin incluirlo).
    pub fn ancestors(&self, step: &str) -> IndexSet<String> {
        let mut seen = IndexSet::new();
        let mut stack: Vec<&str> = self.predecessors(step).collect();
        while let Some(current) = stack.pop() {
            if seen.insert(current.to_string()) {
                stack.extend(self.predecessors(current));
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Output, StepDefinition};

    fn noop(name: &str) -> StepDefinition<()> {
        StepDefinition::new(name).body(|_| Ok(Output::None))
    }

    #[test]
    fn edges_follow_values_and_flags() {
        let registry = StepRegistry::builder("g")
            .step(noop("a").creates(vec!["x", "_ready"]))
            .step(noop("b").requires(vec!["x", "_ready"]).creates("y"))
            .step(noop("c").requires(vec!["y", "orphan"]))
            .build()
            .unwrap();
        let graph = DependencyGraph::build(&registry);
        assert_eq!(graph.edges(), vec![("a", "b"), ("b", "c")]);
        assert_eq!(graph.ancestors("c").into_iter().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(graph.ancestors("a").is_empty());
    }

    #[test]
    fn every_producer_gets_an_edge() {
        let registry = StepRegistry::builder("g")
            .step(noop("a1").creates("x"))
            .step(noop("a2").creates("x"))
            .step(noop("b").requires("x"))
            .build()
            .unwrap();
        let graph = DependencyGraph::build(&registry);
        assert_eq!(graph.predecessors("b").collect::<Vec<_>>(), vec!["a1", "a2"]);
    }
}
