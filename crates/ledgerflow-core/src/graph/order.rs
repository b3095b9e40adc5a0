use std::collections::VecDeque;

use indexmap::IndexMap;
use log::debug;

use super::DependencyGraph;
use crate::errors::PipelineError;

/// Orden topológico por el algoritmo de Kahn.
///
/// Falla con `MissingStart` si ningún step tiene grado de entrada cero y con
/// `CircularDependency` si quedan steps sin ordenar (ciclo no alcanzable
/// desde ningún inicio). Los empates se resuelven por orden de declaración.
pub fn topological_order(graph: &DependencyGraph) -> Result<Vec<String>, PipelineError> {
    let mut indegree: IndexMap<&str, usize> =
        graph.nodes().map(|n| (n, graph.predecessors(n).count())).collect();

    let mut queue: VecDeque<&str> = indegree.iter().filter(|(_, d)| **d == 0).map(|(n, _)| *n).collect();
    if queue.is_empty() && !indegree.is_empty() {
        return Err(PipelineError::MissingStart);
    }

    let mut order: Vec<String> = Vec::with_capacity(indegree.len());
    while let Some(step) = queue.pop_front() {
        order.push(step.to_string());
        for next in graph.successors(step) {
            if let Some(d) = indegree.get_mut(next) {
                *d -= 1;
                if *d == 0 {
                    queue.push_back(next);
                }
            }
        }
    }

    if order.len() < indegree.len() {
        let unresolved: Vec<String> =
            indegree.iter().filter(|(_, d)| **d > 0).map(|(n, _)| n.to_string()).collect();
        return Err(PipelineError::CircularDependency { unresolved });
    }
    debug!("graph:order steps={order:?}");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Output, StepDefinition, StepRegistry};

    fn noop(name: &str) -> StepDefinition<()> {
        StepDefinition::new(name).body(|_| Ok(Output::None))
    }

    fn order_of(steps: Vec<StepDefinition<()>>) -> Result<Vec<String>, PipelineError> {
        let registry = steps.into_iter().fold(StepRegistry::builder("t"), |b, s| b.step(s)).build().unwrap();
        topological_order(&DependencyGraph::build(&registry))
    }

    #[test]
    fn linear_chain_declared_backwards_is_sorted() {
        let order = order_of(vec![noop("c").requires("y").creates("z"),
                                  noop("b").requires("x").creates("y"),
                                  noop("a").creates("x")]).unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn no_entry_point_is_missing_start() {
        let err = order_of(vec![noop("a").creates("ra").requires("rb"),
                                noop("b").creates("rb").requires("ra"),
                                noop("c").creates("rc").requires("ra")]).unwrap_err();
        assert!(matches!(err, PipelineError::MissingStart));
    }

    #[test]
    fn downstream_cycle_is_circular() {
        let err = order_of(vec![noop("a").creates("ra"),
                                noop("b").creates("rb").requires("ra"),
                                noop("c").creates("rc").requires(vec!["rd", "rb"]),
                                noop("d").creates("rd").requires("rc")]).unwrap_err();
        match err {
            PipelineError::CircularDependency { unresolved } => assert_eq!(unresolved, vec!["c", "d"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_registry_has_empty_order() {
        assert!(order_of(vec![]).unwrap().is_empty());
    }
}
