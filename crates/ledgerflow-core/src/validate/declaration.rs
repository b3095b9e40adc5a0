use std::collections::HashSet;

use crate::constants::{FLAG_PREFIX, FORCE_PARAM, PANIC_ON_EXISTING_PARAM};
use crate::errors::DefinitionError;
use crate::step::StepDefinition;

/// Comprueba la declaración de un step aislado.
pub fn validate_step<P>(step: &StepDefinition<P>) -> Result<(), DefinitionError> {
    let name = step.name();
    if name.trim().is_empty() {
        return Err(DefinitionError::EmptyStepName);
    }
    if step.body_fn().is_none() {
        return Err(DefinitionError::MissingBody { step: name.to_string() });
    }

    let creates = step.creates_decl();
    let requires = step.requires_decl();
    let blank = |n: &str| n.trim().is_empty() || n.trim_start_matches(FLAG_PREFIX).is_empty();
    if creates.all().chain(requires.all()).any(blank) {
        return Err(DefinitionError::EmptyResultName { step: name.to_string() });
    }

    if let Some(bad) = creates.all().chain(requires.all()).find(|n| !storable(n)) {
        return Err(DefinitionError::InvalidResultName { step: name.to_string(),
                                                        name: bad.to_string() });
    }

    let cyclic: Vec<String> = requires.all().filter(|r| creates.contains(r)).map(str::to_string).collect();
    if !cyclic.is_empty() {
        return Err(DefinitionError::SelfDependency { step: name.to_string(),
                                                     names: cyclic });
    }

    let mut seen = HashSet::new();
    for param in step.accepted_params() {
        if param == FORCE_PARAM || param == PANIC_ON_EXISTING_PARAM {
            return Err(DefinitionError::ReservedParameter { step: name.to_string(),
                                                            param: param.clone() });
        }
        if !seen.insert(param.as_str()) {
            return Err(DefinitionError::DuplicateParameter { step: name.to_string(),
                                                             param: param.clone() });
        }
    }
    Ok(())
}

/// Los nombres de resultado acaban como rutas dentro del archivo.
fn storable(name: &str) -> bool {
    !name.contains('\\') && name.split('/').all(|c| !c.is_empty() && c != "." && c != "..")
}

/// Comprueba todos los steps y la unicidad de nombres.
pub fn validate_registry<P>(steps: &[StepDefinition<P>]) -> Result<(), DefinitionError> {
    let mut names = HashSet::new();
    for step in steps {
        validate_step(step)?;
        if !names.insert(step.name()) {
            return Err(DefinitionError::DuplicateStep(step.name().to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Output;

    fn step(name: &str) -> StepDefinition<()> {
        StepDefinition::new(name).body(|_| Ok(Output::None))
    }

    #[test]
    fn rejects_missing_body_and_empty_names() {
        assert_eq!(validate_step(&StepDefinition::<()>::new("a")),
                   Err(DefinitionError::MissingBody { step: "a".into() }));
        assert_eq!(validate_step(&step(" ")), Err(DefinitionError::EmptyStepName));
        assert_eq!(validate_step(&step("a").creates("_")),
                   Err(DefinitionError::EmptyResultName { step: "a".into() }));
    }

    #[test]
    fn rejects_names_that_escape_the_results_directory() {
        for bad in ["a/../b", "..", "/abs", "a//b", "./a", "a\\b"] {
            assert_eq!(validate_step(&step("s").creates(bad)),
                       Err(DefinitionError::InvalidResultName { step: "s".into(), name: bad.into() }),
                       "{bad}");
        }
        assert!(validate_step(&step("s").requires("_ok/x").creates("nested/name.v2")).is_ok());
    }

    #[test]
    fn rejects_requiring_own_output() {
        let err = validate_step(&step("a").creates("x").requires(vec!["x", "y"])).unwrap_err();
        assert_eq!(err, DefinitionError::SelfDependency { step: "a".into(), names: vec!["x".into()] });
    }

    #[test]
    fn rejects_reserved_and_duplicate_params() {
        assert!(matches!(validate_step(&step("a").params(["force"])),
                         Err(DefinitionError::ReservedParameter { .. })));
        assert!(matches!(validate_step(&step("a").params(["k", "k"])),
                         Err(DefinitionError::DuplicateParameter { .. })));
    }

    #[test]
    fn rejects_duplicate_step_names() {
        let steps = vec![step("a"), step("b"), step("a")];
        assert_eq!(validate_registry(&steps), Err(DefinitionError::DuplicateStep("a".into())));
    }
}
