use std::cell::RefCell;

use indexmap::IndexSet;

use crate::errors::DefinitionError;
use crate::step::Declared;

/// Registra las lecturas de un cuerpo y rechaza las no declaradas.
#[derive(Debug)]
pub struct AccessGuard<'a> {
    step: &'a str,
    allowed: &'a Declared,
    accessed: RefCell<IndexSet<String>>,
    undeclared: RefCell<IndexSet<String>>,
}

impl<'a> AccessGuard<'a> {
    pub fn new(step: &'a str, allowed: &'a Declared) -> Self {
        Self { step,
               allowed,
               accessed: RefCell::new(IndexSet::new()),
               undeclared: RefCell::new(IndexSet::new()) }
    }

    /// Autoriza la lectura de `name` o devuelve `UndeclaredAccess`.
    pub fn check(&self, name: &str) -> Result<(), DefinitionError> {
        self.accessed.borrow_mut().insert(name.to_string());
        if self.allowed.contains(name) {
            return Ok(());
        }
        self.undeclared.borrow_mut().insert(name.to_string());
        Err(DefinitionError::UndeclaredAccess { step: self.step.to_string(),
                                                names: vec![name.to_string()] })
    }

    pub fn accessed(&self) -> Vec<String> {
        self.accessed.borrow().iter().cloned().collect()
    }

    /// Violación acumulada: todos los nombres no declarados leídos.
    pub fn violation(&self) -> Option<DefinitionError> {
        let undeclared = self.undeclared.borrow();
        if undeclared.is_empty() {
            None
        } else {
            Some(DefinitionError::UndeclaredAccess { step: self.step.to_string(),
                                                     names: undeclared.iter().cloned().collect() })
        }
    }
}
