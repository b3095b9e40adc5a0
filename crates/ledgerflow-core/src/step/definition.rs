use std::fmt;
use std::sync::Arc;

use super::names::{Declared, Names};
use super::{Output, StepContext};
use crate::errors::BodyError;

/// Cuerpo de un step: recibe el contexto y devuelve su `Output`.
pub type StepBody<P> = Arc<dyn Fn(&StepContext<'_, P>) -> Result<Output, BodyError> + Send + Sync>;

/// Declaración de un step.
///
/// ```ignore
/// StepDefinition::new("b")
///     .requires("x")
///     .creates("y")
///     .body(|ctx| {
///         let x: i64 = ctx.require_as("x")?;
///         Ok(json!(x * 2).into())
///     })
/// ```
pub struct StepDefinition<P> {
    name: String,
    creates: Declared,
    requires: Declared,
    params: Vec<String>,
    description: Option<String>,
    body: Option<StepBody<P>>,
}

impl<P> StepDefinition<P> {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               creates: Declared::default(),
               requires: Declared::default(),
               params: Vec::new(),
               description: None,
               body: None }
    }

    /// Añade nombres producidos (valor o flag).
    pub fn creates(mut self, names: impl Into<Names>) -> Self {
        self.creates.extend(names.into());
        self
    }

    /// Añade nombres requeridos (valor o flag).
    pub fn requires(mut self, names: impl Into<Names>) -> Self {
        self.requires.extend(names.into());
        self
    }

    /// Keyword params aceptados por el cuerpo; el resto se descarta al invocar.
    pub fn params<I, S>(mut self, params: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    /// Texto libre; aparece en `StepInfo` y en el manifest del archivo.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn body<F>(mut self, body: F) -> Self
        where F: Fn(&StepContext<'_, P>) -> Result<Output, BodyError> + Send + Sync + 'static
    {
        self.body = Some(Arc::new(body));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn creates_decl(&self) -> &Declared {
        &self.creates
    }

    pub fn requires_decl(&self) -> &Declared {
        &self.requires
    }

    pub fn create_values(&self) -> &[String] {
        &self.creates.values
    }

    pub fn create_flags(&self) -> &[String] {
        &self.creates.flags
    }

    pub fn require_values(&self) -> &[String] {
        &self.requires.values
    }

    pub fn require_flags(&self) -> &[String] {
        &self.requires.flags
    }

    pub fn accepted_params(&self) -> &[String] {
        &self.params
    }

    pub fn accepts(&self, param: &str) -> bool {
        self.params.iter().any(|p| p == param)
    }

    pub(crate) fn body_fn(&self) -> Option<&StepBody<P>> {
        self.body.as_ref()
    }
}

impl<P> Clone for StepDefinition<P> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(),
               creates: self.creates.clone(),
               requires: self.requires.clone(),
               params: self.params.clone(),
               description: self.description.clone(),
               body: self.body.clone() }
    }
}

impl<P> fmt::Debug for StepDefinition<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
         .field("name", &self.name)
         .field("creates", &self.creates)
         .field("requires", &self.requires)
         .field("params", &self.params)
         .field("has_body", &self.body.is_some())
         .finish()
    }
}
