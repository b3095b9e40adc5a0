//! Definiciones relacionadas a Steps.
//!
//! Un step es una operación con nombre que declara los resultados y flags que
//! produce (`creates`) y consume (`requires`). Este módulo define:
//! - `Name` / `Names`: normalización de declaraciones (valor o flag).
//! - `StepDefinition`: declaración inmutable + cuerpo.
//! - `StepRegistry`: registro explícito de steps de un tipo de pipeline,
//!   validado una única vez al construirse.
//! - `StepContext`: vista que recibe el cuerpo (params + lecturas declaradas).
//! - `Output` / `StepOutcome`: valor devuelto por el cuerpo y resultado de la
//!   invocación.
//! - `StepMetadata`, `StepInfo`, `StepReport`.

mod call;
mod context;
pub mod definition;
mod info;
mod metadata;
pub mod names;
pub mod output;
pub mod registry;

pub use call::{ControlFlags, StepCall};
pub use context::StepContext;
pub use definition::{StepBody, StepDefinition};
pub use info::{StepInfo, StepReport};
pub use metadata::StepMetadata;
pub(crate) use metadata::stringify;
pub use names::{Declared, Name, Names};
pub use output::{Output, StepOutcome};
pub use registry::{StepRegistry, StepRegistryBuilder};
