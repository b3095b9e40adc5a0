//! Validación de uso de dependencias.
//!
//! - `declaration`: comprobaciones de definición, ejecutadas una sola vez al
//!   construir el `StepRegistry`.
//! - `access`: guardia de lecturas; toda lectura del ledger desde un cuerpo
//!   pasa por ella y falla en el primer uso de un nombre no declarado.

pub mod access;
pub mod declaration;

pub use access::AccessGuard;
pub use declaration::{validate_registry, validate_step};
