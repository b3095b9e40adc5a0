//! Ledger de resultados.
//!
//! Almacén ordenado nombre → valor (`serde_json::Value`) más nombre de step →
//! `StepMetadata`. La lectura es libre; la escritura y el borrado sólo son
//! válidos dentro de un `MutationScope`, que el crate concede únicamente al
//! commit de un step y a la restauración desde un archivo.

mod scope;
mod snapshot;
mod store;

pub use scope::MutationScope;
pub use snapshot::LedgerSnapshot;
pub use store::Ledger;
