//! Error unificado de la fachada.

use ledgerflow_archive::ArchiveError;
use ledgerflow_core::{DefinitionError, LedgerError, PipelineError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerflowError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
