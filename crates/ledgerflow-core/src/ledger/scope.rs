use std::ops::{Deref, DerefMut};

use super::Ledger;

/// Permiso exclusivo y acotado de mutación sobre un `Ledger`.
///
/// Mientras vive, `set`/`remove`/`set_metadata` están autorizados; al
/// soltarse el permiso se revoca. El préstamo `&mut` garantiza que no existan
/// dos scopes a la vez.
pub struct MutationScope<'a> {
    ledger: &'a mut Ledger,
}

impl<'a> MutationScope<'a> {
    pub(crate) fn new(ledger: &'a mut Ledger) -> Self {
        ledger.unlocked = true;
        Self { ledger }
    }
}

impl Deref for MutationScope<'_> {
    type Target = Ledger;

    fn deref(&self) -> &Ledger {
        self.ledger
    }
}

impl DerefMut for MutationScope<'_> {
    fn deref_mut(&mut self) -> &mut Ledger {
        self.ledger
    }
}

impl Drop for MutationScope<'_> {
    fn drop(&mut self) {
        self.ledger.unlocked = false;
    }
}
