use alloc::sync::Arc;
use std::sync::RwLock;

use crate::error::{Result, TabError};
use crate::tournament::Tournament;

/// A [`Tournament`] behind a single lock, for callers on several threads.
///
/// Writers hold the lock for their whole validate-then-mutate sequence, so a
/// draw generation can never interleave with a move or a ballot submission.
/// Readers such as standings queries may run side by side.
#[derive(Debug, Clone, Default)]
pub struct SharedTournament {
    inner: Arc<RwLock<Tournament>>,
}

impl SharedTournament {
    #[must_use]
    pub fn new(tournament: Tournament) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tournament)),
        }
    }

    pub fn read<T>(&self, f: impl FnOnce(&Tournament) -> T) -> Result<T> {
        let guard = self.inner.read().map_err(|_| TabError::Poisoned)?;
        Ok(f(&*guard))
    }

    pub fn write<T>(&self, f: impl FnOnce(&mut Tournament) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.write().map_err(|_| TabError::Poisoned)?;
        f(&mut *guard)
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> Result<Tournament> {
        self.read(Clone::clone)
    }
}
