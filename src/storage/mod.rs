//! Post persistence.

pub mod sqlite;

pub use sqlite::{PostStore, StoreStats};

/// Outcome of persisting one page's batch of posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Posts newly inserted by this batch
    pub inserted: usize,

    /// Posts already present in the store
    pub duplicates: usize,

    /// Posts dropped after the per-record fallback also failed
    pub dropped: usize,
}

impl BatchOutcome {
    /// True when the batch contributed nothing new, which is the
    /// exhaustion-mode termination signal.
    pub fn no_new_records(&self) -> bool {
        self.inserted == 0
    }
}
