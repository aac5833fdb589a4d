//! Mapping types and traits

use crate::directory::RawEntry;

/// Outcome of mapping one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome<T> {
    /// The entry was converted
    Mapped(T),
    /// The entry is dropped and the page continues
    Skipped(String),
    /// The entry cannot be converted; the whole search fails
    Failed(String),
}

impl<T> EntryOutcome<T> {
    /// Create a skipped outcome
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped(reason.into())
    }

    /// Create a failed outcome
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Check if the entry was converted
    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }

    /// Check if the entry was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Check if the entry failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Converts raw directory entries into records
pub trait EntryMapper: Send + Sync {
    /// Record type produced
    type Output;

    /// Map one entry
    fn map(&self, entry: &RawEntry) -> EntryOutcome<Self::Output>;
}

impl<F, T> EntryMapper for F
where
    F: Fn(&RawEntry) -> EntryOutcome<T> + Send + Sync,
{
    type Output = T;

    fn map(&self, entry: &RawEntry) -> EntryOutcome<T> {
        self(entry)
    }
}
