use crate::types::{Result, WordCounts};
use async_trait::async_trait;

/// Read access to a word polarity table.
///
/// `Ok(None)` means the word is unknown; `Err` means the table could not be
/// consulted at all. Callers must keep the two apart.
#[async_trait]
pub trait LexiconBackend: Send + Sync {
    /// Look a word up, normalising it to the table's key convention first.
    async fn lookup(&self, word: &str) -> Result<Option<WordCounts>>;

    /// Number of entries currently installed.
    async fn entry_count(&self) -> usize;
}
