use crate::traits::LexiconBackend;
use crate::types::{LexiconEntry, LexiconRecord, Result, SentimentError, WordCounts};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Key convention of the store: words are kept upper-cased.
pub fn normalize_word(word: &str) -> String {
    word.to_uppercase()
}

/// Bundled word table: `{"WORD": {"Positive": n, "Negative": n}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LexiconDataset(pub BTreeMap<String, WordCounts>);

impl LexiconDataset {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SentimentError::DatasetLoad {
            reason: format!("malformed dataset: {}", e),
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| SentimentError::DatasetLoad {
            reason: format!("malformed dataset: {}", e),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| SentimentError::DatasetLoad {
            reason: format!("cannot open {}: {}", path.display(), e),
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, WordCounts)> for LexiconDataset {
    fn from_iter<I: IntoIterator<Item = (String, WordCounts)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

type Table = HashMap<String, WordCounts>;

/// In-memory word polarity table.
///
/// `load` builds the replacement table on the side and swaps it in only once
/// it is complete, so readers see either the old table or the new one.
pub struct LexiconStore {
    table: RwLock<Arc<Table>>,
}

impl LexiconStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    pub async fn from_dataset(dataset: LexiconDataset) -> Result<Self> {
        let store = Self::new();
        store.load(dataset).await?;
        Ok(store)
    }

    /// Replace the whole table with `dataset`. On error the previous table is
    /// left in place.
    pub async fn load(&self, dataset: LexiconDataset) -> Result<usize> {
        let staged = stage(dataset)?;
        let count = staged.len();

        *self.table.write().await = Arc::new(staged);

        info!("Lexicon loaded with {} entries", count);
        Ok(count)
    }

    pub async fn load_from_path(&self, path: impl AsRef<Path>) -> Result<usize> {
        let dataset = LexiconDataset::from_path(path)?;
        self.load(dataset).await
    }

    pub async fn lookup(&self, word: &str) -> Option<WordCounts> {
        let key = normalize_word(word);
        let table = self.table.read().await;
        table.get(&key).copied()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.is_empty()
    }

    /// Every entry as stored, sorted by key.
    pub async fn entries(&self) -> Vec<LexiconEntry> {
        let table = Arc::clone(&*self.table.read().await);
        let mut entries: Vec<LexiconEntry> = table
            .iter()
            .map(|(word, counts)| LexiconEntry {
                word: word.clone(),
                positive: counts.positive,
                negative: counts.negative,
            })
            .collect();
        entries.sort_by(|a, b| a.word.cmp(&b.word));
        entries
    }

    /// Entries in the persistent store's value shape.
    pub async fn records(&self) -> Vec<LexiconRecord> {
        self.entries().await.into_iter().map(LexiconRecord::from).collect()
    }
}

impl Default for LexiconStore {
    fn default() -> Self {
        Self::new()
    }
}

fn stage(dataset: LexiconDataset) -> Result<Table> {
    let mut staged = HashMap::with_capacity(dataset.len());

    for (word, counts) in dataset.0 {
        let key = normalize_word(word.trim());
        if key.is_empty() {
            return Err(SentimentError::DatasetLoad {
                reason: "dataset contains an empty word".to_string(),
            });
        }

        if let Some(previous) = staged.insert(key.clone(), counts) {
            if previous != counts {
                return Err(SentimentError::DatasetLoad {
                    reason: format!("conflicting counts for {} after normalisation", key),
                });
            }
            debug!("Duplicate dataset word {} collapsed", key);
        }
    }

    Ok(staged)
}

#[async_trait]
impl LexiconBackend for LexiconStore {
    async fn lookup(&self, word: &str) -> Result<Option<WordCounts>> {
        Ok(LexiconStore::lookup(self, word).await)
    }

    async fn entry_count(&self) -> usize {
        self.len().await
    }
}
