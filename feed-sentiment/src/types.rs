use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

// Boundary types shared with the host layer
pub use interfaces::defs::{
    ContentFeed, ContextMode, FeedCandidate, InboundMessage, LexiconRecord, OutboundMessage,
    SessionId, WordCounts,
};

/// Number of leading characters used to recognise the same item across loads.
pub const DEFAULT_SIGNATURE_LEN: usize = 200;

/// Lexicon lookups allowed in flight for one score.
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 16;

/// A collected piece of text. Identity is structural: two items are the same
/// when their signatures overlap, never through an explicit id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    pub content: String,
    pub insertion_order: usize,
}

impl TextItem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            insertion_order: 0,
        }
    }

    /// Prefix of at most `len` characters (not bytes).
    pub fn signature(&self, len: usize) -> &str {
        match self.content.char_indices().nth(len) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }

    /// Length in characters, which is what upgrades compare.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// What happened to a candidate handed to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Added,
    Upgraded,
    Ignored,
}

/// A word with its normalised key and polarity counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    pub word: String,
    pub positive: u32,
    pub negative: u32,
}

impl From<LexiconEntry> for LexiconRecord {
    fn from(entry: LexiconEntry) -> Self {
        Self {
            word: entry.word,
            counts: WordCounts {
                positive: entry.positive,
                negative: entry.negative,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub extraction_interval_ms: u64,
    pub flush_interval_ms: u64,
    pub signature_len: usize,
    pub lookup_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extraction_interval_ms: 100,
            flush_interval_ms: 2000,
            signature_len: DEFAULT_SIGNATURE_LEN,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with any `FEED_SENTIMENT_*` variables that parse.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = env_override("FEED_SENTIMENT_EXTRACTION_MS") {
            config.extraction_interval_ms = ms;
        }
        if let Some(ms) = env_override("FEED_SENTIMENT_FLUSH_MS") {
            config.flush_interval_ms = ms;
        }
        if let Some(len) = env_override("FEED_SENTIMENT_SIGNATURE_LEN") {
            config.signature_len = len;
        }
        if let Some(limit) = env_override("FEED_SENTIMENT_LOOKUP_CONCURRENCY") {
            config.lookup_concurrency = limit;
        }
        config
    }
}

fn env_override<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable value for {}: {:?}", key, raw);
            None
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SentimentError {
    #[error("Lexicon dataset could not be loaded: {reason}")]
    DatasetLoad { reason: String },

    #[error("Lexicon lookup failed: {0}")]
    LookupFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, SentimentError>;
