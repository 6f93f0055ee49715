#![allow(dead_code)]

use async_trait::async_trait;
use feed_sentiment::{
    ContentFeed, ContextMode, FeedCandidate, LexiconBackend, LexiconDataset, LexiconStore, Result,
    SentimentError, WordCounts,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn visible(content: &str, author: &str) -> FeedCandidate {
    FeedCandidate {
        content: content.to_string(),
        author: author.to_string(),
        viewport_visible: true,
        expandable: false,
    }
}

pub fn hidden(content: &str, author: &str) -> FeedCandidate {
    FeedCandidate {
        viewport_visible: false,
        ..visible(content, author)
    }
}

pub fn expandable(content: &str, author: &str) -> FeedCandidate {
    FeedCandidate {
        expandable: true,
        ..visible(content, author)
    }
}

pub fn counts(positive: u32, negative: u32) -> WordCounts {
    WordCounts { positive, negative }
}

pub fn dataset(words: &[(&str, u32, u32)]) -> LexiconDataset {
    words
        .iter()
        .map(|(word, positive, negative)| (word.to_string(), counts(*positive, *negative)))
        .collect()
}

pub async fn love_hate_lexicon() -> Result<Arc<LexiconStore>> {
    let store = LexiconStore::from_dataset(dataset(&[("LOVE", 1, 0), ("HATE", 0, 1)])).await?;
    Ok(Arc::new(store))
}

/// Feed that replays scripted batches; the last batch keeps being shown,
/// like a page that stops changing.
pub struct ScriptedFeed {
    pub mode: ContextMode,
    pub thread_author: Option<String>,
    batches: VecDeque<Vec<FeedCandidate>>,
    pub expanded: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFeed {
    pub fn timeline(batches: Vec<Vec<FeedCandidate>>) -> Self {
        Self {
            mode: ContextMode::Timeline,
            thread_author: None,
            batches: batches.into(),
            expanded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn thread(author: &str, batches: Vec<Vec<FeedCandidate>>) -> Self {
        Self {
            mode: ContextMode::Threaded,
            thread_author: Some(author.to_string()),
            ..Self::timeline(batches)
        }
    }
}

impl ContentFeed for ScriptedFeed {
    fn context_mode(&self) -> ContextMode {
        self.mode
    }

    fn thread_author(&self) -> Option<String> {
        self.thread_author.clone()
    }

    fn candidates(&mut self) -> Vec<FeedCandidate> {
        if self.batches.len() > 1 {
            self.batches.pop_front().unwrap_or_default()
        } else {
            self.batches.front().cloned().unwrap_or_default()
        }
    }

    fn request_expand(&mut self, candidate: &FeedCandidate) {
        self.expanded.lock().unwrap().push(candidate.content.clone());
    }
}

/// Backend that cannot be reached for one particular word.
pub struct FailingLexicon {
    pub poison: &'static str,
}

#[async_trait]
impl LexiconBackend for FailingLexicon {
    async fn lookup(&self, word: &str) -> Result<Option<WordCounts>> {
        if word.eq_ignore_ascii_case(self.poison) {
            return Err(SentimentError::LookupFailure(format!("store unavailable while reading {}", word)));
        }
        Ok(None)
    }

    async fn entry_count(&self) -> usize {
        0
    }
}

/// Wraps a store and answers each word after a word-dependent delay, so
/// lookups complete out of order.
pub struct JitteryLexicon {
    pub inner: Arc<LexiconStore>,
}

#[async_trait]
impl LexiconBackend for JitteryLexicon {
    async fn lookup(&self, word: &str) -> Result<Option<WordCounts>> {
        let delay = word.bytes().fold(0u64, |acc, b| (acc * 31 + b as u64) % 7);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(self.inner.lookup(word).await)
    }

    async fn entry_count(&self) -> usize {
        self.inner.len().await
    }
}

/// Backend that never answers, to hold a session in progress.
pub struct StalledLexicon;

#[async_trait]
impl LexiconBackend for StalledLexicon {
    async fn lookup(&self, _word: &str) -> Result<Option<WordCounts>> {
        futures::future::pending::<()>().await;
        Ok(None)
    }

    async fn entry_count(&self) -> usize {
        0
    }
}
