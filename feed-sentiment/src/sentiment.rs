use crate::traits::LexiconBackend;
use crate::types::{Result, WordCounts, DEFAULT_LOOKUP_CONCURRENCY};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Split text into maximal runs of ASCII word characters (`[A-Za-z0-9_]`).
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Sums behind a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive_sum: u64,
    pub negative_sum: u64,
    pub token_count: usize,
    pub score: f64,
}

impl SentimentBreakdown {
    fn from_sums(positive_sum: u64, negative_sum: u64, token_count: usize) -> Self {
        let score = if token_count == 0 {
            0.0
        } else {
            (positive_sum as f64 - negative_sum as f64) / token_count as f64
        };
        Self {
            positive_sum,
            negative_sum,
            token_count,
            score,
        }
    }
}

/// Scores a set of texts against a lexicon.
#[derive(Clone)]
pub struct SentimentAggregator {
    lexicon: Arc<dyn LexiconBackend>,
    lookup_concurrency: usize,
}

impl SentimentAggregator {
    pub fn new(lexicon: Arc<dyn LexiconBackend>) -> Self {
        Self {
            lexicon,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        }
    }

    pub fn with_lookup_concurrency(mut self, limit: usize) -> Self {
        self.lookup_concurrency = limit.max(1);
        self
    }

    /// `(positive - negative) / tokens`, or `0.0` when there are no tokens.
    pub async fn score<S: AsRef<str>>(&self, items: &[S]) -> Result<f64> {
        Ok(self.analyze(items).await?.score)
    }

    /// Like [`score`](Self::score) but keeps the sums. The first failed
    /// lookup aborts the whole computation.
    pub async fn analyze<S: AsRef<str>>(&self, items: &[S]) -> Result<SentimentBreakdown> {
        let combined = items
            .iter()
            .map(|item| item.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        // Owned so the lookup futures do not borrow from this frame
        let tokens: Vec<String> = tokenize(&combined).into_iter().map(str::to_owned).collect();
        let token_count = tokens.len();

        if token_count == 0 {
            return Ok(SentimentBreakdown::default());
        }

        let lexicon = Arc::clone(&self.lexicon);
        let (positive_sum, negative_sum) = stream::iter(tokens)
            .map(move |token| {
                let lexicon = Arc::clone(&lexicon);
                async move { lexicon.lookup(&token).await }
            })
            .buffer_unordered(self.lookup_concurrency)
            .try_fold((0u64, 0u64), |(pos, neg), hit| async move {
                Ok(match hit {
                    Some(WordCounts { positive, negative }) => {
                        (pos + u64::from(positive), neg + u64::from(negative))
                    }
                    None => (pos, neg),
                })
            })
            .await?;

        Ok(SentimentBreakdown::from_sums(positive_sum, negative_sum, token_count))
    }
}
