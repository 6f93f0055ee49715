use crate::types::{SubmitOutcome, TextItem, DEFAULT_SIGNATURE_LEN};
use tracing::debug;

/// Ordered, deduplicating set of items observed from a feed.
///
/// Items are matched by prefix containment so that a post which first shows
/// up half rendered is recognised, and replaced, once its full text appears.
/// Each submission scans the whole collection; fine for the dozens of items a
/// page shows, quadratic over a long session.
#[derive(Debug, Clone)]
pub struct ItemCollection {
    items: Vec<TextItem>,
    signature_len: usize,
    next_order: usize,
}

impl ItemCollection {
    pub fn new() -> Self {
        Self::with_signature_len(DEFAULT_SIGNATURE_LEN)
    }

    pub fn with_signature_len(signature_len: usize) -> Self {
        Self {
            items: Vec::new(),
            signature_len,
            next_order: 0,
        }
    }

    pub fn signature_len(&self) -> usize {
        self.signature_len
    }

    /// Offer a candidate. Relevance is only consulted for items not already
    /// known, so an upgrade never depends on it.
    pub fn submit<F>(&mut self, candidate: TextItem, is_relevant: F) -> SubmitOutcome
    where
        F: FnOnce(&TextItem) -> bool,
    {
        if candidate.content.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let signature_len = self.signature_len;
        let signature = candidate.signature(signature_len);

        let matched = self.items.iter_mut().find(|existing| {
            existing.content.contains(signature)
                || candidate.content.contains(existing.signature(signature_len))
        });

        if let Some(existing) = matched {
            if candidate.char_len() > existing.char_len() {
                debug!(
                    "Upgrading item #{} from {} to {} chars",
                    existing.insertion_order,
                    existing.char_len(),
                    candidate.char_len()
                );
                existing.content = candidate.content;
                return SubmitOutcome::Upgraded;
            }
            return SubmitOutcome::Ignored;
        }

        if !is_relevant(&candidate) {
            return SubmitOutcome::Ignored;
        }

        let item = TextItem {
            content: candidate.content,
            insertion_order: self.next_order,
        };
        self.next_order += 1;
        self.items.push(item);
        SubmitOutcome::Added
    }

    pub fn items(&self) -> &[TextItem] {
        &self.items
    }

    /// Contents in insertion order, as sent to the scorer.
    pub fn snapshot(&self) -> Vec<String> {
        self.items.iter().map(|item| item.content.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ItemCollection {
    fn default() -> Self {
        Self::new()
    }
}
