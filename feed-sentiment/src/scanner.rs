use crate::collection::ItemCollection;
use crate::types::{ContentFeed, ContextMode, FeedCandidate, SubmitOutcome, TextItem};
use tracing::debug;

/// Tally of a single scanner tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Items appended to the collection during this tick.
    pub added: Vec<TextItem>,
    pub upgraded: usize,
    pub ignored: usize,
    /// Candidates dropped because they were off screen or had no text.
    pub skipped: usize,
    /// Truncated candidates the feed was asked to expand.
    pub expand_requested: Vec<FeedCandidate>,
}

impl ScanReport {
    pub fn is_quiet(&self) -> bool {
        self.added.is_empty() && self.upgraded == 0 && self.expand_requested.is_empty()
    }
}

/// Pulls candidates from a feed and hands them to an [`ItemCollection`].
///
/// Holds no state of its own, so it can run on every tick even when the
/// feed is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionScanner;

impl ExtractionScanner {
    pub fn new() -> Self {
        Self
    }

    /// Read one batch from `feed` and submit it.
    pub fn tick<F>(&self, feed: &mut F, collection: &mut ItemCollection) -> ScanReport
    where
        F: ContentFeed + ?Sized,
    {
        let mode = feed.context_mode();
        let thread_author = feed.thread_author();
        let batch = feed.candidates();

        let mut expand = Vec::new();
        let report = self.scan_batch(batch, mode, thread_author.as_deref(), collection, |candidate| {
            expand.push(candidate.clone())
        });

        for candidate in &expand {
            feed.request_expand(candidate);
        }
        report
    }

    /// Submit an already fetched batch. `on_expand` is called for every
    /// truncated timeline candidate that is not yet known.
    pub fn scan_batch<E>(
        &self,
        batch: Vec<FeedCandidate>,
        mode: ContextMode,
        thread_author: Option<&str>,
        collection: &mut ItemCollection,
        mut on_expand: E,
    ) -> ScanReport
    where
        E: FnMut(&FeedCandidate),
    {
        let mut report = ScanReport::default();

        for candidate in batch {
            // Partially rendered text would poison prefix matching
            if !candidate.viewport_visible || candidate.content.trim().is_empty() {
                report.skipped += 1;
                continue;
            }

            let mut wants_expand = false;
            let author = candidate.author.as_str();
            let expandable = candidate.expandable;
            let outcome = collection.submit(TextItem::new(candidate.content.clone()), |_| match mode {
                ContextMode::Threaded => thread_author.is_some_and(|root| author == root),
                ContextMode::Timeline => {
                    wants_expand = expandable;
                    !expandable
                }
            });

            match outcome {
                SubmitOutcome::Added => {
                    if let Some(item) = collection.items().last() {
                        report.added.push(item.clone());
                    }
                }
                SubmitOutcome::Upgraded => report.upgraded += 1,
                SubmitOutcome::Ignored => report.ignored += 1,
            }

            if wants_expand {
                on_expand(&candidate);
                report.expand_requested.push(candidate);
            }
        }

        if !report.is_quiet() {
            debug!(
                "Scan tick: {} added, {} upgraded, {} ignored, {} skipped, {} expand requests",
                report.added.len(),
                report.upgraded,
                report.ignored,
                report.skipped,
                report.expand_requested.len()
            );
        }
        report
    }
}
