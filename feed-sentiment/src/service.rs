use crate::sentiment::SentimentAggregator;
use crate::session::SessionTracker;
use crate::traits::LexiconBackend;
use crate::types::{EngineConfig, InboundMessage, OutboundMessage, Result, SessionId};
use futures::stream::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, warn};

/// Answers inbound host messages: starts guarded sentiment computations and
/// reports finished scores on heartbeat.
pub struct SentimentService {
    lexicon: Arc<dyn LexiconBackend>,
    aggregator: SentimentAggregator,
    tracker: Arc<SessionTracker>,
}

impl SentimentService {
    pub fn new(lexicon: Arc<dyn LexiconBackend>, config: &EngineConfig) -> Self {
        Self {
            aggregator: SentimentAggregator::new(Arc::clone(&lexicon))
                .with_lookup_concurrency(config.lookup_concurrency),
            lexicon,
            tracker: Arc::new(SessionTracker::new()),
        }
    }

    pub fn tracker(&self) -> &Arc<SessionTracker> {
        &self.tracker
    }

    /// Dispatch one message. Only a heartbeat can produce a reply.
    pub fn handle(&self, message: InboundMessage) -> Option<OutboundMessage> {
        match message {
            InboundMessage::ComputeSentiment { session_id, items } => {
                self.compute(session_id, items);
                None
            }
            InboundMessage::Heartbeat => self.heartbeat(),
        }
    }

    /// Start scoring `items` for `session_id` unless a computation is already
    /// running for it, in which case the request is dropped and `None` returned.
    pub fn compute(&self, session_id: SessionId, items: Vec<String>) -> Option<JoinHandle<Result<f64>>> {
        let guard = self.tracker.begin(&session_id)?;
        let aggregator = self.aggregator.clone();

        Some(tokio::spawn(async move {
            match aggregator.analyze(items.as_slice()).await {
                Ok(breakdown) => {
                    info!(
                        "Sentiment for session {}: {:.4} ({} tokens)",
                        guard.session(),
                        breakdown.score,
                        breakdown.token_count
                    );
                    guard.complete(breakdown.score);
                    Ok(breakdown.score)
                }
                Err(e) => {
                    // guard drops here and releases the session
                    error!("Sentiment analysis failed for session {}: {}", guard.session(), e);
                    Err(e)
                }
            }
        }))
    }

    /// Latest score per session, if any exist.
    pub fn heartbeat(&self) -> Option<OutboundMessage> {
        let scores = self.scores();
        debug!("Heartbeat received, {} scores available", scores.len());
        if scores.is_empty() {
            return None;
        }
        Some(OutboundMessage::SentimentResult { scores })
    }

    pub fn scores(&self) -> BTreeMap<SessionId, f64> {
        self.tracker.scores()
    }

    /// Drive the service from a message channel until the sender side closes.
    pub fn spawn_worker(
        self: Arc<Self>,
        inbound: mpsc::UnboundedReceiver<InboundMessage>,
        outbound: mpsc::UnboundedSender<OutboundMessage>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Sentiment service worker started with {} lexicon entries",
                self.lexicon.entry_count().await
            );
            let mut messages = UnboundedReceiverStream::new(inbound);

            while let Some(message) = messages.next().await {
                if let Some(reply) = self.handle(message) {
                    if let Err(e) = outbound.send(reply) {
                        warn!("Failed to deliver sentiment result: {}", e);
                        break;
                    }
                }
            }

            info!("Sentiment service worker stopped");
        })
    }
}
