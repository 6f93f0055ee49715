use crate::collection::ItemCollection;
use crate::scanner::{ExtractionScanner, ScanReport};
use crate::types::{ContentFeed, EngineConfig, InboundMessage, Result, SentimentError, SessionId};
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Reads a feed on a fast tick and periodically forwards the collected items
/// for scoring.
///
/// Both ticks run inside one task, so the collection has a single owner and
/// needs no lock. The two cadences stay independent: extraction keeps the
/// collection fresh, flushing only samples it.
pub struct ExtractionPipeline {
    session_id: SessionId,
    config: EngineConfig,
    report_sender: Option<mpsc::UnboundedSender<ScanReport>>,
    /// Stop signal of the current run; each run gets its own channel.
    stop_sender: RwLock<Option<watch::Sender<bool>>>,
}

impl ExtractionPipeline {
    pub fn new(session_id: SessionId, config: EngineConfig) -> Self {
        Self {
            session_id,
            config,
            report_sender: None,
            stop_sender: RwLock::new(None),
        }
    }

    /// Receive a report for every tick that collected something.
    pub fn with_report_sender(mut self, sender: mpsc::UnboundedSender<ScanReport>) -> Self {
        self.report_sender = Some(sender);
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub async fn is_running(&self) -> bool {
        self.stop_sender
            .read()
            .await
            .as_ref()
            .is_some_and(|sender| !sender.is_closed() && !*sender.borrow())
    }

    /// Spawn the extraction loop. The handle resolves to the final collection
    /// once the pipeline is stopped or the request channel closes.
    pub async fn start<F>(
        &self,
        mut feed: F,
        request_sender: mpsc::UnboundedSender<InboundMessage>,
    ) -> Result<JoinHandle<ItemCollection>>
    where
        F: ContentFeed + 'static,
    {
        let mut current = self.stop_sender.write().await;
        if current.as_ref().is_some_and(|sender| !sender.is_closed()) {
            return Err(SentimentError::General(format!(
                "Extraction already running for session {}",
                self.session_id
            )));
        }
        let (stop_sender, mut stop_receiver) = watch::channel(false);
        *current = Some(stop_sender);
        drop(current);

        let session_id = self.session_id.clone();
        let config = self.config.clone();
        let report_sender = self.report_sender.clone();

        info!(
            "Starting extraction for session {} (extract every {}ms, flush every {}ms)",
            session_id, config.extraction_interval_ms, config.flush_interval_ms
        );

        Ok(tokio::spawn(async move {
            let scanner = ExtractionScanner::new();
            let mut collection = ItemCollection::with_signature_len(config.signature_len);

            let mut extract_tick = interval(Duration::from_millis(config.extraction_interval_ms.max(1)));
            let mut flush_tick = interval(Duration::from_millis(config.flush_interval_ms.max(1)));
            extract_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            flush_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = stop_receiver.changed() => break,

                    _ = extract_tick.tick() => {
                        let report = scanner.tick(&mut feed, &mut collection);
                        if let Some(sender) = &report_sender {
                            if !report.is_quiet() && sender.send(report).is_err() {
                                debug!("Scan report receiver dropped for session {}", session_id);
                            }
                        }
                    }

                    _ = flush_tick.tick() => {
                        if collection.is_empty() {
                            continue;
                        }
                        let request = InboundMessage::ComputeSentiment {
                            session_id: session_id.clone(),
                            items: collection.snapshot(),
                        };
                        if request_sender.send(request).is_err() {
                            warn!("Sentiment request channel closed, stopping extraction for session {}", session_id);
                            break;
                        }
                    }
                }
            }

            info!("Extraction stopped for session {} with {} items", session_id, collection.len());
            collection
        }))
    }

    /// Ask the loop to stop after its current tick.
    pub async fn stop(&self) {
        if let Some(sender) = self.stop_sender.write().await.take() {
            // the loop may already have exited on its own
            let _ = sender.send(true);
        }
        info!("Stopping extraction for session {}", self.session_id);
    }
}
