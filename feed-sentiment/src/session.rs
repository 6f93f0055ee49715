use crate::types::SessionId;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Per-session bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub in_progress: bool,
    pub last_score: Option<f64>,
    pub last_completed_at: Option<DateTime<Utc>>,
    /// Identifies the computation that set `in_progress`; bumped on every begin.
    pub run: u64,
}

/// Single-flight coordinator: at most one computation per session at a time.
///
/// Sessions are created on first reference and live until [`discard`](Self::discard).
#[derive(Debug, Default)]
pub struct SessionTracker {
    sessions: Mutex<HashMap<SessionId, SessionState>>,
    next_run: AtomicU64,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, SessionState>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move `session` to in-progress. Returns `false`, changing nothing, when a
    /// computation is already running for it.
    pub fn begin_if_idle(&self, session: &SessionId) -> bool {
        self.try_begin(session).is_some()
    }

    fn try_begin(&self, session: &SessionId) -> Option<u64> {
        let mut sessions = self.sessions();
        let state = sessions.entry(session.clone()).or_default();
        if state.in_progress {
            info!("Sentiment analysis already in progress for session {}, ignoring request", session);
            return None;
        }
        state.in_progress = true;
        state.run = self.next_run.fetch_add(1, Ordering::Relaxed) + 1;
        Some(state.run)
    }

    /// Guarded variant of [`begin_if_idle`](Self::begin_if_idle): the session is
    /// released when the guard drops, whether or not a score was recorded.
    pub fn begin(self: &Arc<Self>, session: &SessionId) -> Option<SessionGuard> {
        let run = self.try_begin(session)?;
        Some(SessionGuard {
            tracker: Arc::clone(self),
            session: session.clone(),
            run,
            finished: false,
        })
    }

    /// Record `score` and return the session to idle. A score arriving for a
    /// session discarded in the meantime is dropped.
    pub fn complete(&self, session: &SessionId, score: f64) {
        self.finish(session, None, Some(score));
    }

    /// Return the session to idle without touching its last score.
    pub fn fail(&self, session: &SessionId) {
        self.finish(session, None, None);
    }

    /// Shared exit path. With `run` set, only that computation may release the
    /// session; a stale run (the session was discarded and begun again) is a no-op.
    fn finish(&self, session: &SessionId, run: Option<u64>, score: Option<f64>) {
        let mut sessions = self.sessions();
        let state = match sessions.get_mut(session) {
            Some(state) => state,
            None => {
                debug!("Dropping result for discarded session {}", session);
                return;
            }
        };
        if run.is_some_and(|run| run != state.run) {
            debug!("Ignoring result of a superseded run for session {}", session);
            return;
        }

        state.in_progress = false;
        if let Some(score) = score {
            state.last_score = Some(score);
            state.last_completed_at = Some(Utc::now());
            debug!("Session {} scored {}", session, score);
        }
    }

    pub fn is_in_progress(&self, session: &SessionId) -> bool {
        self.sessions()
            .get(session)
            .is_some_and(|state| state.in_progress)
    }

    pub fn latest(&self, session: &SessionId) -> Option<f64> {
        self.sessions().get(session).and_then(|state| state.last_score)
    }

    pub fn state(&self, session: &SessionId) -> Option<SessionState> {
        self.sessions().get(session).cloned()
    }

    /// Every session with a recorded score.
    pub fn scores(&self) -> BTreeMap<SessionId, f64> {
        self.sessions()
            .iter()
            .filter_map(|(id, state)| state.last_score.map(|score| (id.clone(), score)))
            .collect()
    }

    /// Every session seen so far, sorted.
    pub fn active_sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Forget a session, e.g. once its source has closed.
    pub fn discard(&self, session: &SessionId) -> bool {
        let removed = self.sessions().remove(session).is_some();
        if removed {
            debug!("Discarded session {}", session);
        }
        removed
    }
}

/// Holds a session in progress. Dropping without [`complete`](Self::complete)
/// releases it with no score.
#[derive(Debug)]
pub struct SessionGuard {
    tracker: Arc<SessionTracker>,
    session: SessionId,
    run: u64,
    finished: bool,
}

impl SessionGuard {
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn complete(mut self, score: f64) {
        self.tracker.finish(&self.session, Some(self.run), Some(score));
        self.finished = true;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.tracker.finish(&self.session, Some(self.run), None);
        }
    }
}
