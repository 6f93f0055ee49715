use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier of a logical sentiment session (one per source tab).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<u64> for SessionId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// How the page currently being read is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextMode {
    /// A single conversation; only the root author's posts count.
    Threaded,
    /// A mixed stream of posts from many authors.
    Timeline,
}

/// One text node the host saw on the page during a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCandidate {
    pub content: String,
    pub author: String,
    pub viewport_visible: bool,
    /// Set when the host shows only a teaser and the full text sits behind
    /// an expand control.
    #[serde(default)]
    pub expandable: bool,
}

/// Messages the host layer delivers to the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum InboundMessage {
    #[serde(rename_all = "camelCase")]
    ComputeSentiment {
        session_id: SessionId,
        items: Vec<String>,
    },
    /// A consumer is alive and wants whatever scores exist.
    Heartbeat,
}

/// Messages the core hands back to the host layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OutboundMessage {
    SentimentResult { scores: BTreeMap<SessionId, f64> },
}

/// Polarity counts for one word, as found in the bundled dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCounts {
    #[serde(rename = "Positive")]
    pub positive: u32,
    #[serde(rename = "Negative")]
    pub negative: u32,
}

/// Value shape of the persistent word store, keyed by `word`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconRecord {
    pub word: String,
    #[serde(flatten)]
    pub counts: WordCounts,
}

/// The external feed a scanner reads from on every tick.
///
/// Implementations wrap whatever decides which nodes are candidate text;
/// the core treats them as opaque.
pub trait ContentFeed: Send {
    /// Layout of the page at the moment of the tick.
    fn context_mode(&self) -> ContextMode;

    /// Author of the conversation root, when in a thread.
    fn thread_author(&self) -> Option<String>;

    /// Current batch of candidate nodes.
    fn candidates(&mut self) -> Vec<FeedCandidate>;

    /// Ask the host to open the full text behind a truncated candidate.
    fn request_expand(&mut self, candidate: &FeedCandidate);
}
