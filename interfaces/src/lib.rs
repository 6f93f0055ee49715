pub mod defs;

pub use defs::{
    ContentFeed, ContextMode, FeedCandidate, InboundMessage, LexiconRecord, OutboundMessage,
    SessionId, WordCounts,
};
