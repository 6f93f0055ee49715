pub mod types;
pub mod traits;
pub mod collection;
pub mod scanner;
pub mod lexicon;
pub mod sentiment;
pub mod session;
pub mod service;
pub mod pipeline;

pub use types::*;
pub use traits::LexiconBackend;
pub use collection::ItemCollection;
pub use scanner::{ExtractionScanner, ScanReport};
pub use lexicon::{normalize_word, LexiconDataset, LexiconStore};
pub use sentiment::{tokenize, SentimentAggregator, SentimentBreakdown};
pub use session::{SessionGuard, SessionState, SessionTracker};
pub use service::SentimentService;
pub use pipeline::ExtractionPipeline;
