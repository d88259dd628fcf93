pub mod config;
pub mod events;
pub mod metrics;
pub mod render;
pub mod rules;
pub mod schema;
pub mod seed;
pub mod store;
pub mod summarizer;
pub mod thread;
pub mod trigger;

pub use config::Config;
pub use schema::{BookingCard, ChatMessage, EntryId, SummaryEntry, ThreadEntry, TripSummary};
pub use summarizer::{RuleSummarizer, SummarizeError, Summarizer};
pub use thread::{SendReceipt, SummaryOutcome, SummaryTask, ThreadController};
