use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    metrics::SUMMARY_EXTRACTION_DURATION,
    rules::{extract, scan_buffer},
    schema::{ChatMessage, TripSummary},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("summary extraction failed: {0}")]
    Extraction(String),
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, window: &[ChatMessage]) -> Result<TripSummary, SummarizeError>;
}

/// Keyword-table stand-in for a model call. Sleeps for `latency` before answering
/// so callers see the same await point a real inference request would have.
#[derive(Debug, Clone)]
pub struct RuleSummarizer {
    latency: Duration,
}

impl RuleSummarizer {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn extract(window: &[ChatMessage]) -> TripSummary {
        let buffer = scan_buffer(window.iter().map(|msg| msg.text.as_str()));
        extract(&buffer)
    }
}

impl Default for RuleSummarizer {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

#[async_trait]
impl Summarizer for RuleSummarizer {
    async fn summarize(&self, window: &[ChatMessage]) -> Result<TripSummary, SummarizeError> {
        let _timer = SUMMARY_EXTRACTION_DURATION.start_timer();
        debug!(messages = window.len(), latency_ms = self.latency.as_millis() as u64, "Extracting trip summary");
        tokio::time::sleep(self.latency).await;

        let summary = Self::extract(window);
        info!(
            confirmed = summary.confirmed_itinerary.len(),
            pending = summary.pending_items.len(),
            cards = summary.booking_cards.len(),
            "Generated trip summary"
        );
        Ok(summary)
    }
}
