use std::fmt::Write as _;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use futures::FutureExt;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    config::{is_valid_time_format, Config, DEFAULT_TIME_FORMAT},
    events::{ThreadEvent, EVENT_CHANNEL_CAPACITY},
    metrics::{
        MESSAGES_SENT, PENDING_SUMMARIES, SENDS_REJECTED, SUMMARIES_FAILED, SUMMARIES_REQUESTED,
        SUMMARIES_RESOLVED, SUMMARY_ROUNDTRIP_DURATION,
    },
    schema::{Author, ChatMessage, EntryId, SummaryEntry, ThreadEntry, TripSummary},
    store::{MessageStore, StoreError},
    summarizer::{SummarizeError, Summarizer},
    trigger::TriggerDetector,
};

#[derive(Debug, Clone)]
struct Clock {
    format: Arc<str>,
}

impl Clock {
    fn new(format: &str) -> Self {
        if is_valid_time_format(format) {
            return Self { format: Arc::from(format) };
        }
        warn!(format, "Unrenderable time format, using {DEFAULT_TIME_FORMAT}");
        Self {
            format: Arc::from(DEFAULT_TIME_FORMAT),
        }
    }

    fn now(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}", Local::now().format(&self.format));
        out
    }
}

#[derive(Debug)]
pub enum SummaryOutcome {
    Resolved(TripSummary),
    /// The placeholder was taken out of the thread.
    Failed(SummarizeError),
}

impl SummaryOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, SummaryOutcome::Resolved(_))
    }
}

/// Handle to an in-flight summary. Dropping it does not cancel the work.
#[derive(Debug)]
pub struct SummaryTask {
    placeholder_id: EntryId,
    handle: JoinHandle<SummaryOutcome>,
}

impl SummaryTask {
    pub fn placeholder_id(&self) -> &EntryId {
        &self.placeholder_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> SummaryOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(placeholder_id = %self.placeholder_id, error = %err, "Summary task did not complete");
                SummaryOutcome::Failed(SummarizeError::Extraction(err.to_string()))
            }
        }
    }
}

#[derive(Debug)]
pub struct SendReceipt {
    pub message_id: EntryId,
    pub summary: Option<SummaryTask>,
}

pub struct ThreadController {
    store: Arc<Mutex<MessageStore>>,
    summarizer: Arc<dyn Summarizer>,
    detector: TriggerDetector,
    author: Author,
    context_window: usize,
    summary_timeout: Option<Duration>,
    clock: Clock,
    events: broadcast::Sender<ThreadEvent>,
}

impl ThreadController {
    pub fn new(cfg: &Config, summarizer: Arc<dyn Summarizer>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store: Arc::new(Mutex::new(MessageStore::new())),
            summarizer,
            detector: TriggerDetector::new(cfg.triggers.iter().cloned()),
            author: cfg.author(),
            context_window: cfg.context_window.max(1),
            summary_timeout: cfg.summary_timeout,
            clock: Clock::new(&cfg.time_format),
            events,
        }
    }

    /// Builds a controller whose thread already holds `history`, oldest first.
    pub fn with_history(
        cfg: &Config,
        summarizer: Arc<dyn Summarizer>,
        history: Vec<ChatMessage>,
    ) -> Result<Self, StoreError> {
        let mut store = MessageStore::new();
        for msg in history {
            store.append(ThreadEntry::Text(msg))?;
        }

        let controller = Self::new(cfg, summarizer);
        info!(messages = store.len(), "Seeded thread history");
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            ..controller
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ThreadEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> Vec<ThreadEntry> {
        self.store.lock().await.snapshot()
    }

    pub async fn pending_summaries(&self) -> usize {
        self.store.lock().await.pending_count()
    }

    /// Appends `text` as a message from the local user. If it addresses the
    /// assistant, a pending summary card is appended in the same step and the
    /// extraction runs on a spawned task.
    ///
    /// Returns `None` for blank input, which leaves the thread untouched.
    pub async fn send(&self, text: &str) -> Option<SendReceipt> {
        if text.trim().is_empty() {
            SENDS_REJECTED.inc();
            debug!("Ignoring blank send");
            return None;
        }

        let message = ChatMessage::authored(&self.author, text, self.clock.now());
        let message_id = message.id.clone();
        let triggered = self.detector.detect(text);

        let mut store = self.store.lock().await;
        let window = triggered.then(|| {
            let mut window = store.recent_messages(self.context_window - 1);
            window.push(message.clone());
            window
        });

        if let Err(err) = store.append(ThreadEntry::Text(message.clone())) {
            error!(error = %err, "Failed to append message");
            return None;
        }
        MESSAGES_SENT.inc();
        publish(&self.events, ThreadEvent::MessageAppended(message));

        let Some(window) = window else {
            return Some(SendReceipt {
                message_id,
                summary: None,
            });
        };

        let placeholder = SummaryEntry::pending(self.clock.now());
        let placeholder_id = placeholder.id.clone();
        if let Err(err) = store.append(ThreadEntry::Summary(placeholder.clone())) {
            error!(error = %err, "Failed to insert summary placeholder");
            return Some(SendReceipt {
                message_id,
                summary: None,
            });
        }
        SUMMARIES_REQUESTED.inc();
        publish(&self.events, ThreadEvent::PlaceholderInserted(placeholder));
        drop(store);

        info!(placeholder_id = %placeholder_id, window = window.len(), "Assistant addressed, summarizing thread");

        let job = SummaryJob {
            store: Arc::clone(&self.store),
            summarizer: Arc::clone(&self.summarizer),
            events: self.events.clone(),
            clock: self.clock.clone(),
            timeout: self.summary_timeout,
            placeholder_id: placeholder_id.clone(),
            window,
        };

        Some(SendReceipt {
            message_id,
            summary: Some(SummaryTask {
                placeholder_id,
                handle: tokio::spawn(job.run()),
            }),
        })
    }
}

fn publish(events: &broadcast::Sender<ThreadEvent>, event: ThreadEvent) {
    // No subscribers is fine; the store is the source of truth.
    let _ = events.send(event);
}

struct SummaryJob {
    store: Arc<Mutex<MessageStore>>,
    summarizer: Arc<dyn Summarizer>,
    events: broadcast::Sender<ThreadEvent>,
    clock: Clock,
    timeout: Option<Duration>,
    placeholder_id: EntryId,
    window: Vec<ChatMessage>,
}

impl SummaryJob {
    async fn run(self) -> SummaryOutcome {
        let _timer = SUMMARY_ROUNDTRIP_DURATION.start_timer();
        PENDING_SUMMARIES.inc();
        let result = self.extract().await;
        PENDING_SUMMARIES.dec();

        let id = &self.placeholder_id;
        let mut store = self.store.lock().await;
        match result {
            Ok(summary) => {
                if !store.resolve(id, summary.clone(), self.clock.now()) {
                    warn!(placeholder_id = %id, "Placeholder is no longer pending, dropping summary");
                    return SummaryOutcome::Failed(SummarizeError::Extraction(format!(
                        "placeholder {id} is no longer pending"
                    )));
                }
                SUMMARIES_RESOLVED.inc();
                info!(placeholder_id = %id, cards = summary.booking_cards.len(), "Summary resolved");
                if let Some(ThreadEntry::Summary(entry)) = store.get(id) {
                    publish(&self.events, ThreadEvent::SummaryResolved(entry.clone()));
                }
                SummaryOutcome::Resolved(summary)
            }
            Err(err) => {
                SUMMARIES_FAILED.inc();
                error!(placeholder_id = %id, error = %err, "Failed to generate summary");
                if store.remove_pending(id).is_some() {
                    publish(&self.events, ThreadEvent::PlaceholderRemoved { id: id.clone() });
                }
                SummaryOutcome::Failed(err)
            }
        }
    }

    async fn extract(&self) -> Result<TripSummary, SummarizeError> {
        let call = AssertUnwindSafe(self.summarizer.summarize(&self.window))
            .catch_unwind()
            .map(|result| {
                result.unwrap_or_else(|_| Err(SummarizeError::Extraction("summarizer panicked".into())))
            });

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                Err(SummarizeError::Extraction(format!(
                    "no summary after {} ms",
                    limit.as_millis()
                )))
            }),
            None => call.await,
        }
    }
}
