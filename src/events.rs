use serde::Serialize;

use crate::schema::{ChatMessage, EntryId, SummaryEntry};

/// One notification per store mutation, published after the mutation lands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", content = "payload", rename_all = "snake_case")]
pub enum ThreadEvent {
    MessageAppended(ChatMessage),
    PlaceholderInserted(SummaryEntry),
    SummaryResolved(SummaryEntry),
    PlaceholderRemoved { id: EntryId },
}

impl ThreadEvent {
    pub fn entry_id(&self) -> &EntryId {
        match self {
            ThreadEvent::MessageAppended(msg) => &msg.id,
            ThreadEvent::PlaceholderInserted(entry) | ThreadEvent::SummaryResolved(entry) => &entry.id,
            ThreadEvent::PlaceholderRemoved { id } => id,
        }
    }
}

// Events buffered per subscriber before the slowest one starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_event_serializes_id_only() {
        let event = ThreadEvent::PlaceholderRemoved { id: EntryId::from("abc") };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "placeholder_removed");
        assert_eq!(json["payload"]["id"], "abc");
        assert_eq!(event.entry_id().as_str(), "abc");
    }

    #[test]
    fn placeholder_event_carries_entry() {
        let entry = SummaryEntry::pending("10:00 AM".into());
        let id = entry.id.clone();
        let event = ThreadEvent::PlaceholderInserted(entry);
        assert_eq!(event.entry_id(), &id);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["payload"]["state"], "pending");
    }
}
