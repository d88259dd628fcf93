use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity stamped onto every message the local user sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub sender_id: String,
    pub sender_name: String,
    pub avatar_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: EntryId,
    pub sender_id: String,
    pub sender_name: String,
    pub avatar_id: String,
    pub text: String,
    pub timestamp: String,
    pub is_self: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_count: Option<u32>,
}

impl ChatMessage {
    /// A fresh message from the local user.
    pub fn authored(author: &Author, text: &str, timestamp: String) -> Self {
        Self {
            id: EntryId::new(),
            sender_id: author.sender_id.clone(),
            sender_name: author.sender_name.clone(),
            avatar_id: author.avatar_id.clone(),
            text: text.to_string(),
            timestamp,
            is_self: true,
            read_count: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryState {
    Pending,
    Resolved,
}

/// Card slot for an assistant reply. Starts pending and is resolved at most once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub id: EntryId,
    state: SummaryState,
    payload: Option<TripSummary>,
    pub time: String,
}

impl SummaryEntry {
    pub fn pending(time: String) -> Self {
        Self {
            id: EntryId::new(),
            state: SummaryState::Pending,
            payload: None,
            time,
        }
    }

    pub fn state(&self) -> SummaryState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == SummaryState::Pending
    }

    pub fn payload(&self) -> Option<&TripSummary> {
        self.payload.as_ref()
    }

    /// Attaches the summary. Returns false if the entry was already resolved.
    pub fn resolve(&mut self, summary: TripSummary, time: String) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.state = SummaryState::Resolved;
        self.payload = Some(summary);
        self.time = time;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThreadEntry {
    Text(ChatMessage),
    Summary(SummaryEntry),
}

impl ThreadEntry {
    pub fn id(&self) -> &EntryId {
        match self {
            ThreadEntry::Text(msg) => &msg.id,
            ThreadEntry::Summary(entry) => &entry.id,
        }
    }

    pub fn as_message(&self) -> Option<&ChatMessage> {
        match self {
            ThreadEntry::Text(msg) => Some(msg),
            ThreadEntry::Summary(_) => None,
        }
    }

    pub fn as_summary(&self) -> Option<&SummaryEntry> {
        match self {
            ThreadEntry::Summary(entry) => Some(entry),
            ThreadEntry::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub confirmed_itinerary: Vec<String>,
    pub estimated_budget: String,
    pub pending_items: Vec<String>,
    pub booking_cards: Vec<BookingCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingCategory {
    Flight,
    Hotel,
    Restaurant,
    Experience,
}

impl BookingCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Hotel => "hotel",
            Self::Restaurant => "restaurant",
            Self::Experience => "experience",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingAction {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingCard {
    pub category: BookingCategory,
    pub title: String,
    /// 0 means the category carries no rating (flights), not a zero score.
    pub rating: f32,
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub actions: Vec<BookingAction>,
}

impl BookingCard {
    pub fn has_rating(&self) -> bool {
        self.rating > 0.0
    }

    pub fn primary_action(&self) -> Option<&BookingAction> {
        self.actions.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> TripSummary {
        TripSummary {
            confirmed_itinerary: vec!["x".into()],
            estimated_budget: "b".into(),
            pending_items: vec!["y".into()],
            booking_cards: Vec::new(),
        }
    }

    #[test]
    fn pending_entry_has_no_payload() {
        let entry = SummaryEntry::pending("10:00 AM".into());
        assert_eq!(entry.state(), SummaryState::Pending);
        assert!(entry.payload().is_none());
    }

    #[test]
    fn resolve_happens_once() {
        let mut entry = SummaryEntry::pending("10:00 AM".into());
        let id = entry.id.clone();
        assert!(entry.resolve(sample_summary(), "10:01 AM".into()));
        assert_eq!(entry.id, id);
        assert_eq!(entry.time, "10:01 AM");
        assert_eq!(entry.state(), SummaryState::Resolved);

        let mut other = sample_summary();
        other.estimated_budget = "changed".into();
        assert!(!entry.resolve(other, "10:02 AM".into()));
        assert_eq!(entry.payload().unwrap().estimated_budget, "b");
        assert_eq!(entry.time, "10:01 AM");
    }

    #[test]
    fn thread_entry_serializes_with_type_tag() {
        let author = Author {
            sender_id: "me".into(),
            sender_name: "Me".into(),
            avatar_id: "Me".into(),
        };
        let msg = ChatMessage::authored(&author, "hi", "10:00 AM".into());
        let json = serde_json::to_value(ThreadEntry::Text(msg)).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["is_self"], true);
        assert!(json.get("read_count").is_none());

        let entry = SummaryEntry::pending("10:00 AM".into());
        let json = serde_json::to_value(ThreadEntry::Summary(entry)).unwrap();
        assert_eq!(json["type"], "summary");
        assert_eq!(json["state"], "pending");
        assert!(json["payload"].is_null());
    }

    #[test]
    fn flight_card_reports_no_rating() {
        let card = BookingCard {
            category: BookingCategory::Flight,
            title: "TPE ⇌ NRT".into(),
            rating: 0.0,
            price: "NT$ 7,887 起".into(),
            image_url: None,
            actions: vec![BookingAction {
                label: "查看航班".into(),
                url: "https://example.invalid".into(),
            }],
        };
        assert!(!card.has_rating());
        assert_eq!(card.primary_action().unwrap().label, "查看航班");
    }
}
