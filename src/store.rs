use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::schema::{ChatMessage, EntryId, SummaryEntry, ThreadEntry, TripSummary};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("entry {0} is already in the thread")]
    DuplicateId(EntryId),
}

/// Insertion-ordered thread log.
///
/// Entries live in a map keyed by id; `order` maps a monotonically increasing
/// sequence number back to the id, so removals never shift anything and
/// lookups by id never scan.
#[derive(Debug, Default)]
pub struct MessageStore {
    next_seq: u64,
    order: BTreeMap<u64, EntryId>,
    entries: HashMap<EntryId, (u64, ThreadEntry)>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, entry: ThreadEntry) -> Result<(), StoreError> {
        let id = entry.id().clone();
        if self.entries.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, id.clone());
        self.entries.insert(id, (seq, entry));
        Ok(())
    }

    pub fn get(&self, id: &EntryId) -> Option<&ThreadEntry> {
        self.entries.get(id).map(|(_, entry)| entry)
    }

    /// Resolves the pending summary with this id in place.
    /// Returns false when no pending summary carries the id.
    pub fn resolve(&mut self, id: &EntryId, summary: TripSummary, time: String) -> bool {
        match self.entries.get_mut(id) {
            Some((_, ThreadEntry::Summary(entry))) => entry.resolve(summary, time),
            _ => false,
        }
    }

    /// Drops the summary with this id, but only while it is still pending.
    pub fn remove_pending(&mut self, id: &EntryId) -> Option<SummaryEntry> {
        let is_pending = matches!(
            self.entries.get(id),
            Some((_, ThreadEntry::Summary(entry))) if entry.is_pending()
        );
        if !is_pending {
            return None;
        }

        let (seq, entry) = self.entries.remove(id)?;
        self.order.remove(&seq);
        match entry {
            ThreadEntry::Summary(entry) => Some(entry),
            ThreadEntry::Text(_) => None,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ThreadEntry> + '_ {
        self.order
            .values()
            .filter_map(|id| self.entries.get(id).map(|(_, entry)| entry))
    }

    pub fn snapshot(&self) -> Vec<ThreadEntry> {
        self.iter().cloned().collect()
    }

    /// The last `limit` chat messages in chronological order, summaries skipped.
    pub fn recent_messages(&self, limit: usize) -> Vec<ChatMessage> {
        let mut recent: Vec<ChatMessage> = self
            .iter()
            .rev()
            .filter_map(ThreadEntry::as_message)
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        recent
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|(_, entry)| matches!(entry, ThreadEntry::Summary(s) if s.is_pending()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Author;

    fn author() -> Author {
        Author {
            sender_id: "me".into(),
            sender_name: "Me".into(),
            avatar_id: "Me".into(),
        }
    }

    fn text(body: &str) -> ThreadEntry {
        ThreadEntry::Text(ChatMessage::authored(&author(), body, "10:00 AM".into()))
    }

    fn summary() -> TripSummary {
        TripSummary {
            confirmed_itinerary: vec!["尚未確認具體行程".into()],
            estimated_budget: "TWD 30,000 / 人 (小資方案)".into(),
            pending_items: vec!["無特別待定事項".into()],
            booking_cards: Vec::new(),
        }
    }

    #[test]
    fn keeps_insertion_order() {
        let mut store = MessageStore::new();
        store.append(text("a")).unwrap();
        store.append(ThreadEntry::Summary(SummaryEntry::pending("t".into()))).unwrap();
        store.append(text("b")).unwrap();

        let kinds: Vec<&str> = store
            .iter()
            .map(|e| match e {
                ThreadEntry::Text(m) => m.text.as_str(),
                ThreadEntry::Summary(_) => "<card>",
            })
            .collect();
        assert_eq!(kinds, vec!["a", "<card>", "b"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut store = MessageStore::new();
        let entry = text("a");
        let id = entry.id().clone();
        store.append(entry.clone()).unwrap();
        assert_eq!(store.append(entry), Err(StoreError::DuplicateId(id)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn resolve_targets_only_pending_summaries() {
        let mut store = MessageStore::new();
        let msg = text("a");
        let msg_id = msg.id().clone();
        let placeholder = SummaryEntry::pending("t0".into());
        let placeholder_id = placeholder.id.clone();
        store.append(msg).unwrap();
        store.append(ThreadEntry::Summary(placeholder)).unwrap();

        assert!(!store.resolve(&msg_id, summary(), "t1".into()));
        assert!(store.resolve(&placeholder_id, summary(), "t1".into()));
        assert!(!store.resolve(&placeholder_id, summary(), "t2".into()));

        let resolved = store.get(&placeholder_id).and_then(ThreadEntry::as_summary).unwrap();
        assert_eq!(resolved.time, "t1");
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn remove_pending_leaves_neighbours_alone() {
        let mut store = MessageStore::new();
        store.append(text("a")).unwrap();
        let placeholder = SummaryEntry::pending("t".into());
        let id = placeholder.id.clone();
        store.append(ThreadEntry::Summary(placeholder)).unwrap();
        store.append(text("b")).unwrap();

        let removed = store.remove_pending(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.get(&id).is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(store.recent_messages(10).len(), 2);
        assert!(store.remove_pending(&id).is_none());
    }

    #[test]
    fn resolved_summaries_are_not_removable() {
        let mut store = MessageStore::new();
        let placeholder = SummaryEntry::pending("t".into());
        let id = placeholder.id.clone();
        store.append(ThreadEntry::Summary(placeholder)).unwrap();
        store.resolve(&id, summary(), "t1".into());

        assert!(store.remove_pending(&id).is_none());
        assert!(store.get(&id).is_some());
    }

    #[test]
    fn recent_messages_skips_cards_and_keeps_order() {
        let mut store = MessageStore::new();
        for i in 0..30 {
            store.append(text(&format!("m{i}"))).unwrap();
            if i % 5 == 0 {
                store.append(ThreadEntry::Summary(SummaryEntry::pending("t".into()))).unwrap();
            }
        }

        let recent = store.recent_messages(19);
        assert_eq!(recent.len(), 19);
        assert_eq!(recent.first().unwrap().text, "m11");
        assert_eq!(recent.last().unwrap().text, "m29");
        assert!(store.recent_messages(0).is_empty());
    }
}
