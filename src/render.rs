use std::fmt::Write as _;

use crate::schema::{BookingCard, ChatMessage, SummaryEntry, ThreadEntry, TripSummary};

pub const ASSISTANT_NAME: &str = "旅遊助手";

pub trait Renderer {
    fn render_message(&self, msg: &ChatMessage) -> String;
    fn render_summary(&self, entry: &SummaryEntry) -> String;

    fn render_entry(&self, entry: &ThreadEntry) -> String {
        match entry {
            ThreadEntry::Text(msg) => self.render_message(msg),
            ThreadEntry::Summary(summary) => self.render_summary(summary),
        }
    }

    fn render(&self, entries: &[ThreadEntry]) -> String {
        entries
            .iter()
            .map(|entry| self.render_entry(entry))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Terminal rendering of the thread. Pending cards show a typing line,
/// resolved cards the four summary sections.
#[derive(Debug, Default, Clone)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render_message(&self, msg: &ChatMessage) -> String {
        if msg.is_self {
            match msg.read_count {
                Some(count) => format!("  » {} [已讀 {count}] [{}]", msg.text, msg.timestamp),
                None => format!("  » {} [{}]", msg.text, msg.timestamp),
            }
        } else {
            format!("[{}] {}: {}", msg.timestamp, msg.sender_name, msg.text)
        }
    }

    fn render_summary(&self, entry: &SummaryEntry) -> String {
        match entry.payload() {
            None => format!("[{}] {ASSISTANT_NAME}處理中...", entry.time),
            Some(summary) => format!("[{}] {ASSISTANT_NAME}:\n{}", entry.time, summary_card(summary)),
        }
    }
}

fn summary_card(summary: &TripSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  ┌ AI SUMMARY · 日本旅遊行程重點摘要");

    let _ = writeln!(out, "  │ 【確認行程】");
    for item in &summary.confirmed_itinerary {
        let _ = writeln!(out, "  │   • {item}");
    }

    let _ = writeln!(out, "  │ 【預算預估】");
    let _ = writeln!(out, "  │   {}", summary.estimated_budget);

    let _ = writeln!(out, "  │ 【待定事項/討論】");
    for item in &summary.pending_items {
        let _ = writeln!(out, "  │   • {item}");
    }

    if !summary.booking_cards.is_empty() {
        let _ = writeln!(out, "  │ 【推薦預訂】");
        for card in &summary.booking_cards {
            out.push_str(&booking_line(card));
        }
    }

    out.push_str("  └");
    out
}

fn booking_line(card: &BookingCard) -> String {
    let mut out = String::new();
    let _ = write!(out, "  │   [{}] {}", card.category.as_str(), card.title);
    if card.has_rating() {
        let _ = write!(out, " ★{:.1}", card.rating);
    }
    let _ = writeln!(out, " · {}", card.price);
    if let Some(url) = &card.image_url {
        let _ = writeln!(out, "  │     🖼 {url}");
    }

    for (i, action) in card.actions.iter().enumerate() {
        let marker = if i == 0 { "▶" } else { "·" };
        let _ = writeln!(out, "  │     {marker} {}: {}", action.label, action.url);
    }
    out
}
