use crate::schema::{ChatMessage, EntryId};

fn message(
    id: &str,
    (sender_name, sender_id, avatar_id): (&str, &str, &str),
    text: &str,
    timestamp: &str,
) -> ChatMessage {
    ChatMessage {
        id: EntryId::from(id),
        sender_id: sender_id.to_string(),
        sender_name: sender_name.to_string(),
        avatar_id: avatar_id.to_string(),
        text: text.to_string(),
        timestamp: timestamp.to_string(),
        is_self: false,
        read_count: None,
    }
}

/// Group chat the demo thread opens with: five friends planning a Japan trip.
pub fn demo_conversation() -> Vec<ChatMessage> {
    let alicia = ("Alicia", "u1", "A");
    let spencer = ("Spencer", "u2", "S");
    let wen = ("Wen", "u3", "W");

    let mut own = message(
        "msg-3",
        ("Me", "me", "Me"),
        "好耶！滑雪不錯，但我其實也滿想去河口湖看富士山的 ⛰️",
        "10:05 AM",
    );
    own.is_self = true;
    own.read_count = Some(3);

    vec![
        message("msg-1", alicia, "大家，下個月去日本旅遊要不要先確定一下要去哪？", "10:00 AM"),
        message("msg-2", spencer, "我超想去越後湯澤滑雪！聽說那邊的雪質很好 ❄️", "10:02 AM"),
        own,
        message("msg-4", alicia, "可是我不會滑雪耶，如果去滑雪的話，我可能只能在附近逛街 😅", "10:08 AM"),
        message("msg-5", wen, "那晚餐可不可以安排去吃好一點的燒肉？我想吃和牛", "10:11 AM"),
        message("msg-6", spencer, "好啊，那不然用AI助手整理一下現在大家的想法？", "10:13 AM"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ITINERARY_CONFLICT, FIND_YAKINIKU};
    use crate::schema::BookingCategory;
    use crate::summarizer::RuleSummarizer;

    #[test]
    fn only_own_message_has_read_count() {
        let msgs = demo_conversation();
        assert_eq!(msgs.len(), 6);
        for msg in &msgs {
            assert_eq!(msg.read_count.is_some(), msg.is_self);
        }
    }

    #[test]
    fn demo_thread_exercises_every_rule() {
        let summary = RuleSummarizer::extract(&demo_conversation());
        assert_eq!(summary.confirmed_itinerary.len(), 2);
        assert_eq!(
            summary.pending_items,
            vec![ITINERARY_CONFLICT.to_string(), FIND_YAKINIKU.to_string()]
        );
        let categories: Vec<_> = summary.booking_cards.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            vec![
                BookingCategory::Hotel,
                BookingCategory::Experience,
                BookingCategory::Restaurant,
                BookingCategory::Flight
            ]
        );
    }
}
