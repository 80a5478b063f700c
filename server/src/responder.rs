use concierge_core::model::{ContentCard, Message, Role};
use rand::seq::IndexedRandom;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub cards: Vec<ContentCard>,
}

impl ChatReply {
    fn text(message: impl Into<String>) -> Self { Self { message: message.into(), cards: Vec::new() } }
}

/// Produces the assistant's reply from the conversation so far and the
/// knowledge-base snippets the retrieval index picked for the last message.
pub trait Responder: Send + Sync {
    fn respond(&self, history: &[Message], context: &[String]) -> ChatReply;
}

const GREETINGS: &[&str] = &[
    "Hello! I'm your Digital Concierge. How can I assist you today?",
    "Welcome! I'm here to help with any questions about our services.",
    "Good day! How may I help you with your stay?",
];

pub const DEFAULT_REPLY: &str =
    "I'd be happy to help! Could you please be more specific about what information you're looking for?";

fn card(id: &str, title: &str, description: &str, icon: &str, color: &str) -> ContentCard {
    ContentCard { id: id.into(), title: title.into(), description: description.into(), icon: icon.into(), color: color.into() }
}

/// Keyword rules checked in order; the first rule with a matching keyword
/// wins. Keywords match as plain substrings of the lowercased message.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedResponder;

impl RuleBasedResponder {
    fn amenities() -> ChatReply {
        ChatReply {
            message: "Here are our available amenities and facilities:".into(),
            cards: vec![
                card("pool", "Indoor Pool", "Open 6 AM - 10 PM daily. Heated pool with poolside service.", "fas fa-swimming-pool", "blue"),
                card("fitness", "Fitness Center", "24/7 access with modern equipment and personal training available.", "fas fa-dumbbell", "green"),
                card("spa", "Spa Services", "Full-service spa open 9 AM - 8 PM. Massages, facials, and wellness treatments.", "fas fa-spa", "purple"),
                card("dining", "Restaurant & Bar", "Fine dining restaurant and rooftop bar with city views.", "fas fa-utensils", "orange"),
            ],
        }
    }

    fn checkin() -> ChatReply {
        ChatReply {
            message: "Here's information about check-in and check-out:".into(),
            cards: vec![
                card("checkin-time", "Check-in Time", "3:00 PM standard check-in. Early check-in available upon request.", "fas fa-clock", "blue"),
                card("checkout-time", "Check-out Time", "11:00 AM standard check-out. Late check-out available for a fee.", "fas fa-sign-out-alt", "red"),
            ],
        }
    }

    fn attractions() -> ChatReply {
        ChatReply {
            message: "Here are popular local attractions near our hotel:".into(),
            cards: vec![
                card("central-park", "Central Park", "Just 0.2 miles away. Perfect for morning walks and outdoor activities.", "fas fa-tree", "green"),
                card("museum", "Metropolitan Museum", "0.5 miles away. World-class art and cultural exhibitions.", "fas fa-university", "purple"),
                card("broadway", "Broadway Theater District", "0.3 miles away. Catch the latest shows and performances.", "fas fa-theater-masks", "yellow"),
            ],
        }
    }

    fn dining() -> ChatReply {
        ChatReply {
            message: "Our room service is available 24/7, and our restaurant serves breakfast (7-11 AM), lunch (12-3 PM), and dinner (6-10 PM).".into(),
            cards: vec![card(
                "room-service",
                "24/7 Room Service",
                "Full menu available around the clock. Call extension 1234 to order.",
                "fas fa-concierge-bell",
                "blue",
            )],
        }
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool { words.iter().any(|w| text.contains(w)) }

impl Responder for RuleBasedResponder {
    fn respond(&self, history: &[Message], context: &[String]) -> ChatReply {
        let last = match history.last() {
            Some(m) if m.role == Role::User => m,
            _ => return ChatReply::text(DEFAULT_REPLY),
        };
        let content = last.content.to_lowercase();

        if contains_any(&content, &["hello", "hi", "hey", "greetings"]) {
            let greeting = GREETINGS.choose(&mut rand::rng()).copied().unwrap_or(GREETINGS[0]);
            return ChatReply::text(greeting);
        }
        if contains_any(&content, &["amenities", "facilities", "services", "what", "available"]) {
            return Self::amenities();
        }
        if contains_any(&content, &["check", "time", "checkin", "checkout"]) {
            return Self::checkin();
        }
        if contains_any(&content, &["attractions", "local", "nearby", "visit", "see", "tourist"]) {
            return Self::attractions();
        }
        if contains_any(&content, &["room service", "dining", "restaurant", "food"]) {
            return Self::dining();
        }
        if let Some(first) = context.first() {
            return ChatReply::text(format!(
                "Based on our hotel information: {first}. Is there anything specific you'd like to know more about?"
            ));
        }
        ChatReply::text(DEFAULT_REPLY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(text: &str) -> Vec<Message> { vec![Message::new(Role::User, text)] }

    #[test]
    fn greets() {
        let reply = RuleBasedResponder.respond(&user("Hello there"), &[]);
        assert!(GREETINGS.contains(&reply.message.as_str()));
        assert!(reply.cards.is_empty());
    }

    #[test]
    fn rules_fire_in_order() {
        let r = RuleBasedResponder;
        assert_eq!(r.respond(&user("Do you offer any amenities?"), &[]).cards.len(), 4);
        assert_eq!(r.respond(&user("When is checkout?"), &[]).cards[1].id, "checkout-time");
        assert_eq!(r.respond(&user("Recommend local attractions"), &[]).cards[0].id, "central-park");
        assert_eq!(r.respond(&user("Is the restaurant open late?"), &[]).cards[0].id, "room-service");
    }

    #[test]
    fn falls_back_to_context_then_default() {
        let r = RuleBasedResponder;
        let ctx = vec!["Valet: Parking is free for guests".to_string()];
        let reply = r.respond(&user("Tell me about parking"), &ctx);
        assert_eq!(
            reply.message,
            "Based on our hotel information: Valet: Parking is free for guests. Is there anything specific you'd like to know more about?"
        );
        assert_eq!(r.respond(&user("Tell me about parking"), &[]).message, DEFAULT_REPLY);
    }

    #[test]
    fn non_user_last_message_gets_default() {
        let history = vec![Message::new(Role::Assistant, "hello")];
        assert_eq!(RuleBasedResponder.respond(&history, &[]).message, DEFAULT_REPLY);
        assert_eq!(RuleBasedResponder.respond(&[], &[]).message, DEFAULT_REPLY);
    }
}
