use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use super::responder::respond;
use crate::context::SessionContext;

pub const SUGGESTIONS: [&str; 4] = [
    "How does JWT work?",
    "What is @RestController?",
    "Explain useEffect hook",
    "Help me prepare my soutenance",
];

const THINKING_MILLIS: std::ops::RangeInclusive<u64> = 600..=1400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

/// A chat transcript that starts with the bot's greeting.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(first_name: Option<&str>) -> Self {
        let greeting = format!(
            "Hello **{}**! 👋 I'm **UcaBot**, your AI assistant!\n\nI can help you with any question: Spring Boot, React, your project, coding, math, or anything else.\n\nWhat would you like to know?",
            first_name.unwrap_or("there")
        );
        Self {
            messages: vec![ChatMessage::new(ChatRole::Bot, greeting)],
        }
    }

    pub fn for_context(context: &SessionContext) -> Self {
        Self::new(context.user().map(|u| u.first_name.as_str()))
    }

    /// Records the user's message and the bot's answer, returning the answer.
    /// Blank input is ignored.
    pub fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let reply = respond(text, &self.messages);
        self.messages.push(ChatMessage::new(ChatRole::User, text));
        self.messages.push(ChatMessage::new(ChatRole::Bot, reply));
        self.messages.last()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn shows_suggestions(&self) -> bool {
        self.messages.len() <= 1
    }
}

/// Pause a host waits before showing a reply.
pub fn thinking_delay() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(THINKING_MILLIS))
}
