use chrono::{DateTime, Local};

use crate::core::i18n::Language;
use crate::core::providers::ProviderId;

/// Who a transcript entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Assistant(ProviderId),
    System,
    Error,
}

impl Sender {
    pub fn display_name(self, language: Language) -> &'static str {
        let strings = language.strings();
        match self {
            Sender::User => strings.you,
            Sender::Assistant(provider) => provider.display_name(),
            Sender::System => strings.system,
            Sender::Error => strings.error_sender,
        }
    }

    pub fn is_assistant(self) -> bool {
        matches!(self, Sender::Assistant(_))
    }
}

/// One transcript entry. Never edited after it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Local::now(),
        }
    }

    pub fn with_timestamp(
        sender: Sender,
        text: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp,
        }
    }

    /// `[HH:MM:SS] Name: `
    pub fn header(&self, language: Language) -> String {
        format!(
            "[{}] {}: ",
            self.timestamp.format("%H:%M:%S"),
            self.sender.display_name(language)
        )
    }
}

/// Ordered messages of one session.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
