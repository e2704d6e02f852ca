//! Transport abstraction and wire types for message I/O.

pub mod telegram;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ChannelError;
use crate::flow::Event;

pub use telegram::TelegramChannel;

/// One inbound event, tagged with the chat it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingEvent {
    /// Telegram chat id (also the session key).
    pub chat_id: i64,
    /// Parsed flow event.
    pub event: Event,
}

/// Reply keyboard directive attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    /// Offer fixed-choice buttons, one inner Vec per row.
    Keyboard {
        keyboard: Vec<Vec<String>>,
        resize_keyboard: bool,
    },
    /// Remove any previously offered keyboard.
    Remove { remove_keyboard: bool },
}

impl ReplyMarkup {
    /// Keyboard with the given rows, `Remove` when there are none.
    pub fn from_rows(rows: Option<Vec<Vec<String>>>) -> Self {
        match rows {
            Some(keyboard) => Self::Keyboard {
                keyboard,
                resize_keyboard: true,
            },
            None => Self::remove(),
        }
    }

    pub fn remove() -> Self {
        Self::Remove {
            remove_keyboard: true,
        }
    }
}

/// Stream of inbound events produced by a transport.
pub type EventStream = std::pin::Pin<Box<dyn futures::Stream<Item = IncomingEvent> + Send>>;

/// Message delivery seam between the dispatch layer and the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a text message, optionally with a keyboard directive.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<(), ChannelError>;

    /// Send a previously uploaded photo by its file handle.
    async fn send_photo(&self, chat_id: i64, file_id: &str) -> Result<(), ChannelError>;
}
