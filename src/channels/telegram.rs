//! Telegram channel — long-polls the Bot API for updates.

use async_trait::async_trait;

use crate::channels::{EventStream, IncomingEvent, ReplyMarkup, Transport};
use crate::error::ChannelError;
use crate::flow::Event;

/// Telegram channel — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.bot_token)
    }

    /// Verify the token against getMe before entering the poll loop.
    pub async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }

    /// Start the getUpdates loop, yielding parsed events as a stream.
    pub fn start(&self) -> EventStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let bot_token = self.bot_token.clone();
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for messages...");

            loop {
                let url = format!("https://api.telegram.org/bot{bot_token}/getUpdates");
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": 30,
                    "allowed_updates": ["message"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                if let Some(results) = data.get("result").and_then(serde_json::Value::as_array) {
                    for update in results {
                        // Advance offset past this update
                        if let Some(uid) =
                            update.get("update_id").and_then(serde_json::Value::as_i64)
                        {
                            offset = uid + 1;
                        }

                        let Some(incoming) = parse_update(update) else {
                            continue;
                        };

                        if tx.send(incoming).is_err() {
                            tracing::info!("Telegram listener channel closed");
                            return;
                        }
                    }
                }
            }
        });

        let stream =
            futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|e| (e, rx)) });

        Box::pin(stream)
    }
}

#[async_trait]
impl Transport for TelegramChannel {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<(), ChannelError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(markup) = markup {
            body["reply_markup"] =
                serde_json::to_value(markup).map_err(|e| ChannelError::InvalidMessage(e.to_string()))?;
        }

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!("sendMessage returned {status}: {err}"),
            });
        }

        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, file_id: &str) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "photo": file_id,
        });

        let resp = self
            .client
            .post(self.api_url("sendPhoto"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!("sendPhoto returned {status}: {err}"),
            });
        }

        tracing::info!("Telegram photo forwarded to {chat_id}");
        Ok(())
    }
}

// ── Update parsing ──────────────────────────────────────────────────

/// Parse one getUpdates entry into a flow event.
///
/// Photos take the largest `PhotoSize` (last in the array). Commands are
/// matched on the first word, so "/start anything" still restarts. Updates
/// without a message or chat id are skipped.
fn parse_update(update: &serde_json::Value) -> Option<IncomingEvent> {
    let message = update.get("message")?;
    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(serde_json::Value::as_i64)?;

    let event = if let Some(photos) = message.get("photo").and_then(serde_json::Value::as_array) {
        let file_id = photos
            .last()
            .and_then(|p| p.get("file_id"))
            .and_then(serde_json::Value::as_str)?;
        Event::Photo(file_id.to_string())
    } else if let Some(text) = message.get("text").and_then(serde_json::Value::as_str) {
        match text.split_whitespace().next() {
            Some("/start") => Event::Start,
            Some("/cancel") => Event::Cancel,
            _ => Event::Text(text.to_string()),
        }
    } else {
        // Sticker, document, voice, ... — the flow only nags about these.
        Event::Unsupported
    };

    Some(IncomingEvent { chat_id, event })
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telegram_api_url() {
        let ch = TelegramChannel::new("123:ABC".into());
        assert_eq!(
            ch.api_url("getMe"),
            "https://api.telegram.org/bot123:ABC/getMe"
        );
        assert_eq!(
            ch.api_url("sendPhoto"),
            "https://api.telegram.org/bot123:ABC/sendPhoto"
        );
    }

    fn update(message: serde_json::Value) -> serde_json::Value {
        serde_json::json!({ "update_id": 7, "message": message })
    }

    #[test]
    fn parse_text_message() {
        let u = update(serde_json::json!({
            "chat": { "id": 42 },
            "text": "Ali Valiyev"
        }));
        assert_eq!(
            parse_update(&u),
            Some(IncomingEvent {
                chat_id: 42,
                event: Event::Text("Ali Valiyev".into())
            })
        );
    }

    #[test]
    fn parse_start_and_cancel_commands() {
        let start = update(serde_json::json!({ "chat": { "id": 1 }, "text": "/start" }));
        assert_eq!(parse_update(&start).unwrap().event, Event::Start);

        let start_args = update(serde_json::json!({ "chat": { "id": 1 }, "text": "/start now" }));
        assert_eq!(parse_update(&start_args).unwrap().event, Event::Start);

        let cancel = update(serde_json::json!({ "chat": { "id": 1 }, "text": "/cancel" }));
        assert_eq!(parse_update(&cancel).unwrap().event, Event::Cancel);
    }

    #[test]
    fn parse_photo_takes_largest_size() {
        let u = update(serde_json::json!({
            "chat": { "id": 9 },
            "photo": [
                { "file_id": "small", "width": 90 },
                { "file_id": "medium", "width": 320 },
                { "file_id": "large", "width": 1280 }
            ]
        }));
        assert_eq!(
            parse_update(&u).unwrap().event,
            Event::Photo("large".into())
        );
    }

    #[test]
    fn parse_photo_with_caption_is_still_a_photo() {
        let u = update(serde_json::json!({
            "chat": { "id": 9 },
            "caption": "me",
            "photo": [ { "file_id": "only" } ]
        }));
        assert_eq!(parse_update(&u).unwrap().event, Event::Photo("only".into()));
    }

    #[test]
    fn parse_other_payloads_as_unsupported() {
        let u = update(serde_json::json!({
            "chat": { "id": 5 },
            "sticker": { "file_id": "stk" }
        }));
        assert_eq!(parse_update(&u).unwrap().event, Event::Unsupported);
    }

    #[test]
    fn parse_skips_updates_without_message_or_chat() {
        let no_message = serde_json::json!({ "update_id": 1 });
        assert_eq!(parse_update(&no_message), None);

        let no_chat = update(serde_json::json!({ "text": "hi" }));
        assert_eq!(parse_update(&no_chat), None);
    }

    // Network error paths (no server behind the fake token).

    #[tokio::test]
    async fn send_message_network_error_surfaces_as_send_failed() {
        let ch = TelegramChannel::new("fake-token".into());
        let result = ch.send_message(1, "hello", Some(ReplyMarkup::remove())).await;
        assert!(matches!(
            result,
            Err(ChannelError::SendFailed { ref name, .. }) if name == "telegram"
        ));
    }

    #[tokio::test]
    async fn send_photo_network_error_surfaces_as_send_failed() {
        let ch = TelegramChannel::new("fake-token".into());
        let result = ch.send_photo(1, "file-id").await;
        assert!(matches!(result, Err(ChannelError::SendFailed { .. })));
    }
}
