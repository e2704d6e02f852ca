//! Dispatch — routes inbound events to per-user session workers.
//!
//! One worker task per chat id, fed through an mpsc channel: events for
//! different users run concurrently, events for one user strictly in the
//! order received. Session state lives inside the worker, so nothing is
//! shared across users.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::channels::{IncomingEvent, ReplyMarkup, Transport};
use crate::error::ChannelError;
use crate::flow::{Effect, Event, Sequencer};

/// Routes events to per-chat workers, spawning them on first contact.
pub struct Dispatcher<T: Transport + 'static> {
    transport: Arc<T>,
    admin_chat_id: i64,
    workers: HashMap<i64, mpsc::UnboundedSender<Event>>,
    handles: Vec<JoinHandle<()>>,
}

impl<T: Transport + 'static> Dispatcher<T> {
    pub fn new(transport: Arc<T>, admin_chat_id: i64) -> Self {
        Self {
            transport,
            admin_chat_id,
            workers: HashMap::new(),
            handles: Vec::new(),
        }
    }

    /// Hand one event to its chat's worker.
    pub fn dispatch(&mut self, incoming: IncomingEvent) {
        let IncomingEvent { chat_id, event } = incoming;
        let sender = self.workers.entry(chat_id).or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            let transport = Arc::clone(&self.transport);
            let admin = self.admin_chat_id;
            self.handles
                .push(tokio::spawn(session_worker(chat_id, admin, transport, rx)));
            info!(chat_id, "session worker started");
            tx
        });

        // A closed worker only happens at shutdown; drop the event.
        if sender.send(event).is_err() {
            error!(chat_id, "session worker gone, event dropped");
        }
    }

    /// Close all workers and wait for them to drain their queues.
    pub async fn shutdown(mut self) {
        self.workers.clear();
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
    }
}

/// One user's processing loop: sequencer in, effects out.
async fn session_worker<T: Transport>(
    chat_id: i64,
    admin_chat_id: i64,
    transport: Arc<T>,
    mut rx: mpsc::UnboundedReceiver<Event>,
) {
    let mut sequencer = Sequencer::new();

    while let Some(event) = rx.recv().await {
        for effect in sequencer.handle(event) {
            if let Err(e) = apply_effect(&*transport, chat_id, admin_chat_id, effect).await {
                // Best-effort delivery, no retry.
                error!(chat_id, "delivery failed: {e}");
            }
        }
    }
}

/// Apply one sequencer effect through the transport.
pub async fn apply_effect<T: Transport + ?Sized>(
    transport: &T,
    chat_id: i64,
    admin_chat_id: i64,
    effect: Effect,
) -> Result<(), ChannelError> {
    match effect {
        Effect::SendPrompt { text, keyboard } => {
            transport
                .send_message(chat_id, &text, Some(ReplyMarkup::from_rows(keyboard)))
                .await
        }
        Effect::SendAck(text) => {
            transport
                .send_message(chat_id, &text, Some(ReplyMarkup::remove()))
                .await
        }
        Effect::SendReport(text) => transport.send_message(admin_chat_id, &text, None).await,
        Effect::ForwardPhoto(file_id) => transport.send_photo(admin_chat_id, &file_id).await,
    }
}
