//! Sequencer — pure event-to-effects reducer for one user's flow.
//!
//! The sequencer holds at most one [`Session`] and turns inbound events
//! into a list of outbound effects. It performs no I/O; the dispatch layer
//! applies the effects through the transport. This keeps every transition
//! of the state machine testable without a network.

use tracing::debug;

use super::questions::{PHOTO_STEP, QUESTIONS, keyboard_for};
use super::report::Report;
use super::session::{Session, SessionState};

/// Greeting sent on /start, before the first question.
pub const GREETING: &str =
    "Assalomu alaykum! Ro‘yxatdan o‘tish uchun kerakli ma’lumotlarni yuboring.";
/// Nag when a text answer is expected but the message carries none.
pub const TEXT_ONLY_NAG: &str = "Iltimos, faqat matn yuboring.";
/// Nag when a photo is expected but the message carries none.
pub const PHOTO_ONLY_NAG: &str = "Iltimos, faqat rasm yuboring.";
/// Acknowledgment after the report has been delivered.
pub const DONE_ACK: &str = "✅ Arizangiz yuborildi. Rahmat!";
/// Acknowledgment after /cancel.
pub const CANCEL_ACK: &str = "❌ Bekor qilindi.";

/// Inbound event for one user, already stripped of transport detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The /start command. Restarts the flow, discarding any prior session.
    Start,
    /// The /cancel command.
    Cancel,
    /// A plain text message.
    Text(String),
    /// A photo message, carrying the transport's file handle.
    Photo(String),
    /// Anything else (sticker, document, voice, ...).
    Unsupported,
}

/// Outbound effect, applied by the dispatch layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Prompt the user. `keyboard: None` removes any previous keyboard.
    SendPrompt {
        text: String,
        keyboard: Option<Vec<Vec<String>>>,
    },
    /// Plain acknowledgment to the user (always removes the keyboard).
    SendAck(String),
    /// Report text for the admin chat.
    SendReport(String),
    /// Forward the applicant's photo to the admin chat.
    ForwardPhoto(String),
}

/// Per-user flow sequencer.
#[derive(Debug, Default)]
pub struct Sequencer {
    session: Option<Session>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session, if one is in flight.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Process one inbound event, returning the effects to apply in order.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Start => self.start(),
            Event::Cancel => self.cancel(),
            Event::Text(text) => self.submit_text(text),
            Event::Photo(file_id) => self.submit_photo(file_id),
            Event::Unsupported => self.wrong_kind(),
        }
    }

    /// /start — discards any in-flight session silently and begins anew.
    fn start(&mut self) -> Vec<Effect> {
        self.session = Some(Session::new());
        vec![Effect::SendAck(GREETING.into()), prompt_for(0)]
    }

    /// /cancel — clears the session and acknowledges, even without one.
    fn cancel(&mut self) -> Vec<Effect> {
        self.session = None;
        vec![Effect::SendAck(CANCEL_ACK.into())]
    }

    fn submit_text(&mut self, text: String) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            // No /start yet; nothing to advance.
            return Vec::new();
        };

        match session.state {
            SessionState::AwaitingAnswer(step) => {
                // record_answer cannot fail here: the state was just matched.
                let new_state = session
                    .record_answer(text)
                    .unwrap_or(SessionState::AwaitingAnswer(step));
                debug!(%new_state, "answer recorded");
                match new_state {
                    SessionState::AwaitingAnswer(next) => vec![prompt_for(next)],
                    SessionState::AwaitingPhoto => vec![prompt_for(PHOTO_STEP)],
                    SessionState::Complete => self.finish(),
                    SessionState::Cancelled => Vec::new(),
                }
            }
            // Text while a photo is expected: nag and re-prompt in place.
            SessionState::AwaitingPhoto => {
                vec![Effect::SendAck(PHOTO_ONLY_NAG.into()), prompt_for(PHOTO_STEP)]
            }
            _ => Vec::new(),
        }
    }

    fn submit_photo(&mut self, file_id: String) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        match session.state {
            SessionState::AwaitingPhoto => {
                if session.record_photo(file_id).is_err() {
                    return Vec::new();
                }
                self.finish()
            }
            // Photo while text is expected: nag and re-prompt in place.
            SessionState::AwaitingAnswer(step) => {
                vec![Effect::SendAck(TEXT_ONLY_NAG.into()), prompt_for(step)]
            }
            _ => Vec::new(),
        }
    }

    /// Non-text, non-photo payload: re-prompt for whatever the step expects.
    fn wrong_kind(&mut self) -> Vec<Effect> {
        match self.session.as_ref().map(|s| s.state) {
            Some(SessionState::AwaitingAnswer(step)) => {
                vec![Effect::SendAck(TEXT_ONLY_NAG.into()), prompt_for(step)]
            }
            Some(SessionState::AwaitingPhoto) => {
                vec![Effect::SendAck(PHOTO_ONLY_NAG.into()), prompt_for(PHOTO_STEP)]
            }
            _ => Vec::new(),
        }
    }

    /// Compose and emit the report, then clear the session.
    fn finish(&mut self) -> Vec<Effect> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        let report = Report::build(&session);
        debug!(id = %report.id, "application complete");

        let mut effects = vec![Effect::SendReport(report.text)];
        if let Some(file_id) = report.photo {
            effects.push(Effect::ForwardPhoto(file_id));
        }
        effects.push(Effect::SendAck(DONE_ACK.into()));
        effects
    }
}

/// Prompt effect for a step, with its keyboard if the step has one.
fn prompt_for(step: usize) -> Effect {
    Effect::SendPrompt {
        text: QUESTIONS[step].to_string(),
        keyboard: keyboard_for(step),
    }
}
