//! Questionnaire flow — the per-user state machine and its derived report.

pub mod questions;
pub mod report;
pub mod sequencer;
pub mod session;

pub use questions::{PHOTO_STEP, QUESTIONS, USERNAME_STEP, keyboard_for};
pub use report::Report;
pub use sequencer::{Effect, Event, Sequencer};
pub use session::{Session, SessionState};
