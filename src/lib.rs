//! Anketa bot — Telegram questionnaire intake.

pub mod channels;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod flow;
