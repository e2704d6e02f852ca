//! Report assembly — the summary sent to the admin chat.

use rand::Rng;

use super::questions::{PHOTO_STEP, QUESTIONS, USERNAME_STEP};
use super::session::Session;

/// Compiled summary of one completed session.
///
/// Derived from the session at finish time, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Application id, e.g. `#48213`. Random, not guaranteed unique.
    pub id: String,
    /// Full report text for the admin chat.
    pub text: String,
    /// Photo to forward after the text, if one was collected.
    pub photo: Option<String>,
}

impl Report {
    /// Build the report with a freshly drawn id.
    pub fn build(session: &Session) -> Self {
        let id = format!("#{}", rand::thread_rng().gen_range(10000..=99999));
        Self::build_with_id(session, id)
    }

    /// Build the report with a caller-supplied id.
    pub fn build_with_id(session: &Session, id: impl Into<String>) -> Self {
        let id = id.into();

        let answers = (0..PHOTO_STEP)
            .map(|step| {
                let answer = session.answers.get(&step).map(String::as_str).unwrap_or("-");
                format!("{} {}", QUESTIONS[step], answer)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let username = session
            .answers
            .get(&USERNAME_STEP)
            .map(String::as_str)
            .unwrap_or("@no_username");

        let photo_line = if session.photo.is_some() {
            "✅ ilova qilingan"
        } else {
            "yo‘q"
        };

        let text = format!(
            "{id} ✅ Yangi ariza:\n\n{answers}\nUsername: {username}\nRasm: {photo_line}"
        );

        Self {
            id,
            text,
            photo: session.photo.clone(),
        }
    }
}
