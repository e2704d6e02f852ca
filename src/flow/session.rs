//! Session state machine — tracks one user's progress through the form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::questions::PHOTO_STEP;

/// State of one questionnaire session.
///
/// Progresses linearly: AwaitingAnswer(0) → … → AwaitingAnswer(17) →
/// AwaitingPhoto → Complete, with Cancelled reachable from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for a text answer to the given step.
    AwaitingAnswer(usize),
    /// Waiting for the applicant's photo (terminal step of the form).
    AwaitingPhoto,
    /// Report sent, session finished.
    Complete,
    /// Cancelled by the user.
    Cancelled,
}

impl SessionState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        match (*self, target) {
            // Linear advance through the text steps.
            (AwaitingAnswer(i), AwaitingAnswer(j)) => j == i + 1 && j < PHOTO_STEP,
            // The step before the photo step hands over to photo collection.
            (AwaitingAnswer(i), AwaitingPhoto) => i + 1 == PHOTO_STEP,
            (AwaitingPhoto, Complete) => true,
            // Cancel from any non-terminal state.
            (AwaitingAnswer(_), Cancelled) | (AwaitingPhoto, Cancelled) => true,
            _ => false,
        }
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingAnswer(step) => write!(f, "awaiting_answer({step})"),
            Self::AwaitingPhoto => write!(f, "awaiting_photo"),
            Self::Complete => write!(f, "complete"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One user's in-flight questionnaire.
///
/// Created fresh on /start (discarding any prior attempt) and dropped on
/// completion or cancellation. Nothing is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Current position in the flow.
    pub state: SessionState,
    /// Recorded answers, keyed by step index, in question order.
    pub answers: BTreeMap<usize, String>,
    /// Telegram file_id of the uploaded photo, set at the photo step.
    pub photo: Option<String>,
}

impl Session {
    /// Fresh session at step 0.
    pub fn new() -> Self {
        Self {
            state: SessionState::AwaitingAnswer(0),
            answers: BTreeMap::new(),
            photo: None,
        }
    }

    /// Transition to a new state, enforcing the transition table.
    pub fn transition_to(&mut self, target: SessionState) -> Result<(), String> {
        if !self.state.can_transition_to(target) {
            return Err(format!("Cannot transition from {} to {}", self.state, target));
        }
        self.state = target;
        Ok(())
    }

    /// Record a text answer for the current step and advance.
    ///
    /// Returns the new state. Only valid in `AwaitingAnswer`.
    pub fn record_answer(&mut self, text: impl Into<String>) -> Result<SessionState, String> {
        let SessionState::AwaitingAnswer(step) = self.state else {
            return Err(format!("Not awaiting a text answer (state {})", self.state));
        };
        self.answers.insert(step, text.into());

        // The photo step is the last question, so the next step is either
        // another text step or the photo handover.
        let next = step + 1;
        let target = if next == PHOTO_STEP {
            SessionState::AwaitingPhoto
        } else {
            SessionState::AwaitingAnswer(next)
        };
        self.transition_to(target)?;
        Ok(self.state)
    }

    /// Record the photo and complete the form. Only valid in `AwaitingPhoto`.
    pub fn record_photo(&mut self, file_id: impl Into<String>) -> Result<(), String> {
        if self.state != SessionState::AwaitingPhoto {
            return Err(format!("Not awaiting a photo (state {})", self.state));
        }
        self.photo = Some(file_id.into());
        self.transition_to(SessionState::Complete)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use SessionState::*;
        assert!(AwaitingAnswer(0).can_transition_to(AwaitingAnswer(1)));
        assert!(AwaitingAnswer(16).can_transition_to(AwaitingAnswer(17)));
        assert!(AwaitingAnswer(17).can_transition_to(AwaitingPhoto));
        assert!(AwaitingPhoto.can_transition_to(Complete));
        assert!(AwaitingAnswer(5).can_transition_to(Cancelled));
        assert!(AwaitingPhoto.can_transition_to(Cancelled));
    }

    #[test]
    fn invalid_transitions() {
        use SessionState::*;
        // Skip a step
        assert!(!AwaitingAnswer(0).can_transition_to(AwaitingAnswer(2)));
        // Go backward
        assert!(!AwaitingAnswer(3).can_transition_to(AwaitingAnswer(2)));
        // Self-transition
        assert!(!AwaitingAnswer(4).can_transition_to(AwaitingAnswer(4)));
        // Photo before step 17 is answered
        assert!(!AwaitingAnswer(5).can_transition_to(AwaitingPhoto));
        // Complete without a photo step
        assert!(!AwaitingAnswer(17).can_transition_to(Complete));
        // Terminal states stay terminal
        assert!(!Complete.can_transition_to(AwaitingAnswer(0)));
        assert!(!Cancelled.can_transition_to(AwaitingAnswer(0)));
        assert!(!Complete.can_transition_to(Cancelled));
    }

    #[test]
    fn is_terminal() {
        use SessionState::*;
        assert!(Complete.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!AwaitingAnswer(0).is_terminal());
        assert!(!AwaitingPhoto.is_terminal());
    }

    #[test]
    fn record_answer_advances_one_step() {
        let mut session = Session::new();
        for step in 0..PHOTO_STEP {
            assert_eq!(session.state, SessionState::AwaitingAnswer(step));
            let next = session.record_answer(format!("answer {step}")).unwrap();
            if step + 1 == PHOTO_STEP {
                assert_eq!(next, SessionState::AwaitingPhoto);
            } else {
                assert_eq!(next, SessionState::AwaitingAnswer(step + 1));
            }
        }
        for step in 0..PHOTO_STEP {
            assert_eq!(session.answers[&step], format!("answer {step}"));
        }
    }

    #[test]
    fn record_answer_verbatim() {
        let mut session = Session::new();
        session.record_answer("  Ali Valiyev \n").unwrap();
        assert_eq!(session.answers[&0], "  Ali Valiyev \n");
    }

    #[test]
    fn record_photo_completes() {
        let mut session = Session::new();
        for step in 0..PHOTO_STEP {
            session.record_answer(format!("a{step}")).unwrap();
        }
        session.record_photo("file-abc").unwrap();
        assert_eq!(session.state, SessionState::Complete);
        assert_eq!(session.photo.as_deref(), Some("file-abc"));
    }

    #[test]
    fn record_photo_rejected_while_awaiting_answer() {
        let mut session = Session::new();
        assert!(session.record_photo("file-abc").is_err());
        assert!(session.photo.is_none());
    }

    #[test]
    fn record_answer_rejected_while_awaiting_photo() {
        let mut session = Session::new();
        for step in 0..PHOTO_STEP {
            session.record_answer(format!("a{step}")).unwrap();
        }
        assert!(session.record_answer("not a photo").is_err());
        assert_eq!(session.state, SessionState::AwaitingPhoto);
        assert_eq!(session.answers.len(), PHOTO_STEP);
    }

    #[test]
    fn state_display() {
        assert_eq!(SessionState::AwaitingAnswer(3).to_string(), "awaiting_answer(3)");
        assert_eq!(SessionState::AwaitingPhoto.to_string(), "awaiting_photo");
    }

    #[test]
    fn session_serde_roundtrip() {
        let mut session = Session::new();
        session.record_answer("Ali").unwrap();
        let json = serde_json::to_string(&session).unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.state, SessionState::AwaitingAnswer(1));
        assert_eq!(parsed.answers[&0], "Ali");
    }
}
