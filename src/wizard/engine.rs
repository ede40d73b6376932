//! WizardEngine — owns the current session and hands out generation tokens.

use std::sync::Arc;

use tracing::info;

use crate::error::{LlmError, WizardError};

use super::model::{AnswerValue, FieldKey, Question, website_questions};
use super::session::{GenerationTicket, Outcome, Session, SessionAction};

/// Drives one session at a time over a fixed question list.
///
/// Every session gets a fresh token from a counter that only grows, so a
/// result issued under an old token can never match the current session.
pub struct WizardEngine {
    questions: Arc<[Question]>,
    next_token: u64,
    session: Session,
}

impl WizardEngine {
    /// Create an engine over `questions` and start its first session.
    pub fn new(questions: Vec<Question>) -> Self {
        let questions: Arc<[Question]> = questions.into();
        let session = Session::start(1, Arc::clone(&questions));
        Self {
            questions,
            next_token: 2,
            session,
        }
    }

    /// Engine over the website question catalog.
    pub fn website() -> Self {
        Self::new(website_questions())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replace the current session with a fresh one.
    pub fn start_session(&mut self) -> &Session {
        let token = self.next_token;
        self.next_token += 1;
        self.session = Session::start(token, Arc::clone(&self.questions));
        &self.session
    }

    /// Discard all session state and start over.
    pub fn reset_session(&mut self) -> &Session {
        info!(
            session_id = %self.session.id(),
            state = %self.session.state(),
            "Resetting wizard session"
        );
        self.start_session()
    }

    /// Post the question at the current index; no-op once all are posted.
    pub fn post_next_question(&mut self) -> Outcome {
        self.session
            .apply(SessionAction::PostNextQuestion)
            .unwrap_or(Outcome::Unchanged)
    }

    /// Answer the pending question.
    pub fn submit_answer(
        &mut self,
        key: FieldKey,
        value: impl Into<AnswerValue>,
    ) -> Result<Outcome, WizardError> {
        self.session.apply(SessionAction::SubmitAnswer {
            key,
            value: value.into(),
        })
    }

    /// Toggle an option of the pending multi-choice question.
    pub fn toggle_selection(&mut self, option: &str) -> Result<Vec<String>, WizardError> {
        match self.session.apply(SessionAction::ToggleSelection {
            option: option.to_string(),
        })? {
            Outcome::Staged(staged) => Ok(staged),
            _ => Ok(self.session.staging().map(<[String]>::to_vec).unwrap_or_default()),
        }
    }

    /// Submit the staged selections as the multi-choice answer.
    pub fn submit_selection(&mut self) -> Result<Outcome, WizardError> {
        let key = self
            .session
            .pending_question()
            .map(|q| q.key)
            .ok_or(WizardError::NoPendingQuestion)?;
        let staged = self
            .session
            .staging()
            .ok_or(WizardError::NotMultiChoice { key })?
            .to_vec();
        self.submit_answer(key, AnswerValue::Choices(staged))
    }

    /// Confirm the synthesized request; the caller then issues the call.
    pub fn confirm_generation(&mut self) -> Result<GenerationTicket, WizardError> {
        match self.session.apply(SessionAction::ConfirmGeneration)? {
            Outcome::Pending(ticket) => Ok(ticket),
            _ => Err(WizardError::InvalidTransition {
                from: self.session.state(),
                to: super::GenerationState::Pending,
            }),
        }
    }

    /// Apply the result of the call issued under `token`.
    ///
    /// Results for a superseded session are discarded without touching the
    /// current one.
    pub fn settle_generation(
        &mut self,
        token: u64,
        result: Result<String, LlmError>,
    ) -> Result<Outcome, WizardError> {
        self.session.apply(SessionAction::SettleGeneration {
            token,
            outcome: result.map_err(|e| e.to_string()),
        })
    }
}

impl Default for WizardEngine {
    fn default() -> Self {
        Self::website()
    }
}
