//! Session aggregate — every mutation goes through [`Session::apply`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::WizardError;

use super::event::{ConversationEvent, EventKind, NoticeKind};
use super::model::{AnswerMode, AnswerValue, Answers, FieldKey, Question};
use super::prompt::{
    GENERATED_MESSAGE, GENERATING_MESSAGE, GENERATION_FAILED_MESSAGE, PROMPT_READY_MESSAGE,
    WELCOME_MESSAGE, synthesize_request, toggle_multi_choice_selection,
};
use super::state::GenerationState;

/// A user or system action applied to a session.
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Post the question at the current index, if any.
    PostNextQuestion,
    /// Answer the pending question.
    SubmitAnswer { key: FieldKey, value: AnswerValue },
    /// Flip one option in the multi-choice staging list.
    ToggleSelection { option: String },
    /// Composing → Pending.
    ConfirmGeneration,
    /// Apply the result of the generation call issued under `token`.
    SettleGeneration {
        token: u64,
        outcome: Result<String, String>,
    },
}

/// Handed out on confirmation; carries everything the in-flight call needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    pub session_id: Uuid,
    pub token: u64,
    pub request: String,
}

/// What an applied action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to do.
    Unchanged,
    /// The question at `index` is now pending.
    QuestionPosed { index: usize },
    /// All questions answered; the request is ready for confirmation.
    Composing,
    /// Multi-choice staging after a toggle.
    Staged(Vec<String>),
    /// Generation confirmed; the call may be issued.
    Pending(GenerationTicket),
    /// The in-flight call settled into this state.
    Settled(GenerationState),
    /// The settlement belonged to a superseded session.
    Discarded,
}

/// One end-to-end run of the wizard.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    token: u64,
    questions: Arc<[Question]>,
    index: usize,
    answers: Answers,
    events: Vec<ConversationEvent>,
    /// Transcript position of the posed, unanswered question.
    open_event: Option<usize>,
    /// Present only while a multi-choice question is pending.
    staging: Option<Vec<String>>,
    state: GenerationState,
    request: Option<String>,
    artifact: Option<String>,
    failure: Option<String>,
}

impl Session {
    /// Begin a session: welcome notice, then the first question.
    pub fn start(token: u64, questions: Arc<[Question]>) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            token,
            questions,
            index: 0,
            answers: Answers::default(),
            events: Vec::new(),
            open_event: None,
            staging: None,
            state: GenerationState::Idle,
            request: None,
            artifact: None,
            failure: None,
        };
        session.push_event(EventKind::notice(NoticeKind::Welcome, WELCOME_MESSAGE));
        session.post_next_question();
        info!(session_id = %session.id, token, "Wizard session started");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Generation token; unique per session within one engine.
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.questions.len()
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn events(&self) -> &[ConversationEvent] {
        &self.events
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn staging(&self) -> Option<&[String]> {
        self.staging.as_deref()
    }

    pub fn request(&self) -> Option<&str> {
        self.request.as_deref()
    }

    pub fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// The posed question waiting for an answer.
    pub fn pending_question(&self) -> Option<&Question> {
        let posed = self.events.get(self.open_event?)?;
        if !posed.is_open_question() {
            return None;
        }
        self.questions.get(self.index)
    }

    /// Apply one action. On error the session is left untouched.
    pub fn apply(&mut self, action: SessionAction) -> Result<Outcome, WizardError> {
        match action {
            SessionAction::PostNextQuestion => Ok(self.post_next_question()),
            SessionAction::SubmitAnswer { key, value } => self.submit_answer(key, value),
            SessionAction::ToggleSelection { option } => self.toggle_selection(&option),
            SessionAction::ConfirmGeneration => self.confirm_generation(),
            SessionAction::SettleGeneration { token, outcome } => self.settle(token, outcome),
        }
    }

    fn push_event(&mut self, kind: EventKind) -> usize {
        let position = self.events.len();
        let event = ConversationEvent::new(position as u32, kind);
        debug!(session_id = %self.id, event_id = event.id, "Event appended");
        self.events.push(event);
        position
    }

    fn transition_to(&mut self, target: GenerationState) -> Result<(), WizardError> {
        if !self.state.can_transition_to(target) {
            return Err(WizardError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }
        info!(
            session_id = %self.id,
            token = self.token,
            from = %self.state,
            to = %target,
            "Generation state changed"
        );
        self.state = target;
        Ok(())
    }

    fn post_next_question(&mut self) -> Outcome {
        if self.open_event.is_some() {
            return Outcome::Unchanged;
        }
        let Some(question) = self.questions.get(self.index) else {
            return Outcome::Unchanged;
        };
        let kind = EventKind::posed(question);
        if question.mode == AnswerMode::MultiChoice {
            self.staging = Some(Vec::new());
        }
        let position = self.push_event(kind);
        self.open_event = Some(position);
        Outcome::QuestionPosed { index: self.index }
    }

    fn pending(&self) -> Result<&Question, WizardError> {
        self.pending_question().ok_or(WizardError::NoPendingQuestion)
    }

    fn submit_answer(&mut self, key: FieldKey, value: AnswerValue) -> Result<Outcome, WizardError> {
        let question = self.pending()?;
        let value = validate_answer(question, key, value)?;

        if let Some(event) = self.open_event.take().and_then(|p| self.events.get_mut(p)) {
            if let EventKind::QuestionPosed { answered, .. } = &mut event.kind {
                *answered = true;
            }
        }
        self.push_event(EventKind::AnswerRecorded {
            key,
            content: value.display_text(),
        });
        self.answers.set(key, value);
        self.staging = None;
        self.index += 1;
        debug!(session_id = %self.id, %key, index = self.index, "Answer recorded");

        if self.is_complete() {
            self.transition_to(GenerationState::Composing)?;
            self.request = Some(synthesize_request(&self.answers));
            self.push_event(EventKind::notice(NoticeKind::PromptReady, PROMPT_READY_MESSAGE));
            Ok(Outcome::Composing)
        } else {
            Ok(self.post_next_question())
        }
    }

    fn toggle_selection(&mut self, option: &str) -> Result<Outcome, WizardError> {
        let question = self.pending()?;
        if question.mode != AnswerMode::MultiChoice {
            return Err(WizardError::NotMultiChoice { key: question.key });
        }
        if !question.offers(option) {
            return Err(WizardError::UnknownChoice {
                key: question.key,
                choice: option.to_string(),
            });
        }
        let staged = toggle_multi_choice_selection(self.staging.as_deref().unwrap_or(&[]), option);
        self.staging = Some(staged.clone());
        Ok(Outcome::Staged(staged))
    }

    fn confirm_generation(&mut self) -> Result<Outcome, WizardError> {
        self.transition_to(GenerationState::Pending)?;
        self.push_event(EventKind::notice(NoticeKind::Generating, GENERATING_MESSAGE));
        let request = self.request.clone().unwrap_or_default();
        Ok(Outcome::Pending(GenerationTicket {
            session_id: self.id,
            token: self.token,
            request,
        }))
    }

    fn settle(&mut self, token: u64, outcome: Result<String, String>) -> Result<Outcome, WizardError> {
        if token != self.token {
            warn!(
                session_id = %self.id,
                current = self.token,
                stale = token,
                "Discarding generation result for a superseded session"
            );
            return Ok(Outcome::Discarded);
        }
        match outcome {
            Ok(html) => {
                self.transition_to(GenerationState::Succeeded)?;
                self.artifact = Some(html);
                self.push_event(EventKind::notice(NoticeKind::Generated, GENERATED_MESSAGE));
                Ok(Outcome::Settled(GenerationState::Succeeded))
            }
            Err(reason) => {
                self.transition_to(GenerationState::Failed)?;
                warn!(session_id = %self.id, token, %reason, "Website generation failed");
                self.failure = Some(reason);
                self.push_event(EventKind::notice(
                    NoticeKind::GenerationFailed,
                    GENERATION_FAILED_MESSAGE,
                ));
                Ok(Outcome::Settled(GenerationState::Failed))
            }
        }
    }

    /// Render-ready view of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            token: self.token,
            state: self.state,
            index: self.index,
            question_count: self.question_count(),
            events: self.events.clone(),
            pending_question: self.pending_question().cloned(),
            staging: self.staging.clone(),
            answers: self.answers.clone(),
            request: self.request.clone(),
            artifact: self.artifact.clone(),
            failure: self.failure.clone(),
        }
    }
}

/// Check an answer against the pending question and normalize it.
fn validate_answer(
    question: &Question,
    key: FieldKey,
    value: AnswerValue,
) -> Result<AnswerValue, WizardError> {
    if key != question.key {
        return Err(WizardError::InvalidAnswerKey {
            expected: question.key,
            got: key,
        });
    }
    let mismatch = || WizardError::AnswerModeMismatch {
        key,
        expected: question.mode,
    };
    let unknown = |choice: &str| WizardError::UnknownChoice {
        key,
        choice: choice.to_string(),
    };

    match (question.mode, value) {
        (AnswerMode::SingleChoice, AnswerValue::Text(choice)) => {
            if !question.offers(&choice) {
                return Err(unknown(&choice));
            }
            Ok(AnswerValue::Text(choice))
        }
        (AnswerMode::MultiChoice, AnswerValue::Choices(choices)) => {
            if choices.is_empty() {
                return Err(WizardError::EmptyMultiChoice);
            }
            let mut selected: Vec<String> = Vec::with_capacity(choices.len());
            for choice in choices {
                if !question.offers(&choice) {
                    return Err(unknown(&choice));
                }
                if !selected.contains(&choice) {
                    selected.push(choice);
                }
            }
            Ok(AnswerValue::Choices(selected))
        }
        (AnswerMode::FreeText, AnswerValue::Text(text)) => Ok(AnswerValue::Text(text.trim().to_string())),
        _ => Err(mismatch()),
    }
}

/// Serializable view handed to rendering surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub token: u64,
    pub state: GenerationState,
    pub index: usize,
    pub question_count: usize,
    pub events: Vec<ConversationEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging: Option<Vec<String>>,
    pub answers: Answers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::model::website_questions;

    fn session() -> Session {
        Session::start(1, website_questions().into())
    }

    fn text(s: &str) -> AnswerValue {
        AnswerValue::Text(s.to_string())
    }

    fn submit(session: &mut Session, key: FieldKey, value: AnswerValue) -> Outcome {
        session
            .apply(SessionAction::SubmitAnswer { key, value })
            .unwrap()
    }

    fn answer_through_style(session: &mut Session) {
        submit(session, FieldKey::BusinessType, text("Restaurant"));
        submit(session, FieldKey::Colors, text("Blue & White"));
        submit(session, FieldKey::Layout, text("Single Page"));
        submit(
            session,
            FieldKey::Sections,
            AnswerValue::Choices(vec!["Hero Section".into(), "Contact Form".into()]),
        );
        submit(session, FieldKey::Style, text("Professional"));
    }

    #[test]
    fn start_posts_welcome_then_first_question() {
        let s = session();
        assert_eq!(s.index(), 0);
        assert_eq!(s.events().len(), 2);
        assert_eq!(s.events()[0].notice(), Some(NoticeKind::Welcome));
        assert!(s.events()[1].is_open_question());
        assert_eq!(s.pending_question().unwrap().key, FieldKey::BusinessType);
        assert_eq!(s.state(), GenerationState::Idle);
        assert!(s.staging().is_none());
    }

    #[test]
    fn post_next_question_does_not_double_post() {
        let mut s = session();
        let outcome = s.apply(SessionAction::PostNextQuestion).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(s.events().len(), 2);
    }

    #[test]
    fn answer_marks_question_and_advances() {
        let mut s = session();
        let outcome = submit(&mut s, FieldKey::BusinessType, text("Blog"));
        assert_eq!(outcome, Outcome::QuestionPosed { index: 1 });
        assert!(!s.events()[1].is_open_question());
        assert_eq!(s.events()[2].content(), "Blog");
        assert_eq!(s.answers().business_type, "Blog");
        assert_eq!(s.pending_question().unwrap().key, FieldKey::Colors);
    }

    #[test]
    fn wrong_key_leaves_session_unchanged() {
        let mut s = session();
        let before = s.snapshot();
        let err = s
            .apply(SessionAction::SubmitAnswer {
                key: FieldKey::Colors,
                value: text("Blue & White"),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            WizardError::InvalidAnswerKey {
                expected: FieldKey::BusinessType,
                got: FieldKey::Colors
            }
        ));
        assert_eq!(s.index(), before.index);
        assert_eq!(s.events().len(), before.events.len());
        assert!(s.answers().is_empty());
    }

    #[test]
    fn mode_and_choice_validation() {
        let mut s = session();
        let err = s
            .apply(SessionAction::SubmitAnswer {
                key: FieldKey::BusinessType,
                value: AnswerValue::Choices(vec!["Blog".into()]),
            })
            .unwrap_err();
        assert!(matches!(err, WizardError::AnswerModeMismatch { .. }));

        let err = s
            .apply(SessionAction::SubmitAnswer {
                key: FieldKey::BusinessType,
                value: text("Bakery"),
            })
            .unwrap_err();
        assert!(matches!(err, WizardError::UnknownChoice { .. }));
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn staging_exists_only_for_multi_choice() {
        let mut s = session();
        submit(&mut s, FieldKey::BusinessType, text("Blog"));
        submit(&mut s, FieldKey::Colors, text("Custom"));
        assert!(s.staging().is_none());

        let err = s
            .apply(SessionAction::ToggleSelection {
                option: "Footer".into(),
            })
            .unwrap_err();
        assert!(matches!(err, WizardError::NotMultiChoice { key: FieldKey::Layout }));

        submit(&mut s, FieldKey::Layout, text("Grid-based"));
        assert_eq!(s.staging(), Some(&[] as &[String]));

        let staged = s
            .apply(SessionAction::ToggleSelection {
                option: "Footer".into(),
            })
            .unwrap();
        assert_eq!(staged, Outcome::Staged(vec!["Footer".to_string()]));

        let before = s.snapshot();
        let err = s
            .apply(SessionAction::SubmitAnswer {
                key: FieldKey::Sections,
                value: AnswerValue::Choices(vec![]),
            })
            .unwrap_err();
        assert!(matches!(err, WizardError::EmptyMultiChoice));
        assert_eq!(s.staging(), Some(&["Footer".to_string()][..]));
        assert_eq!(s.index(), before.index);
        assert_eq!(s.events(), &before.events[..]);
        assert_eq!(s.answers(), &before.answers);
        assert_eq!(s.state(), before.state);

        submit(
            &mut s,
            FieldKey::Sections,
            AnswerValue::Choices(vec!["Footer".into(), "Footer".into(), "About Us".into()]),
        );
        assert!(s.staging().is_none());
        assert_eq!(s.answers().sections, vec!["Footer", "About Us"]);
        assert_eq!(s.events().last().unwrap().kind, EventKind::posed(&website_questions()[4]));
    }

    #[test]
    fn last_answer_moves_to_composing() {
        let mut s = session();
        answer_through_style(&mut s);
        let outcome = submit(&mut s, FieldKey::AdditionalFeatures, text("   "));
        assert_eq!(outcome, Outcome::Composing);
        assert_eq!(s.state(), GenerationState::Composing);
        assert!(s.is_complete());
        assert!(s.pending_question().is_none());
        assert_eq!(s.answers().additional_features, "");
        assert!(s.request().unwrap().contains("None specified"));
        assert_eq!(s.events().last().unwrap().notice(), Some(NoticeKind::PromptReady));

        let err = s
            .apply(SessionAction::SubmitAnswer {
                key: FieldKey::Style,
                value: text("Modern"),
            })
            .unwrap_err();
        assert!(matches!(err, WizardError::NoPendingQuestion));
    }

    #[test]
    fn confirm_requires_composing() {
        let mut s = session();
        let err = s.apply(SessionAction::ConfirmGeneration).unwrap_err();
        assert!(matches!(
            err,
            WizardError::InvalidTransition {
                from: GenerationState::Idle,
                to: GenerationState::Pending
            }
        ));
    }

    #[test]
    fn settle_success_and_stale_token() {
        let mut s = session();
        answer_through_style(&mut s);
        submit(&mut s, FieldKey::AdditionalFeatures, text("Menu page"));

        let Outcome::Pending(ticket) = s.apply(SessionAction::ConfirmGeneration).unwrap() else {
            panic!("expected pending");
        };
        assert_eq!(ticket.token, 1);
        assert_eq!(Some(ticket.request.as_str()), s.request());

        let stale = s
            .apply(SessionAction::SettleGeneration {
                token: 0,
                outcome: Ok("<html></html>".into()),
            })
            .unwrap();
        assert_eq!(stale, Outcome::Discarded);
        assert_eq!(s.state(), GenerationState::Pending);

        let settled = s
            .apply(SessionAction::SettleGeneration {
                token: 1,
                outcome: Ok("<html></html>".into()),
            })
            .unwrap();
        assert_eq!(settled, Outcome::Settled(GenerationState::Succeeded));
        assert_eq!(s.artifact(), Some("<html></html>"));

        // A second settlement for the same attempt is rejected.
        assert!(
            s.apply(SessionAction::SettleGeneration {
                token: 1,
                outcome: Err("late".into()),
            })
            .is_err()
        );
    }

    #[test]
    fn settle_failure_keeps_request() {
        let mut s = session();
        answer_through_style(&mut s);
        submit(&mut s, FieldKey::AdditionalFeatures, text(""));
        s.apply(SessionAction::ConfirmGeneration).unwrap();
        let request = s.request().map(String::from);
        let events_before = s.events().len();

        s.apply(SessionAction::SettleGeneration {
            token: 1,
            outcome: Err("HTTP 500".into()),
        })
        .unwrap();

        assert_eq!(s.state(), GenerationState::Failed);
        assert_eq!(s.request().map(String::from), request);
        assert_eq!(s.events().len(), events_before + 1);
        assert_eq!(s.events().last().unwrap().notice(), Some(NoticeKind::GenerationFailed));
        assert_eq!(s.failure(), Some("HTTP 500"));
        assert!(s.artifact().is_none());
    }
}
