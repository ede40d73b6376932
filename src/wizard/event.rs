//! Conversation transcript entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{AnswerMode, FieldKey, Question};

/// Why a system notice was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Welcome,
    PromptReady,
    Generating,
    Generated,
    GenerationFailed,
}

/// What happened in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    QuestionPosed {
        question_id: u32,
        key: FieldKey,
        text: String,
        mode: AnswerMode,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<String>,
        /// Flips to true once, when the question is answered.
        answered: bool,
    },
    AnswerRecorded {
        key: FieldKey,
        content: String,
    },
    SystemNotice {
        notice: NoticeKind,
        content: String,
    },
}

/// An append-only transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEvent {
    /// Position in the session transcript, starting at 0.
    pub id: u32,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl ConversationEvent {
    pub(crate) fn new(id: u32, kind: EventKind) -> Self {
        Self {
            id,
            at: Utc::now(),
            kind,
        }
    }

    /// Text shown for this entry.
    pub fn content(&self) -> &str {
        match &self.kind {
            EventKind::QuestionPosed { text, .. } => text,
            EventKind::AnswerRecorded { content, .. } => content,
            EventKind::SystemNotice { content, .. } => content,
        }
    }

    /// The notice kind, if this is a system notice.
    pub fn notice(&self) -> Option<NoticeKind> {
        match self.kind {
            EventKind::SystemNotice { notice, .. } => Some(notice),
            _ => None,
        }
    }

    /// True for a posed question that has not been answered yet.
    pub fn is_open_question(&self) -> bool {
        matches!(self.kind, EventKind::QuestionPosed { answered: false, .. })
    }
}

impl EventKind {
    pub(crate) fn posed(question: &Question) -> Self {
        Self::QuestionPosed {
            question_id: question.id,
            key: question.key,
            text: question.prompt.clone(),
            mode: question.mode,
            choices: question.choices.clone(),
            answered: false,
        }
    }

    pub(crate) fn notice(notice: NoticeKind, content: impl Into<String>) -> Self {
        Self::SystemNotice {
            notice,
            content: content.into(),
        }
    }
}
