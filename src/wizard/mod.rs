//! Website wizard — a fixed chat-style questionnaire that turns collected
//! preferences into a single generation request.
//!
//! The `Session` aggregate owns all mutable state and applies one action at
//! a time. `WizardEngine` replaces sessions on reset and issues generation
//! tokens; `WizardManager` shares the engine between surfaces and runs the
//! generation call outside the lock.

pub mod engine;
pub mod event;
pub mod generation;
pub mod manager;
pub mod model;
pub mod prompt;
pub mod routes;
pub mod session;
pub mod state;

pub use engine::WizardEngine;
pub use event::{ConversationEvent, EventKind, NoticeKind};
pub use generation::{GenerationClient, GenerationSettings};
pub use manager::WizardManager;
pub use model::{AnswerMode, AnswerValue, Answers, FieldKey, Question, website_questions};
pub use prompt::{synthesize_request, toggle_multi_choice_selection};
pub use routes::{WizardRouteState, wizard_routes};
pub use session::{GenerationTicket, Outcome, Session, SessionAction, SessionSnapshot};
pub use state::GenerationState;
