//! Generation lifecycle state machine.

use serde::{Deserialize, Serialize};

/// Where a session is in its single generation attempt.
///
/// Progresses linearly: Idle → Composing → Pending → Succeeded | Failed.
/// Terminal states are only left by resetting the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    /// Questions are still being answered.
    #[default]
    Idle,
    /// Prompt synthesized, waiting for the user to confirm.
    Composing,
    /// Request in flight.
    Pending,
    /// Artifact received.
    Succeeded,
    /// The generation call did not succeed.
    Failed,
}

impl GenerationState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: GenerationState) -> bool {
        use GenerationState::*;
        matches!(
            (self, target),
            (Idle, Composing) | (Composing, Pending) | (Pending, Succeeded) | (Pending, Failed)
        )
    }

    /// Whether the attempt has settled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for GenerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Composing => "composing",
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}
