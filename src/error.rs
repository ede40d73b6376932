//! Error types for the site wizard.

use std::time::Duration;

use crate::wizard::{AnswerMode, FieldKey, GenerationState};

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Errors raised by the wizard engine and its lifecycle.
///
/// Every rejection leaves the session exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Answer for {got} does not match the pending question ({expected})")]
    InvalidAnswerKey { expected: FieldKey, got: FieldKey },

    #[error("Select at least one option before continuing")]
    EmptyMultiChoice,

    #[error("No question is waiting for an answer")]
    NoPendingQuestion,

    #[error("Question {key} expects a {expected} answer")]
    AnswerModeMismatch { key: FieldKey, expected: AnswerMode },

    #[error("{choice:?} is not an option for {key}")]
    UnknownChoice { key: FieldKey, choice: String },

    #[error("Question {key} is not multi-choice")]
    NotMultiChoice { key: FieldKey },

    #[error("Cannot transition generation from {from} to {to}")]
    InvalidTransition {
        from: GenerationState,
        to: GenerationState,
    },

    #[error("Website generation failed: {reason}")]
    GenerationFailed { reason: String },

    #[error("No generated website is available")]
    NoArtifact,
}

/// Artifact export errors.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Invalid artifact file name: {0:?}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the wizard.
pub type Result<T> = std::result::Result<T, Error>;
