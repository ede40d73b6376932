//! WizardManager — shares the engine between surfaces and runs generation
//! calls without holding the session lock.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{Error, WizardError};
use crate::export::ArtifactExporter;

use super::engine::WizardEngine;
use super::generation::GenerationClient;
use super::model::{AnswerValue, FieldKey};
use super::session::{Outcome, SessionSnapshot};
use super::state::GenerationState;

/// Coordinates the wizard engine, the generation client and artifact export.
pub struct WizardManager {
    engine: Arc<RwLock<WizardEngine>>,
    client: Arc<GenerationClient>,
    exporter: Arc<dyn ArtifactExporter>,
    artifact_name: String,
}

impl WizardManager {
    pub fn new(
        engine: WizardEngine,
        client: Arc<GenerationClient>,
        exporter: Arc<dyn ArtifactExporter>,
        artifact_name: impl Into<String>,
    ) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
            client,
            exporter,
            artifact_name: artifact_name.into(),
        }
    }

    /// Suggested download name for the artifact.
    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.engine.read().await.session().snapshot()
    }

    pub async fn state(&self) -> GenerationState {
        self.engine.read().await.session().state()
    }

    pub async fn submit_answer(
        &self,
        key: FieldKey,
        value: AnswerValue,
    ) -> Result<Outcome, WizardError> {
        self.engine.write().await.submit_answer(key, value)
    }

    pub async fn toggle_selection(&self, option: &str) -> Result<Vec<String>, WizardError> {
        self.engine.write().await.toggle_selection(option)
    }

    pub async fn submit_selection(&self) -> Result<Outcome, WizardError> {
        self.engine.write().await.submit_selection()
    }

    pub async fn reset_session(&self) -> SessionSnapshot {
        self.engine.write().await.reset_session().snapshot()
    }

    /// Confirm the request and start the generation call in the background.
    ///
    /// The returned handle resolves to the settlement outcome, which is
    /// `Outcome::Discarded` if the session was reset while the call was in
    /// flight.
    pub async fn start_generation(&self) -> Result<JoinHandle<Outcome>, WizardError> {
        let ticket = self.engine.write().await.confirm_generation()?;
        info!(
            session_id = %ticket.session_id,
            token = ticket.token,
            model = self.client.model_name(),
            "Generation confirmed"
        );

        let engine = Arc::clone(&self.engine);
        let client = Arc::clone(&self.client);
        Ok(tokio::spawn(async move {
            let result = client.generate(&ticket.request).await;
            let mut engine = engine.write().await;
            match engine.settle_generation(ticket.token, result) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(token = ticket.token, "Generation settlement rejected: {}", e);
                    Outcome::Unchanged
                }
            }
        }))
    }

    /// Confirm, run the call and wait for it to settle.
    pub async fn generate(&self) -> Result<Outcome, WizardError> {
        let handle = self.start_generation().await?;
        handle.await.map_err(|e| WizardError::GenerationFailed {
            reason: format!("Generation task aborted: {}", e),
        })
    }

    /// The generated document, once the session has succeeded.
    pub async fn artifact(&self) -> Option<String> {
        self.engine
            .read()
            .await
            .session()
            .artifact()
            .map(String::from)
    }

    /// Write the artifact out through the configured exporter.
    pub async fn export_artifact(&self) -> Result<PathBuf, Error> {
        let artifact = self.artifact().await.ok_or(WizardError::NoArtifact)?;
        let path = self
            .exporter
            .export(&self.artifact_name, artifact.as_bytes())
            .await?;
        Ok(path)
    }
}
