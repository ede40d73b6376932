//! Artifact export — persists the generated document for the user.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::ExportError;

/// Default download name for a generated site.
pub const DEFAULT_ARTIFACT_NAME: &str = "my-website.html";

/// Persists generated documents somewhere the user can pick them up.
#[async_trait]
pub trait ArtifactExporter: Send + Sync {
    /// Write `content` under the suggested `name`, returning where it landed.
    async fn export(&self, name: &str, content: &[u8]) -> Result<PathBuf, ExportError>;
}

/// Writes artifacts into a directory on disk.
pub struct FileExporter {
    base_path: PathBuf,
}

impl FileExporter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

/// Accept only a bare file name; anything that could leave the export
/// directory is rejected.
fn validate_name(name: &str) -> Result<&str, ExportError> {
    let trimmed = name.trim();
    let bare = Path::new(trimmed)
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == trimmed);
    if trimmed.is_empty() || !bare || trimmed.contains(['/', '\\']) {
        return Err(ExportError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

#[async_trait]
impl ArtifactExporter for FileExporter {
    async fn export(&self, name: &str, content: &[u8]) -> Result<PathBuf, ExportError> {
        let name = validate_name(name)?;
        fs::create_dir_all(&self.base_path).await?;
        let path = self.base_path.join(name);
        fs::write(&path, content).await?;
        tracing::info!(path = %path.display(), bytes = content.len(), "Artifact exported");
        Ok(path)
    }
}
