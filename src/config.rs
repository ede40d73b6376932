//! Configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::export::DEFAULT_ARTIFACT_NAME;
use crate::llm::LlmConfig;
use crate::wizard::GenerationSettings;

pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3.1:free";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const APP_TITLE: &str = "AI Website Generator";

/// Runtime configuration for the wizard binary.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    pub llm: LlmConfig,
    pub generation: GenerationSettings,
    /// Directory the artifact is exported into.
    pub output_dir: PathBuf,
    pub artifact_name: String,
    /// Serve the HTTP API on this port instead of running the CLI chat.
    pub http_port: Option<u16>,
    /// Write logs to daily files here instead of stderr.
    pub log_dir: Option<PathBuf>,
}

impl WizardConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("OPENROUTER_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let defaults = GenerationSettings::default();
        let temperature: f32 = parse_var(&var, "SITE_WIZARD_TEMPERATURE")?
            .unwrap_or(defaults.temperature);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                key: "SITE_WIZARD_TEMPERATURE".to_string(),
                message: format!("{} is outside 0.0..=2.0", temperature),
            });
        }
        let max_tokens: u32 =
            parse_var(&var, "SITE_WIZARD_MAX_TOKENS")?.unwrap_or(defaults.max_tokens);
        if max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SITE_WIZARD_MAX_TOKENS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        let timeout = parse_var::<u64>(&var, "SITE_WIZARD_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(Self {
            llm: LlmConfig {
                api_key: SecretString::from(api_key),
                model: var("SITE_WIZARD_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: var("SITE_WIZARD_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                referer: var("SITE_WIZARD_REFERER")
                    .unwrap_or_else(|| "http://localhost".to_string()),
                app_title: APP_TITLE.to_string(),
                timeout,
            },
            generation: GenerationSettings {
                temperature,
                max_tokens,
            },
            output_dir: var("SITE_WIZARD_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            artifact_name: var("SITE_WIZARD_ARTIFACT_NAME")
                .unwrap_or_else(|| DEFAULT_ARTIFACT_NAME.to_string()),
            http_port: parse_var(&var, "SITE_WIZARD_HTTP_PORT")?,
            log_dir: var("SITE_WIZARD_LOG_DIR").map(PathBuf::from),
        })
    }
}

fn parse_var<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    var(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{:?}: {}", raw, e),
            })
        })
        .transpose()
}
