use std::sync::Arc;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;

use site_wizard::channels::cli;
use site_wizard::config::WizardConfig;
use site_wizard::export::FileExporter;
use site_wizard::llm::create_provider;
use site_wizard::wizard::{
    GenerationClient, WizardEngine, WizardManager, WizardRouteState, wizard_routes,
};

fn env_filter(default: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
}

/// Logs go to stderr, except in CLI mode with a log dir, where they would
/// interleave with the chat.
fn init_tracing(config: &WizardConfig) -> Option<WorkerGuard> {
    let cli_mode = config.http_port.is_none();
    match &config.log_dir {
        Some(dir) if cli_mode => {
            let appender = tracing_appender::rolling::daily(dir, "site-wizard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter("info"))
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Some(guard)
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(if cli_mode { "warn" } else { "info" }))
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match WizardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("  export OPENROUTER_API_KEY=sk-or-...");
            std::process::exit(1);
        }
    };
    let _guard = init_tracing(&config);

    eprintln!("🌐 Site Wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   Output: {}", config.output_dir.join(&config.artifact_name).display());

    let llm = create_provider(&config.llm).context("failed to create LLM provider")?;
    let client = Arc::new(GenerationClient::new(llm, config.generation));
    let exporter = Arc::new(FileExporter::new(config.output_dir.clone()));
    let manager = Arc::new(WizardManager::new(
        WizardEngine::website(),
        client,
        exporter,
        config.artifact_name.clone(),
    ));

    match config.http_port {
        Some(port) => {
            eprintln!("   API: http://0.0.0.0:{}/api/wizard\n", port);
            let app = wizard_routes(WizardRouteState { manager });
            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
                .await
                .with_context(|| format!("failed to bind port {}", port))?;
            tracing::info!(port, "Wizard HTTP server started");
            axum::serve(listener, app).await?;
        }
        None => {
            eprintln!("   Answer with a number or the option text. /help for commands, /quit to exit.\n");
            cli::run(manager).await?;
        }
    }

    Ok(())
}
