//! The `scout` binary: load configuration, wire the collaborators, serve
//! the HTTP API until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use scout_ai::{Analyzer, AnalyzerConfig, OpenAiChatClient, OpenAiConfig};
use scout_core::{ProjectCatalog, ScoutConfig};
use scout_gateway::{build_router, AppContext, PacingConfig};
use scout_github::{GithubClient, GithubClientConfig};
use scout_lark::{LarkClient, Recipient};

const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";
const CHAT_REQUEST_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Parser)]
#[command(name = "scout", about = "Beginner-issue scouting and triage service")]
struct Cli {
    /// Address to serve the HTTP API on.
    #[arg(long, env = "SCOUT_BIND", default_value = "127.0.0.1:8000")]
    bind: String,
    /// Path to the TOML project catalog.
    #[arg(long, env = "SCOUT_CATALOG", default_value = "projects.toml")]
    catalog: PathBuf,
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn build_context(config: &ScoutConfig, catalog: ProjectCatalog) -> Result<AppContext> {
    let github = GithubClient::new(GithubClientConfig::new(
        config.github_api_base.clone(),
        config.github_token.clone(),
    ))
    .context("failed to build the issue-tracker client")?;

    let chat = OpenAiChatClient::new(OpenAiConfig {
        api_base: config.model_api_base.clone(),
        api_key: config.model_api_key.clone(),
        request_timeout_ms: CHAT_REQUEST_TIMEOUT_MS,
    })
    .context("failed to build the chat-completion client")?;

    let model = if config.model_id.is_empty() {
        DEFAULT_MODEL_ID.to_string()
    } else {
        config.model_id.clone()
    };

    let user_recipient = config.lark.user_id.as_deref().map(Recipient::from_id);
    let notifier =
        LarkClient::new(config.lark.clone()).context("failed to build the notification client")?;

    Ok(AppContext {
        issues: Arc::new(github),
        analyzer: Analyzer::new(Arc::new(chat), AnalyzerConfig { model }),
        notifier: Arc::new(notifier),
        catalog,
        user_recipient,
        pacing: PacingConfig::default(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = ScoutConfig::from_env();
    config.validate().context("configuration is incomplete")?;

    let catalog = ProjectCatalog::load(&cli.catalog)
        .with_context(|| format!("failed to load project catalog {}", cli.catalog.display()))?;
    info!(projects = catalog.projects.len(), "project catalog loaded");

    let context = Arc::new(build_context(&config, catalog)?);

    let bind_addr = cli
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid --bind '{}'", cli.bind))?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound address")?;
    info!(%local_addr, "scout service listening");

    axum::serve(listener, build_router(context))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server exited unexpectedly")?;

    Ok(())
}
