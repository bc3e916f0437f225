//! Relevance judge HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use judge::config::Config;
use judge::gateway::{HandlerState, create_router_with_state};
use judge::inference::{
    ChatLogprobInvoker, HfTokenizer, MonoT5Invoker, OutputConstraint, TextTokenizer,
};
use judge::prompt::PromptTruncator;
use judge::scoring::RelevanceScorer;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        cache_capacity = config.cache_capacity,
        "Relevance judge starting"
    );

    let state = build_state(&config).await?;
    if !state.has_backend() {
        tracing::warn!(
            "No backend configured; set JUDGE_MONOT5_PATH or JUDGE_CHAT_URL. /ready will report unavailable"
        );
    }

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Relevance judge shutdown complete");
    Ok(())
}

async fn build_state(config: &Config) -> anyhow::Result<HandlerState> {
    let mut state = HandlerState::default();

    if config.monot5.is_enabled() {
        let monot5_config = config.monot5.clone();
        let invoker = tokio::task::spawn_blocking(move || MonoT5Invoker::load(monot5_config))
            .await
            .context("MonoT5 loader task panicked")??;

        let max_new_tokens = invoker.config().max_new_tokens;
        tracing::info!(
            path = ?config.monot5.model_path,
            label_ids = ?invoker.label_ids(),
            "MonoT5 backend loaded"
        );

        state = state.with_pair(
            RelevanceScorer::new(Arc::new(invoker), max_new_tokens)
                .with_cache_capacity(config.cache_capacity),
        );
    }

    if config.chat.is_enabled() {
        let tokenizer_path = config
            .chat
            .tokenizer_path
            .as_deref()
            .context("JUDGE_CHAT_TOKENIZER_PATH is required when JUDGE_CHAT_URL is set")?;
        let tokenizer: Arc<dyn TextTokenizer> = Arc::new(HfTokenizer::from_path(tokenizer_path)?);

        let invoker = ChatLogprobInvoker::new(config.chat.clone())?;
        tracing::info!(
            endpoint = invoker.endpoint(),
            model = %config.chat.model,
            max_prompt_tokens = config.chat.max_prompt_tokens,
            "Chat backend configured"
        );

        state = state.with_chat(
            RelevanceScorer::new(Arc::new(invoker), config.chat.max_new_tokens)
                .with_constraint(OutputConstraint::relevance_schema())
                .with_truncator(PromptTruncator::new(
                    tokenizer,
                    config.chat.max_prompt_tokens,
                ))
                .with_cache_capacity(config.cache_capacity),
        );
    }

    Ok(state)
}

fn run_health_check() -> i32 {
    let port = std::env::var("JUDGE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
