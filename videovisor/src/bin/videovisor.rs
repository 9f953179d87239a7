use eyre::Context;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use videovisor::config::Config;
use videovisor::web::{self, AppState};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let config = Config::load().context("load configuration")?;
    let addr = config.bind_addr();
    if !tokio::fs::try_exists(&config.client_secrets)
        .await
        .unwrap_or(false)
    {
        tracing::warn!(
            path = %config.client_secrets.display(),
            "client secrets file not found; sign-in will not work until it exists"
        );
    }

    let state = Arc::new(AppState::new(config).context("build application state")?);
    let app = web::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind to {addr}"))?;
    tracing::info!(
        addr = %listener.local_addr().context("get local address")?,
        "dashboard listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve dashboard")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for ctrl-c");
        // never resolve; the server then runs until killed
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
