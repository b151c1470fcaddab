//! # Bistro Boss
//!
//! Restaurant ordering backend.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export ACCESS_TOKEN=...
//! export STRIPE_SECRET_KEY=sk_test_...
//! export DB_USER=... DB_PASS=... DB_HOST=cluster0.example.mongodb.net
//!
//! # Run the server
//! bistro-boss
//! ```

use bistro_api::{routes, AppConfig, AppState};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let config = AppConfig::from_env()?;
    let addr = config.socket_addr()?;
    let is_prod = config.is_production();

    info!("Environment: {}", config.environment);

    // Refuses to start when the store or Stripe cannot be set up
    let state = AppState::from_config(config).await?;
    let store = state.store.clone();

    let app = routes::create_router(state);

    info!("🍽  Bistro Boss starting on http://{}", addr);
    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🔑 Tokens: POST http://{}/jwt", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing {} store", store.backend_name());
    if let Err(e) = store.shutdown().await {
        error!("Store shutdown failed: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = signal_or_pending(signal::ctrl_c(), "Ctrl-C");

    #[cfg(unix)]
    let terminate = signal_or_pending(
        async {
            signal::unix::signal(signal::unix::SignalKind::terminate())?
                .recv()
                .await;
            Ok::<(), std::io::Error>(())
        },
        "SIGTERM",
    );

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Resolves when `listener` reports its signal. A listener that cannot be
/// installed never resolves, so it cannot trigger a shutdown.
async fn signal_or_pending<F>(listener: F, name: &str)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = listener.await {
        error!("Failed to listen for {}: {}", name, e);
        std::future::pending::<()>().await;
    }
}

fn print_banner() {
    println!(
        r#"
  🍽  Bistro Boss 🍽
  ━━━━━━━━━━━━━━━━━━━━━━━
  Restaurant ordering backend
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_failed_listener_never_fires() {
        let failing = async { Err(std::io::Error::other("no signal handler")) };
        let fired =
            tokio::time::timeout(Duration::from_millis(50), signal_or_pending(failing, "SIGTEST"))
                .await;
        assert!(fired.is_err());
    }

    #[tokio::test]
    async fn test_delivered_signal_fires() {
        let fired = tokio::time::timeout(
            Duration::from_millis(50),
            signal_or_pending(async { Ok(()) }, "SIGTEST"),
        )
        .await;
        assert!(fired.is_ok());
    }
}
