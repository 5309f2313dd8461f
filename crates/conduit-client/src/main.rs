//! conduit client
//!
//! - Reads `conduit.yaml` (or the path given as the first argument)
//! - Every tick: poll settings, fire a batch sized by the concurrency file
//! - Ops endpoints: /healthz, /readyz, /metrics
//! - Ctrl+C / SIGTERM: stop ticking, drain in-flight requests, exit

use std::future::IntoFuture;
use std::net::SocketAddr;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use conduit_client::{app_state::AppState, config, driver::Driver, router};
use conduit_core::error::{ConduitError, Result};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(code = e.code(), error = %e, "conduit-client failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "conduit.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg
        .ops
        .listen
        .parse()
        .map_err(|e| ConduitError::BadRequest(format!("ops.listen must be a valid SocketAddr: {e}")))?;

    let state = AppState::new(cfg)?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ConduitError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "ops endpoints listening");

    let app = router::build_router(state.clone());
    let ops = tokio::spawn(
        axum::serve(listener, app).with_graceful_shutdown(stopped(stop_rx.clone())).into_future(),
    );

    let aborted = Driver::new(state).run(stopped(stop_rx)).await;
    tracing::info!(aborted, "driver stopped");

    match ops.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ConduitError::Internal(format!("ops server failed: {e}"))),
        Err(e) => Err(ConduitError::Internal(format!("ops server task failed: {e}"))),
    }
}

async fn stopped(mut rx: watch::Receiver<bool>) {
    // Sender dropped also counts as stop.
    let _ = rx.wait_for(|stop| *stop).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
