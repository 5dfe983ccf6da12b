mod utils;

use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use utils::{graceful_shutdown_blocker, register_panic_logger};

use crate::http::{self, HttpServerError};
use crate::{Config, ServiceState, StateSetupError};

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to install signal handlers: {0}")]
    Signals(#[from] std::io::Error),
    #[error("error creating server state: {0}")]
    State(#[from] StateSetupError),
    #[error(transparent)]
    Http(#[from] HttpServerError),
    #[error("service task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("failed to shut down within {} seconds", FINAL_SHUTDOWN_TIMEOUT.as_secs())]
    ShutdownTimeout,
}

/// Install the global tracing subscriber. Logs go to stdout through a
/// non-blocking writer; keep the returned guard alive to flush them.
pub fn init_logging(log_level: tracing::Level) -> WorkerGuard {
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    // a subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::registry().with(stdout_layer).try_init();

    guard
}

/// Run the service until SIGINT/SIGTERM, then shut it down gracefully.
pub async fn spawn_service(config: &Config) -> Result<(), ProcessError> {
    let _guard = init_logging(config.log_level);
    register_panic_logger();
    utils::report_build_info();

    let (graceful_waiter, _shutdown_tx, shutdown_rx) = graceful_shutdown_blocker()?;
    let state = ServiceState::from_config(config).await?;

    let http_config = http::Config::from(config);
    let http_rx = shutdown_rx.clone();
    let mut http_handle = tokio::spawn(async move { http::run(http_config, state, http_rx).await });

    tokio::select! {
        _ = graceful_waiter => {}
        // the server only stops by itself when it failed to bind or crashed
        finished = &mut http_handle => {
            let result = finished?;
            if let Err(e) = &result {
                tracing::error!("HTTP server error: {}", e);
            }
            return result.map_err(ProcessError::from);
        }
    }

    let handles = vec![http_handle];
    let Ok(results) = timeout(FINAL_SHUTDOWN_TIMEOUT, join_all(handles)).await else {
        tracing::error!(
            "Failed to shut down within {} seconds",
            FINAL_SHUTDOWN_TIMEOUT.as_secs()
        );
        return Err(ProcessError::ShutdownTimeout);
    };
    for result in results {
        result??;
    }

    tracing::info!("service stopped");
    Ok(())
}
