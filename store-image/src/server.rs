use std::{env, net::SocketAddr, sync::Arc};

use axum::Extension;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{routes, types::environment::running_on_lambda, upload::ImageUploader};

const DEFAULT_PORT: u16 = 3000;

/// Builds the application router around a shared uploader
pub fn router(uploader: Arc<ImageUploader>) -> axum::Router {
    routes::handler()
        .layer(Extension(uploader))
        .layer(TraceLayer::new_for_http())
}

/// Starts serving requests
///
/// Inside Lambda the router is driven by the Lambda runtime, one invocation
/// per event. Anywhere else it listens on `0.0.0.0:$PORT`.
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(uploader: Arc<ImageUploader>) -> anyhow::Result<()> {
    let router = router(uploader);

    if running_on_lambda() {
        info!("Starting store-image on the Lambda runtime");
        return lambda_http::run(router)
            .await
            .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {e}"));
    }

    let addr = SocketAddr::from((
        [0, 0, 0, 0],
        env::var("PORT").map_or(Ok(DEFAULT_PORT), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    info!("store-image started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
