//! HTTP proxy server in front of the image generation provider.
//!
//! Routes:
//! - `POST /api/generate-image` → [`handler::generate_image_handler`]
//! - `GET /health` → [`handler::health_handler`]

pub mod handler;
pub mod types;

use std::future::Future;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::context::ServiceContext;
use crate::error::ImageError;

/// Path of the generation endpoint.
pub const GENERATE_PATH: &str = "/api/generate-image";

/// Build the router. The generator is fixed here, at construction time.
#[must_use]
pub fn create_app(ctx: ServiceContext) -> Router {
    Router::new()
        .route(GENERATE_PATH, post(handler::generate_image_handler))
        .route("/health", get(handler::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Serve the proxy on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve<F>(
    listener: TcpListener,
    ctx: ServiceContext,
    shutdown: F,
) -> Result<(), ImageError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(
        "Proxy listening on http://{addr} (provider: {})",
        ctx.provider
    );

    axum::serve(listener, create_app(ctx))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Proxy stopped");
    Ok(())
}
