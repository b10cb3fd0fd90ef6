//! Generation proxy endpoint handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, error, info, warn};

use super::types::{ErrorBody, GenerationRequest, GenerationResult, MessageBody};
use crate::context::ServiceContext;
use crate::error::ImageError;

/// Message returned when the prompt is missing or empty.
pub const PROMPT_REQUIRED: &str = "Prompt is required";

/// Message returned when the provider could not be called at all.
pub const GENERIC_FAILURE: &str = "Error calling image generation API";

/// Failure outcomes of the endpoint.
#[derive(Debug)]
pub enum ApiError {
    /// Bad input; 400 with `{ message }`. No provider call was made.
    InvalidRequest(String),
    /// Provider answered with an error; 500 with the provider's text.
    ProviderRejected(String),
    /// Transport or parse failure; 500 with a generic message.
    Internal,
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Api { status, message } => {
                warn!("Provider rejected generation ({status}): {message}");
                Self::ProviderRejected(message)
            }
            other => {
                error!("Image generation failed: {other}");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(MessageBody { message })).into_response()
            }
            Self::ProviderRejected(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: format!("Failed to generate image: {message}"),
                }),
            )
                .into_response(),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: GENERIC_FAILURE.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// POST /api/generate-image - Generate an image from a text prompt
///
/// 1. Reject unparseable bodies and empty prompts with 400
/// 2. Call the configured generator exactly once
/// 3. Render the result as `{ imageUrl }`
///
/// The body is parsed as JSON whatever its `Content-Type`.
pub async fn generate_image_handler(
    State(ctx): State<ServiceContext>,
    body: Bytes,
) -> Result<Json<GenerationResult>, ApiError> {
    let request: GenerationRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!("Rejected generation body: {e}");
        ApiError::InvalidRequest(format!("Invalid JSON body: {e}"))
    })?;

    let Some(prompt) = request.prompt() else {
        debug!("Rejected generation request without prompt");
        return Err(ApiError::InvalidRequest(PROMPT_REQUIRED.to_string()));
    };

    debug!(
        "Image generation request received: prompt_len={}",
        prompt.len()
    );

    let image = ctx.generator.generate(prompt).await?;
    let image_url = image.to_image_url();

    info!(
        "Image generated: provider={}, image_url_len={}",
        ctx.provider,
        image_url.len()
    );
    Ok(Json(GenerationResult { image_url }))
}

/// GET /health - Liveness probe naming the active provider
pub async fn health_handler(State(ctx): State<ServiceContext>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "provider": ctx.provider }))
}
