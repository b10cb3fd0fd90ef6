//! Request and response bodies of the proxy endpoint.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate-image`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Text prompt. Missing and `null` both deserialize to `None`.
    #[serde(default)]
    pub prompt: Option<String>,
}

impl GenerationRequest {
    /// The prompt, if present and non-empty.
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }
}

/// Successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Data URI or provider-hosted URL, usable as an image source.
    pub image_url: String,
}

/// Client-error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    /// What was wrong with the request.
    pub message: String,
}

/// Server-error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// What went wrong while generating.
    pub error: String,
}
