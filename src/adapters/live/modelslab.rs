//! Live adapter for the `ModelsLab` text2img API.

use reqwest::Client;
use serde::Deserialize;

use super::{error_message, truncate_body};
use crate::error::ImageError;
use crate::params::{MODELSLAB_HEIGHT, MODELSLAB_SAMPLES, MODELSLAB_WIDTH, NEGATIVE_PROMPT};
use crate::ports::{GenerateFuture, ImageGenerator, ImageRef};

const MODELSLAB_API_URL: &str = "https://modelslab.com/api/v6/realtime/text2img";

/// Live `ModelsLab` generator. Answers with a hosted image URL.
pub struct ModelsLabGenerator {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ModelsLabGenerator {
    /// Create a new `ModelsLab` generator with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: MODELSLAB_API_URL.to_string(),
        }
    }

    /// Point the generator at a different endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl ImageGenerator for ModelsLabGenerator {
    fn generate(&self, prompt: &str) -> GenerateFuture<'_> {
        let prompt = prompt.to_string();
        Box::pin(async move {
            let body = serde_json::json!({
                "key": self.api_key,
                "prompt": prompt,
                "negative_prompt": NEGATIVE_PROMPT,
                "width": MODELSLAB_WIDTH,
                "height": MODELSLAB_HEIGHT,
                "samples": MODELSLAB_SAMPLES,
                "safety_checker": false,
                "base64": false,
                "seed": null,
                "webhook": null,
                "track_id": null,
            });

            let response = self
                .client
                .post(&self.endpoint)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(ImageError::Api {
                    status: status.as_u16(),
                    message: error_message(status, &response_text),
                });
            }

            let parsed: ModelsLabResponse = serde_json::from_str(&response_text).map_err(|e| {
                ImageError::MalformedResponse(format!("Failed to parse response: {e}"))
            })?;

            if let Some(message) = parsed.failure_message() {
                return Err(ImageError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            parsed
                .first_url()
                .map(|url| ImageRef::Hosted { url })
                .ok_or_else(|| {
                    ImageError::MalformedResponse(format!(
                        "No image URL in response. Body: {}",
                        truncate_body(&response_text)
                    ))
                })
        })
    }
}

// --- ModelsLab API response types ---

#[derive(Deserialize)]
struct ModelsLabResponse {
    #[serde(default)]
    status: Option<String>,
    /// Usually a string, occasionally an object of field errors.
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    output: Option<ModelsLabOutput>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelsLabOutput {
    One(String),
    Many(Vec<String>),
}

impl ModelsLabResponse {
    /// `ModelsLab` reports some failures with a 200 and `status: "error"`.
    fn failure_message(&self) -> Option<String> {
        let status = self.status.as_deref()?;
        if !matches!(status, "error" | "failed") {
            return None;
        }
        let message = match &self.message {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => format!("provider reported status '{status}'"),
        };
        Some(message)
    }

    fn first_url(self) -> Option<String> {
        let url = match self.output? {
            ModelsLabOutput::One(url) => url,
            ModelsLabOutput::Many(urls) => urls.into_iter().next()?,
        };
        (!url.is_empty()).then_some(url)
    }
}
