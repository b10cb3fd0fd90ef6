//! Live adapter for the Stability AI stable-image API.

use reqwest::multipart::Form;
use reqwest::Client;

use super::error_message;
use crate::error::ImageError;
use crate::params::{format_mime, NEGATIVE_PROMPT, PROVIDER_OUTPUT_FORMAT};
use crate::ports::{GenerateFuture, ImageGenerator, ImageRef};

const STABILITY_API_URL: &str = "https://api.stability.ai/v2beta/stable-image/generate/core";

/// Live Stability generator. Answers with raw image bytes.
pub struct StabilityGenerator {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl StabilityGenerator {
    /// Create a new Stability generator with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: STABILITY_API_URL.to_string(),
        }
    }

    /// Point the generator at a different endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl ImageGenerator for StabilityGenerator {
    fn generate(&self, prompt: &str) -> GenerateFuture<'_> {
        let prompt = prompt.to_string();
        Box::pin(async move {
            let form = Form::new()
                .text("prompt", prompt)
                .text("output_format", PROVIDER_OUTPUT_FORMAT)
                .text("negative_prompt", NEGATIVE_PROMPT);

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .header("Accept", "image/*")
                .multipart(form)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await?;
                return Err(ImageError::Api {
                    status: status.as_u16(),
                    message: error_message(status, &body),
                });
            }

            let data = response.bytes().await?.to_vec();
            if data.is_empty() {
                return Err(ImageError::MalformedResponse(
                    "Stability returned an empty body".into(),
                ));
            }

            Ok(ImageRef::Inline {
                data,
                mime_type: format_mime(PROVIDER_OUTPUT_FORMAT),
            })
        })
    }
}
