//! Prompt form client: submits prompts to a running proxy.

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use tracing::{debug, error};

use crate::error::ImageError;
use crate::params::mime_from_url;
use crate::server::handler::PROMPT_REQUIRED;
use crate::server::types::{ErrorBody, GenerationRequest, GenerationResult, MessageBody};
use crate::server::GENERATE_PATH;

/// Image bytes materialized from an `imageUrl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// MIME type, when the source told us one.
    pub mime_type: Option<String>,
}

/// Client-side state of one prompt form: the prompt being edited, the last
/// image received, and whether a submission is in flight.
pub struct PromptForm {
    client: Client,
    server: String,
    delay: Duration,
    prompt: String,
    image_url: Option<String>,
    in_flight: bool,
}

impl PromptForm {
    /// Create a form that submits to the proxy at `server`
    /// (e.g. `http://127.0.0.1:3000`).
    #[must_use]
    pub fn new(server: impl Into<String>, delay: Duration) -> Self {
        Self {
            client: Client::new(),
            server: server.into().trim_end_matches('/').to_string(),
            delay,
            prompt: String::new(),
            image_url: None,
            in_flight: false,
        }
    }

    /// Replace the prompt text.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Submission is disabled while the prompt is empty or a request is out.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.in_flight && !self.prompt.is_empty()
    }

    /// Submit the current prompt. On success the returned URL becomes the
    /// form's current image; on failure the previous image is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if submission is disabled, the proxy is unreachable,
    /// or the proxy answers with an error.
    pub async fn submit(&mut self) -> Result<&str, ImageError> {
        if !self.can_submit() {
            return Err(ImageError::InvalidArgument(PROMPT_REQUIRED.into()));
        }

        self.in_flight = true;
        let result = self.post_prompt().await;
        self.in_flight = false;

        match result {
            Ok(url) => Ok(self.image_url.insert(url).as_str()),
            Err(e) => {
                error!("Error generating image: {e}");
                Err(e)
            }
        }
    }

    async fn post_prompt(&self) -> Result<String, ImageError> {
        tokio::time::sleep(self.delay).await;

        let url = format!("{}{GENERATE_PATH}", self.server);
        debug!("Submitting prompt to {url}");
        let body = GenerationRequest {
            prompt: Some(self.prompt.clone()),
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let parsed: GenerationResult = serde_json::from_str(&text).map_err(|e| {
                ImageError::MalformedResponse(format!("Failed to parse proxy response: {e}"))
            })?;
            return Ok(parsed.image_url);
        }

        let message = if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
            body.error
        } else if let Ok(body) = serde_json::from_str::<MessageBody>(&text) {
            body.message
        } else {
            text
        };
        Err(ImageError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Materialize an `imageUrl`: decode data URIs locally, download hosted
    /// URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the data URI is malformed or the download fails.
    pub async fn fetch_image(&self, image_url: &str) -> Result<FetchedImage, ImageError> {
        if image_url.starts_with("data:") {
            return decode_data_uri(image_url);
        }

        let response = self.client.get(image_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ImageError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let header_mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| v.starts_with("image/"));
        let mime_type = header_mime.or_else(|| mime_from_url(image_url).map(str::to_string));
        let data = response.bytes().await?.to_vec();
        Ok(FetchedImage { data, mime_type })
    }
}

/// Decode a `data:<mime>;base64,<payload>` URI.
///
/// # Errors
///
/// Returns an error if the URI is not a base64 data URI.
pub fn decode_data_uri(uri: &str) -> Result<FetchedImage, ImageError> {
    let invalid = |why: &str| ImageError::MalformedResponse(format!("Invalid data URI: {why}"));

    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| invalid("missing 'data:' prefix"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing ','"))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| invalid("not base64-encoded"))?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| invalid(&e.to_string()))?;
    let mime_type = (!mime.is_empty()).then(|| mime.to_string());
    Ok(FetchedImage { data, mime_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form(server: &MockServer, prompt: &str) -> PromptForm {
        let mut form = PromptForm::new(server.uri(), Duration::ZERO);
        form.set_prompt(prompt);
        form
    }

    #[test]
    fn empty_prompt_disables_submission() {
        let form = PromptForm::new("http://localhost:3000", Duration::ZERO);
        assert!(!form.can_submit());
        assert!(!form.in_flight);
    }

    #[tokio::test]
    async fn submit_with_empty_prompt_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut form = form(&server, "");
        let err = form.submit().await.unwrap_err();
        assert!(err.to_string().contains("Prompt is required"));
    }

    #[tokio::test]
    async fn successful_submit_stores_image_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-image"))
            .and(body_json(json!({"prompt": "a cat"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"imageUrl": "data:image/png;base64,AQID"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut form = form(&server, "a cat");
        let url = form.submit().await.unwrap().to_string();

        assert_eq!(url, "data:image/png;base64,AQID");
        assert_eq!(
            form.image_url.as_deref(),
            Some("data:image/png;base64,AQID")
        );
        assert!(!form.in_flight);
        assert!(form.can_submit());
    }

    #[tokio::test]
    async fn failed_submit_keeps_previous_image_and_clears_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"imageUrl": "https://x/first.png"})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"error": "Failed to generate image: busy"})),
            )
            .mount(&server)
            .await;

        let mut form = form(&server, "a cat");
        form.submit().await.unwrap();

        let err = form.submit().await.unwrap_err();
        match err {
            ImageError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Failed to generate image: busy");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(form.image_url.as_deref(), Some("https://x/first.png"));
        assert!(!form.in_flight);
    }

    #[tokio::test]
    async fn client_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Prompt is required"})),
            )
            .mount(&server)
            .await;

        let err = form(&server, "x").submit().await.unwrap_err();
        assert!(err.to_string().contains("Prompt is required"));
    }

    #[test]
    fn decode_png_data_uri() {
        let image = decode_data_uri("data:image/png;base64,AQID").unwrap();
        assert_eq!(image.data, vec![1, 2, 3]);
        assert_eq!(image.mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn decode_rejects_non_base64_uris() {
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("https://x/y.png").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[tokio::test]
    async fn fetch_hosted_image_uses_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/webp")
                    .set_body_bytes(vec![9, 9, 9]),
            )
            .mount(&server)
            .await;

        let form = PromptForm::new(server.uri(), Duration::ZERO);
        let url = format!("{}/cat", server.uri());
        let image = form.fetch_image(&url).await.unwrap();
        assert_eq!(image.data, vec![9, 9, 9]);
        assert_eq!(image.mime_type.as_deref(), Some("image/webp"));
    }

    #[tokio::test]
    async fn fetch_hosted_image_falls_back_to_extension() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/octet-stream")
                    .set_body_bytes(vec![1]),
            )
            .mount(&server)
            .await;

        let form = PromptForm::new(server.uri(), Duration::ZERO);
        let url = format!("{}/out/cat.jpg", server.uri());
        let image = form.fetch_image(&url).await.unwrap();
        assert_eq!(image.mime_type.as_deref(), Some("image/jpeg"));
    }
}
