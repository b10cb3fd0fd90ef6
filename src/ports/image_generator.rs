//! Image generator port for text-to-image providers.

use std::future::Future;
use std::pin::Pin;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// A displayable reference to a generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// Image bytes returned directly by the provider.
    Inline {
        /// Raw image bytes.
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
        /// MIME type of the image (e.g., `"image/png"`).
        mime_type: String,
    },
    /// Image hosted by the provider.
    Hosted {
        /// Provider URL, passed through untouched.
        url: String,
    },
}

impl ImageRef {
    /// Render as a string usable as an image source: a data URI for inline
    /// bytes, the URL itself for hosted images.
    #[must_use]
    pub fn to_image_url(&self) -> String {
        match self {
            Self::Inline { data, mime_type } => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(data);
                format!("data:{mime_type};base64,{encoded}")
            }
            Self::Hosted { url } => url.clone(),
        }
    }
}

/// Boxed future type returned by [`ImageGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ImageRef, ImageError>> + Send + 'a>>;

/// Generates an image for a prompt via an external provider.
pub trait ImageGenerator: Send + Sync {
    /// Issue exactly one generation call for `prompt`.
    fn generate(&self, prompt: &str) -> GenerateFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(&s)
            .map_err(serde::de::Error::custom)
    }
}
