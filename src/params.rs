//! Fixed generation parameters and output format helpers.

/// Output format requested from the providers. Not derived from input.
pub const PROVIDER_OUTPUT_FORMAT: &str = "png";

/// Negative prompt sent with every generation request.
pub const NEGATIVE_PROMPT: &str =
    "blurry, low quality, distorted, deformed, watermark, text, signature";

/// Width sent to `ModelsLab`. The API expects numbers as strings.
pub const MODELSLAB_WIDTH: &str = "512";

/// Height sent to `ModelsLab`.
pub const MODELSLAB_HEIGHT: &str = "512";

/// Number of samples requested from `ModelsLab`.
pub const MODELSLAB_SAMPLES: &str = "1";

/// Validate a client-side output format.
///
/// # Errors
///
/// Returns an error if the format is not recognized.
pub fn validate_format(format: &str) -> Result<(), String> {
    match format {
        "jpeg" | "png" | "webp" => Ok(()),
        _ => Err(format!("Unsupported format '{format}'. Valid: jpeg, png, webp")),
    }
}

/// Get the file extension for an output format.
#[must_use]
pub fn format_extension(format: &str) -> &'static str {
    match format {
        "png" => "png",
        "webp" => "webp",
        // jpeg and any unknown format default to jpg
        _ => "jpg",
    }
}

/// MIME type for an output format.
#[must_use]
pub fn format_mime(format: &str) -> String {
    format!("image/{format}")
}

/// Guess a MIME type from a URL's file extension.
#[must_use]
pub fn mime_from_url(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())?;
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_format_valid() {
        assert!(validate_format("jpeg").is_ok());
        assert!(validate_format("png").is_ok());
        assert!(validate_format("webp").is_ok());
    }

    #[test]
    fn validate_format_invalid() {
        assert!(validate_format("gif").is_err());
        assert!(validate_format("bmp").is_err());
    }

    #[test]
    fn format_extension_mapping() {
        assert_eq!(format_extension("jpeg"), "jpg");
        assert_eq!(format_extension("png"), "png");
        assert_eq!(format_extension("webp"), "webp");
    }

    #[test]
    fn provider_format_mime() {
        assert_eq!(format_mime(PROVIDER_OUTPUT_FORMAT), "image/png");
    }

    #[test]
    fn mime_guess_ignores_query() {
        assert_eq!(
            mime_from_url("https://cdn.example.com/a/b.png?x=1"),
            Some("image/png")
        );
        assert_eq!(
            mime_from_url("https://cdn.example.com/b.JPG"),
            Some("image/jpeg")
        );
        assert_eq!(mime_from_url("https://cdn.example.com/b"), None);
    }
}
