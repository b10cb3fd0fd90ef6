//! File naming, image saving, and format conversion for the client.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::client::FetchedImage;
use crate::error::ImageError;
use crate::params::format_extension;

/// Generate an output filename from a prompt and format: the prompt's first
/// 50 characters in kebab-case, a unix timestamp, and the format extension.
#[must_use]
pub fn auto_filename(prompt: &str, format: &str) -> String {
    let sanitized = sanitize_for_filename(prompt, 50);
    let timestamp = Utc::now().timestamp();
    let ext = format_extension(format);
    format!("{sanitized}-{timestamp}.{ext}")
}

/// Sanitize a string for use in a filename.
///
/// Lowercases, maps runs of non-alphanumerics to one hyphen, trims to
/// `max_len`.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true; // no leading hyphen

    for ch in input.chars() {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "image".to_string()
    } else {
        result
    }
}

/// Resolve the output path: use explicit path or auto-generate.
#[must_use]
pub fn resolve_output_path(explicit: Option<&str>, prompt: &str, format: &str) -> PathBuf {
    explicit.map_or_else(
        || PathBuf::from(auto_filename(prompt, format)),
        PathBuf::from,
    )
}

/// Save a fetched image, converting to `target_format` unless the source
/// is already in it.
///
/// # Errors
///
/// Returns an error if the file cannot be written or format conversion fails.
pub fn save_image(
    image: &FetchedImage,
    target_format: &str,
    output_path: &Path,
) -> Result<(), ImageError> {
    let source_format = image
        .mime_type
        .as_deref()
        .and_then(format_of_mime)
        .or_else(|| sniff_format(&image.data));

    if source_format == Some(target_format) {
        std::fs::write(output_path, &image.data).map_err(ImageError::Io)
    } else {
        convert_and_save(&image.data, target_format, output_path)
    }
}

/// Output format name for a MIME type, if it is one we write.
fn format_of_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/jpeg" | "image/jpg" => Some("jpeg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Detect the format from the image's magic bytes.
fn sniff_format(data: &[u8]) -> Option<&'static str> {
    match image::guess_format(data).ok()? {
        image::ImageFormat::Jpeg => Some("jpeg"),
        image::ImageFormat::Png => Some("png"),
        image::ImageFormat::WebP => Some("webp"),
        _ => None,
    }
}

/// Convert image bytes to the target format and save.
fn convert_and_save(
    data: &[u8],
    target_format: &str,
    output_path: &Path,
) -> Result<(), ImageError> {
    let img = image::load_from_memory(data)
        .map_err(|e| ImageError::ImageConversion(format!("Failed to decode image: {e}")))?;

    let image_format = match target_format {
        "jpeg" => image::ImageFormat::Jpeg,
        "png" => image::ImageFormat::Png,
        "webp" => image::ImageFormat::WebP,
        other => {
            return Err(ImageError::ImageConversion(format!("Unsupported format: {other}")));
        }
    };

    // JPEG has no alpha channel.
    let img = if image_format == image::ImageFormat::Jpeg {
        image::DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    img.save_with_format(output_path, image_format)
        .map_err(|e| ImageError::ImageConversion(format!("Failed to save as {target_format}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_1X1: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAIAAACQd1PeAAAADElEQVR4nGP4z8AAAAMBAQDJ/pLvAAAAAElFTkSuQmCC";

    fn png_image(mime_type: Option<&str>) -> FetchedImage {
        use base64::Engine;
        let data = base64::engine::general_purpose::STANDARD.decode(PNG_1X1).unwrap();
        FetchedImage {
            data,
            mime_type: mime_type.map(str::to_string),
        }
    }

    #[test]
    fn sanitize_basic() {
        assert_eq!(sanitize_for_filename("Hello World", 50), "hello-world");
    }

    #[test]
    fn sanitize_special_chars() {
        assert_eq!(
            sanitize_for_filename("A cat!! sitting on a mat...", 50),
            "a-cat-sitting-on-a-mat"
        );
    }

    #[test]
    fn sanitize_truncates() {
        let result = sanitize_for_filename(&"a".repeat(100), 10);
        assert_eq!(result.len(), 10);
    }

    #[test]
    fn sanitize_empty() {
        assert_eq!(sanitize_for_filename("", 50), "image");
        assert_eq!(sanitize_for_filename("!!!", 50), "image");
    }

    #[test]
    fn auto_filename_format() {
        let name = auto_filename("a cat", "jpeg");
        assert!(name.starts_with("a-cat-"));
        assert_eq!(Path::new(&name).extension().unwrap(), "jpg");
    }

    #[test]
    fn resolve_explicit() {
        let path = resolve_output_path(Some("my-image.png"), "ignored", "jpeg");
        assert_eq!(path, PathBuf::from("my-image.png"));
    }

    #[test]
    fn resolve_auto() {
        let path = resolve_output_path(None, "a cat", "png");
        assert!(path.to_str().unwrap().starts_with("a-cat-"));
        assert_eq!(path.extension().unwrap(), "png");
    }

    #[test]
    fn mime_and_sniffed_formats() {
        assert_eq!(format_of_mime("image/jpg"), Some("jpeg"));
        assert_eq!(format_of_mime("image/gif"), None);
        assert_eq!(sniff_format(&png_image(None).data), Some("png"));
        assert_eq!(sniff_format(b"nope"), None);
    }

    #[test]
    fn same_format_is_written_verbatim() {
        let dir = std::env::temp_dir().join("promptforge_output_same");
        std::fs::create_dir_all(&dir).unwrap();
        let out = dir.join("cat.png");
        let image = png_image(Some("image/png"));

        save_image(&image, "png", &out).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), image.data);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_mime_png_is_converted_to_jpeg() {
        let dir = std::env::temp_dir().join("promptforge_output_convert");
        std::fs::create_dir_all(&dir).unwrap();
        let out = dir.join("cat.jpg");

        save_image(&png_image(Some("application/octet-stream")), "jpeg", &out).unwrap();
        let data = std::fs::read(&out).unwrap();
        assert_eq!(&data[..2], &[0xFF, 0xD8]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn undecodable_bytes_fail_conversion() {
        let out = std::env::temp_dir().join("promptforge_output_bad.png");
        let image = FetchedImage {
            data: vec![1, 2, 3],
            mime_type: None,
        };
        let result = save_image(&image, "png", &out);
        assert!(matches!(result, Err(ImageError::ImageConversion(_))));
    }
}
