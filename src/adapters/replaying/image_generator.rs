//! Replaying adapter for the `ImageGenerator` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result, Replayed};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::ImageError;
use crate::ports::{GenerateFuture, ImageGenerator, ImageRef};

/// Serves recorded image generation results from a cassette.
pub struct ReplayingImageGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingImageGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ImageGenerator for ReplayingImageGenerator {
    fn generate(&self, _prompt: &str) -> GenerateFuture<'_> {
        let output = next_output(&self.replayer, "image_generator", "generate");
        Box::pin(async move {
            let output = output.map_err(ImageError::Replay)?;
            match replay_result::<ImageRef>(output) {
                Ok(Replayed::Ok(image)) => Ok(image),
                Ok(Replayed::Err(message)) => Err(restore_error(message)),
                Err(e) => Err(ImageError::Replay(format!(
                    "recorded output is not an image: {e}"
                ))),
            }
        })
    }
}

/// Rebuild a provider rejection from its recorded display form
/// (`API error (<status>): <message>`) so replays take the same error path
/// as the live call did.
fn restore_error(recorded: String) -> ImageError {
    let parsed = recorded.strip_prefix("API error (").and_then(|rest| {
        let (status, message) = rest.split_once("): ")?;
        Some((status.parse::<u16>().ok()?, message.to_string()))
    });
    match parsed {
        Some((status, message)) => ImageError::Api { status, message },
        None => ImageError::Replay(recorded),
    }
}
