//! Service context that bundles the generator port for the server.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::modelslab::ModelsLabGenerator;
use crate::adapters::live::stability::StabilityGenerator;
use crate::adapters::recording::image_generator::RecordingImageGenerator;
use crate::adapters::replaying::image_generator::ReplayingImageGenerator;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::Config;
use crate::error::ImageError;
use crate::ports::ImageGenerator;
use crate::provider::Provider;

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct ServiceContext {
    /// Image generator port.
    pub generator: Arc<dyn ImageGenerator>,
    /// Provider name reported by the health endpoint.
    pub provider: String,
}

/// Handle to a recording session that is saved when the server stops.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write the cassette recorded so far to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn save(&self) -> Result<PathBuf, String> {
        let recorder = self
            .recorder
            .lock()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        tracing::info!(
            "Writing {} recorded interactions",
            recorder.interaction_count()
        );
        recorder
            .save()
            .map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Wrap an arbitrary generator, e.g. a test double.
    #[must_use]
    pub fn new(generator: Arc<dyn ImageGenerator>, provider: impl Into<String>) -> Self {
        Self {
            generator,
            provider: provider.into(),
        }
    }

    /// Create a live context for the given provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not configured.
    pub fn live(provider: Provider, config: &Config) -> Result<Self, ImageError> {
        let generator = live_generator(provider, config)?;
        Ok(Self::new(Arc::from(generator), provider.to_string()))
    }

    /// Create a recording context that wraps a live adapter with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the live adapter cannot be built.
    pub fn recording(
        provider: Provider,
        config: &Config,
    ) -> Result<(Self, RecordingSession), ImageError> {
        let live = live_generator(provider, config)?;

        let timestamp = chrono::Utc::now()
            .format("%Y-%m-%dT%H-%M-%S")
            .to_string();
        let path = PathBuf::from(".promptforge/cassettes")
            .join(&timestamp)
            .join("image_generator.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-image_generator"),
            provider.name(),
        )));

        let generator = RecordingImageGenerator::new(live, Arc::clone(&recorder));
        let ctx = Self::new(Arc::new(generator), provider.to_string());
        Ok((ctx, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file. No API key needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, ImageError> {
        let replayer = load_cassette(path).map_err(ImageError::Config)?;
        let generator = ReplayingImageGenerator::new(Arc::new(Mutex::new(replayer)));
        Ok(Self::new(Arc::new(generator), "replay"))
    }
}

/// Build the live adapter for `provider`, with the key and endpoint taken
/// from `config`.
fn live_generator(
    provider: Provider,
    config: &Config,
) -> Result<Box<dyn ImageGenerator>, ImageError> {
    let key = config.api_key(provider).ok_or_else(|| ImageError::MissingApiKey {
        provider: provider.display_name().into(),
        env_var: provider.env_var().into(),
    })?;
    let endpoint = config.provider.endpoint.clone();

    let generator: Box<dyn ImageGenerator> = match provider {
        Provider::Stability => {
            let live = StabilityGenerator::new(key);
            Box::new(match endpoint {
                Some(url) => live.with_endpoint(url),
                None => live,
            })
        }
        Provider::ModelsLab => {
            let live = ModelsLabGenerator::new(key);
            Box::new(match endpoint {
                Some(url) => live.with_endpoint(url),
                None => live,
            })
        }
    };
    Ok(generator)
}
