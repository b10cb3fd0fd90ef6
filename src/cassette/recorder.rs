//! Records interactions into a cassette file.

use std::path::PathBuf;

use chrono::Utc;

use super::format::{Cassette, Interaction};

/// Collects interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    provider: String,
    interactions: Vec<Interaction>,
    next_seq: u64,
}

impl CassetteRecorder {
    /// Create a new recorder that will write to the given path.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            provider: provider.into(),
            interactions: Vec::new(),
            next_seq: 0,
        }
    }

    /// Record an interaction. The `seq` field is assigned automatically.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        self.interactions.push(Interaction {
            seq: self.next_seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        });
        self.next_seq += 1;
    }

    /// Number of interactions recorded so far.
    #[must_use]
    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    /// Write everything recorded so far as a cassette YAML file. Can be
    /// called repeatedly; each call rewrites the whole file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let cassette = Cassette {
            name: self.name.clone(),
            recorded_at: Utc::now(),
            provider: Some(self.provider.clone()),
            interactions: self.interactions.clone(),
        };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_and_save() {
        let dir = std::env::temp_dir().join("promptforge_recorder_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("nested/test.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "test-recording", "stability");
        recorder.record(
            "image_generator",
            "generate",
            json!({"prompt": "a cat"}),
            json!({"Ok": {"kind": "hosted", "url": "https://x/cat.png"}}),
        );
        recorder.record(
            "image_generator",
            "generate",
            json!({"prompt": "a dog"}),
            json!({"Err": "API error (503): busy"}),
        );
        assert_eq!(recorder.interaction_count(), 2);

        let result_path = recorder.save().expect("save should succeed");
        assert_eq!(result_path, path);

        let content = std::fs::read_to_string(&path).unwrap();
        let cassette: Cassette = serde_yaml::from_str(&content).unwrap();
        assert_eq!(cassette.provider.as_deref(), Some("stability"));
        assert_eq!(cassette.interactions.len(), 2);
        assert_eq!(cassette.interactions[0].seq, 0);
        assert_eq!(cassette.interactions[1].seq, 1);
        assert_eq!(cassette.interactions[1].input["prompt"], "a dog");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
