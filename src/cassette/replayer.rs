//! Replays recorded interactions from a cassette.

use std::collections::HashMap;

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Serves interactions from a loaded cassette sequentially per port/method
/// pair.
pub struct CassetteReplayer {
    queues: HashMap<PortMethodKey, Vec<Interaction>>,
    cursors: HashMap<PortMethodKey, usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, Vec<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push(interaction.clone());
        }
        let cursors = queues.keys().map(|k| (k.clone(), 0)).collect();
        Self { queues, cursors }
    }

    /// Return the next interaction for the given port and method.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette has no (more) interactions for the
    /// given port/method combination. A serving process must not die on a
    /// short cassette.
    pub fn next_interaction(
        &mut self,
        port: &str,
        method: &str,
    ) -> Result<&Interaction, String> {
        let key = PortMethodKey {
            port: port.to_string(),
            method: method.to_string(),
        };

        let Some(queue) = self.queues.get(&key) else {
            let mut available: Vec<String> = self
                .queues
                .keys()
                .map(|k| format!("{}::{}", k.port, k.method))
                .collect();
            available.sort();
            return Err(format!(
                "no interactions recorded for port={port:?} method={method:?}. \
                 Available port::method pairs: [{}]",
                available.join(", ")
            ));
        };

        let cursor = self.cursors.entry(key).or_insert(0);
        if *cursor >= queue.len() {
            return Err(format!(
                "cassette exhausted: all {} interactions for port={port:?} method={method:?} \
                 have been consumed",
                queue.len()
            ));
        }

        let interaction = &queue[*cursor];
        *cursor += 1;
        Ok(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, prompt: &str) -> Interaction {
        Interaction {
            seq,
            port: "image_generator".into(),
            method: "generate".into(),
            input: json!({"prompt": prompt}),
            output: json!({"Ok": {"kind": "hosted", "url": "https://x/y.png"}}),
        }
    }

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            provider: None,
            interactions,
        }
    }

    #[test]
    fn replay_in_order() {
        let cassette = make_cassette(vec![interaction(0, "first"), interaction(1, "second")]);
        let mut replayer = CassetteReplayer::new(&cassette);

        let first = replayer.next_interaction("image_generator", "generate");
        assert_eq!(first.unwrap().seq, 0);
        let second = replayer.next_interaction("image_generator", "generate");
        assert_eq!(second.unwrap().seq, 1);
    }

    #[test]
    fn exhausted_replayer_errors() {
        let cassette = make_cassette(vec![interaction(0, "only")]);
        let mut replayer = CassetteReplayer::new(&cassette);
        assert!(replayer
            .next_interaction("image_generator", "generate")
            .is_ok());

        let err = replayer.next_interaction("image_generator", "generate").unwrap_err();
        assert!(err.contains("cassette exhausted"));
    }

    #[test]
    fn unknown_port_errors() {
        let cassette = make_cassette(vec![interaction(0, "only")]);
        let mut replayer = CassetteReplayer::new(&cassette);

        let err = replayer.next_interaction("unknown", "method").unwrap_err();
        assert!(err.contains("no interactions recorded"));
        assert!(err.contains("image_generator::generate"));
    }
}
