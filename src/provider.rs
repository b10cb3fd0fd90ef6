//! Provider name resolution.

use std::fmt;
use std::str::FromStr;

/// Supported image generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Stability AI stable-image API (binary image response).
    Stability,
    /// `ModelsLab` text2img API (JSON response with a hosted URL).
    ModelsLab,
}

/// Short name aliases accepted in config files and flags.
const ALIASES: &[(&str, Provider)] = &[
    ("stability", Provider::Stability),
    ("stability-ai", Provider::Stability),
    ("stable-diffusion", Provider::Stability),
    ("sd", Provider::Stability),
    ("modelslab", Provider::ModelsLab),
    ("stablediffusionapi", Provider::ModelsLab),
];

impl Provider {
    /// Canonical lowercase name, as reported by the health endpoint.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Stability => "stability",
            Self::ModelsLab => "modelslab",
        }
    }

    /// Human-readable provider name for error messages.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Stability => "Stability",
            Self::ModelsLab => "ModelsLab",
        }
    }

    /// Environment variable holding this provider's API key.
    #[must_use]
    pub fn env_var(self) -> &'static str {
        match self {
            Self::Stability => "STABILITY_API_KEY",
            Self::ModelsLab => "MODELSLAB_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == needle)
            .map(|&(_, provider)| provider)
            .ok_or_else(|| {
                format!("Unknown provider '{s}'. Expected 'stability' or 'modelslab'.")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_names() {
        assert_eq!(
            "stability".parse::<Provider>().unwrap(),
            Provider::Stability
        );
        assert_eq!(
            "modelslab".parse::<Provider>().unwrap(),
            Provider::ModelsLab
        );
    }

    #[test]
    fn parse_aliases_case_insensitive() {
        assert_eq!("SD".parse::<Provider>().unwrap(), Provider::Stability);
        assert_eq!(
            " Stable-Diffusion ".parse::<Provider>().unwrap(),
            Provider::Stability
        );
        assert_eq!(
            "StableDiffusionAPI".parse::<Provider>().unwrap(),
            Provider::ModelsLab
        );
    }

    #[test]
    fn parse_unknown_provider() {
        let err = "dall-e".parse::<Provider>().unwrap_err();
        assert!(err.contains("Unknown provider"));
    }

    #[test]
    fn env_vars() {
        assert_eq!(Provider::Stability.env_var(), "STABILITY_API_KEY");
        assert_eq!(Provider::ModelsLab.env_var(), "MODELSLAB_API_KEY");
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(Provider::ModelsLab.to_string(), "modelslab");
    }
}
