use std::collections::HashSet;

use serde::Deserialize;

use crate::error::LinkError;
use crate::model::PublisherIdentity;

/// Default minimum score for a note to be attached to a game (inclusive).
pub const DEFAULT_NOTE_THRESHOLD: f64 = 0.85;
/// Default similarity a publisher name must exceed to be equivalent (exclusive).
pub const DEFAULT_PUBLISHER_SIMILARITY: f64 = 0.9;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    pub name: String,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub inputs: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub publishers: Vec<PublisherIdentity>,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_note_threshold")]
    pub note_threshold: f64,
    #[serde(default = "default_publisher_similarity")]
    pub publisher_similarity: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            note_threshold: DEFAULT_NOTE_THRESHOLD,
            publisher_similarity: DEFAULT_PUBLISHER_SIMILARITY,
        }
    }
}

fn default_note_threshold() -> f64 {
    DEFAULT_NOTE_THRESHOLD
}

fn default_publisher_similarity() -> f64 {
    DEFAULT_PUBLISHER_SIMILARITY
}

// ---------------------------------------------------------------------------
// Inputs + Output
// ---------------------------------------------------------------------------

/// Input file locations, relative to the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub games: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub profiles: Option<String>,
    /// Directory of `<SYMBOL>.csv` price files.
    #[serde(default)]
    pub history: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl LinkConfig {
    pub fn from_toml(input: &str) -> Result<Self, LinkError> {
        let config: LinkConfig =
            toml::from_str(input).map_err(|e| LinkError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LinkError> {
        let m = &self.matching;
        // Scores carry a date adjustment of up to +0.30, so thresholds above 1.0 are meaningful.
        if !(0.0..=2.0).contains(&m.note_threshold) {
            return Err(LinkError::ConfigValidation(format!(
                "matching.note_threshold must be within 0..=2, got {}",
                m.note_threshold
            )));
        }
        if !(0.0..=1.0).contains(&m.publisher_similarity) {
            return Err(LinkError::ConfigValidation(format!(
                "matching.publisher_similarity must be within 0..=1, got {}",
                m.publisher_similarity
            )));
        }

        if self.publishers.is_empty() {
            return Err(LinkError::ConfigValidation(
                "at least 1 publisher is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for (i, p) in self.publishers.iter().enumerate() {
            if p.name.trim().is_empty() {
                return Err(LinkError::ConfigValidation(format!(
                    "publisher #{}: name is empty",
                    i + 1
                )));
            }
            if p.symbol.trim().is_empty() {
                return Err(LinkError::ConfigValidation(format!(
                    "publisher '{}': symbol is empty",
                    p.name
                )));
            }
            if !seen.insert(p.symbol.to_ascii_uppercase()) {
                return Err(LinkError::ConfigValidation(format!(
                    "publisher '{}': duplicate symbol '{}'",
                    p.name, p.symbol
                )));
            }
        }

        Ok(())
    }

    /// Keep only the publishers whose symbol is listed, in config order.
    pub fn retain_publishers(&mut self, symbols: &[String]) -> Result<(), LinkError> {
        for symbol in symbols {
            if !self
                .publishers
                .iter()
                .any(|p| p.symbol.eq_ignore_ascii_case(symbol))
            {
                return Err(LinkError::UnknownPublisher(symbol.clone()));
            }
        }
        self.publishers
            .retain(|p| symbols.iter().any(|s| p.symbol.eq_ignore_ascii_case(s)));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
