//! Segmenter rules schema
//!
//! Rules are a TOML document. The English rules ship embedded; a custom file
//! can be loaded with [`SegmenterConfig::from_file`].

use crate::error::{EchoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

const ENGLISH_RULES: &str = include_str!("../../configs/segmenter/english.toml");

/// Root rules document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    pub metadata: Metadata,
    pub terminators: Terminators,
    pub ellipsis: Ellipsis,
    pub enclosures: Enclosures,
    #[serde(default)]
    pub abbreviations: Abbreviations,
    #[serde(default)]
    pub sentence_starters: SentenceStarters,
}

/// Rules metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub code: String,
    pub name: String,
}

/// Terminator characters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terminators {
    pub chars: Vec<char>,
}

/// Ellipsis handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipsis {
    #[serde(default = "default_true")]
    pub treat_as_boundary: bool,
    pub patterns: Vec<String>,
}

/// Enclosure pairs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enclosures {
    pub pairs: Vec<EnclosurePair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnclosurePair {
    pub open: char,
    pub close: char,
    #[serde(default)]
    pub symmetric: bool,
}

/// Abbreviations by category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Abbreviations {
    #[serde(flatten)]
    pub categories: HashMap<String, Vec<String>>,
}

/// Sentence starters by category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentenceStarters {
    #[serde(flatten)]
    pub categories: HashMap<String, Vec<String>>,
}

fn default_true() -> bool {
    true
}

impl SegmenterConfig {
    /// Parse a rules document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SegmenterConfig = toml::from_str(content)
            .map_err(|e| EchoError::Config(format!("Failed to parse segmenter rules: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a rules document from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EchoError::io(path, e))?;
        Self::from_toml(&content)
    }

    /// The embedded English rules
    pub fn english() -> Result<&'static SegmenterConfig> {
        static ENGLISH: OnceLock<std::result::Result<SegmenterConfig, String>> = OnceLock::new();
        ENGLISH
            .get_or_init(|| SegmenterConfig::from_toml(ENGLISH_RULES).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|e| EchoError::Config(e.clone()))
    }

    fn validate(&self) -> Result<()> {
        if self.metadata.code.is_empty() {
            return Err(EchoError::Config("Rules code is required".to_string()));
        }
        if self.terminators.chars.is_empty() {
            return Err(EchoError::Config(
                "No terminator characters defined".to_string(),
            ));
        }
        if self.ellipsis.patterns.iter().any(|p| p.is_empty()) {
            return Err(EchoError::Config("Empty ellipsis pattern".to_string()));
        }
        Ok(())
    }
}
