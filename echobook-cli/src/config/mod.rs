//! Configuration module
//!
//! `echobook.toml` holds book metadata and service settings shared by every
//! stage. Every section is optional; command-line flags override file values.

use crate::error::CliError;
use anyhow::{Context, Result};
use echobook_core::language::{parse_language_list, LanguageCode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "echobook.toml";

/// CLI configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct CliConfig {
    /// Book metadata
    #[serde(default)]
    pub book: BookConfig,

    /// Segmentation settings
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Remote service settings
    #[serde(default)]
    pub services: ServicesConfig,

    /// Translation settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Speech settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Performance configuration
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Book metadata
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BookConfig {
    /// Short code used in every filename
    pub code: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_image: String,
    /// Language the book is written in
    pub native_language: String,
    /// Every language the book ships in
    pub languages: Vec<String>,
    /// Default playback order; empty means `languages`
    pub playback_order: Vec<String>,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            code: String::new(),
            title: String::new(),
            author: String::new(),
            description: String::new(),
            cover_image: String::new(),
            native_language: "en-US".to_string(),
            languages: Vec::new(),
            playback_order: Vec::new(),
        }
    }
}

/// Segmentation settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Draft chapters in parallel before assigning indices
    pub parallel: bool,

    /// External segmenter rules file replacing the built-in English rules
    pub rules: Option<PathBuf>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            rules: None,
        }
    }
}

/// Remote service settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_base: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Translation settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub model: String,
    pub temperature: f32,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.0,
        }
    }
}

/// Speech settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioConfig {
    pub model: String,
    pub voice: String,
    /// Response format; also the audio file extension
    pub format: String,
    /// Regenerate audio files that already exist
    pub overwrite: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            model: "tts-1-hd".to_string(),
            voice: "alloy".to_string(),
            format: "aac".to_string(),
            overwrite: false,
        }
    }
}

/// Performance-related configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of worker threads (0 = auto)
    pub worker_threads: usize,
}

impl CliConfig {
    /// Parse a configuration document
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CliError::ConfigError(e.to_string()))
            .context("Failed to parse configuration")
    }

    /// Load `path`, or `echobook.toml` in the working directory when present,
    /// or the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::FileNotFound(path.display().to_string()).into());
                }
                path.to_path_buf()
            }
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    log::debug!("No {DEFAULT_CONFIG_FILE}, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };
        log::info!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("In {}", path.display()))
    }

    /// Native language, from the flag or the config
    pub fn native_language(&self, flag: Option<&str>) -> Result<LanguageCode> {
        let code = flag.unwrap_or(&self.book.native_language);
        LanguageCode::new(code).context("Invalid native language")
    }

    /// Book code, from the flag or the config
    pub fn book_code(&self, flag: Option<&str>) -> Result<String> {
        let code = flag.unwrap_or(&self.book.code).trim();
        if code.is_empty() {
            return Err(CliError::MissingSetting("book.code".to_string()).into());
        }
        Ok(code.to_string())
    }

    /// Book languages, from a comma-separated flag or the config
    pub fn languages(&self, flag: Option<&str>) -> Result<Vec<LanguageCode>> {
        match flag {
            Some(list) => parse_language_list(list).context("Invalid language list"),
            None => self
                .book
                .languages
                .iter()
                .map(|code| LanguageCode::new(code.as_str()))
                .collect::<Result<Vec<_>, _>>()
                .context("Invalid language in book.languages"),
        }
    }

    /// Playback order, from a comma-separated flag or the config
    pub fn playback_order(&self, flag: Option<&str>) -> Result<Vec<LanguageCode>> {
        match flag {
            Some(list) => parse_language_list(list).context("Invalid playback order"),
            None => self
                .book
                .playback_order
                .iter()
                .map(|code| LanguageCode::new(code.as_str()))
                .collect::<Result<Vec<_>, _>>()
                .context("Invalid language in book.playback_order"),
        }
    }

    /// Worker thread count, flag first; 0 means one per CPU
    pub fn worker_threads(&self, flag: Option<usize>) -> usize {
        match flag.unwrap_or(self.performance.worker_threads) {
            0 => num_cpus::get(),
            n => n,
        }
    }
}

/// Commented template written by `echobook init-config`
pub fn template(book_code: &str) -> String {
    format!(
        r#"# echobook configuration
#
# Every value can be overridden by the matching command-line flag.

[book]
# Short code used in every content and audio filename
code = "{book_code}"
title = ""
author = ""
description = ""
cover_image = ""
# Language the book is written in (pattern xx-XX)
native_language = "en-US"
# Every language the book ships in, native first
languages = ["en-US"]
# Playback order; leave empty to use `languages`
playback_order = []

[segmentation]
# Draft chapters in parallel, then assign sentence indices in reading order
parallel = true
# Optional segmenter rules file replacing the built-in English rules
# rules = "rules/english.toml"

[services]
# Any OpenAI-compatible endpoint
api_base = "https://api.openai.com/v1"
# Name of the environment variable holding the API key
api_key_env = "OPENAI_API_KEY"
timeout_secs = 60

[translation]
model = "gpt-4"
temperature = 0.0

[audio]
model = "tts-1-hd"
voice = "alloy"
format = "aac"
# Regenerate files that already exist
overwrite = false

[performance]
# Number of worker threads (0 = one per CPU)
worker_threads = 0
"#
    )
}
