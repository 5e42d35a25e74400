//! echobook CLI library
//!
//! This library provides the command-line interface for the echobook
//! pipeline: marker preprocessing, chapter extraction, sentence
//! segmentation, structure assembly, translation, speech synthesis and
//! the final validation and verification checks.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;
pub mod remote;

pub use error::{CliError, CliResult};
