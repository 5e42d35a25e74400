//! CLI command implementations

use crate::config::CliConfig;
use anyhow::{Context, Result};
use clap::Subcommand;
use echobook_core::language::known_languages;
use echobook_core::{RuleSegmenter, WorkerPool};
use std::path::Path;

pub mod assemble;
pub mod audio;
pub mod extract;
pub mod init_config;
pub mod preprocess;
pub mod segment;
pub mod split;
pub mod translate;
pub mod validate;
pub mod verify;

/// Settings shared by every command
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub config: CliConfig,
    /// Suppress progress bars
    pub quiet: bool,
}

impl CommandContext {
    /// Segmenter from `rules`, the configured rules file, or the built-in English rules
    pub fn segmenter(&self, rules: Option<&Path>) -> Result<RuleSegmenter> {
        match rules.or(self.config.segmentation.rules.as_deref()) {
            Some(path) => {
                log::info!("Loading segmenter rules from {}", path.display());
                RuleSegmenter::from_file(path)
                    .with_context(|| format!("Failed to load rules: {}", path.display()))
            }
            None => RuleSegmenter::english().context("Failed to load built-in English rules"),
        }
    }

    /// Worker pool sized by the flag or the configuration
    pub fn pool(&self, threads: Option<usize>) -> Result<WorkerPool> {
        let threads = self.config.worker_threads(threads);
        log::debug!("Using {threads} worker threads");
        WorkerPool::new(threads).context("Failed to start worker pool")
    }
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Insert SUBBOOK, CHAPTER and REF markers into a plain-text book
    Preprocess(preprocess::PreprocessArgs),

    /// Split a marked book into one text file per chapter
    Extract(extract::ExtractArgs),

    /// Print the sentences of text files, for tuning segmenter rules
    Split(split::SplitArgs),

    /// Segment chapter text files into content records
    Segment(segment::SegmentArgs),

    /// Build the book structure file from the native content records
    Assemble(assemble::AssembleArgs),

    /// Translate the native content records into other languages
    Translate(translate::TranslateArgs),

    /// Synthesize one audio file per sentence
    Audio(audio::AudioArgs),

    /// Check every record against the content and structure schemas
    Validate(validate::ValidateArgs),

    /// Check that every record and audio file of a book exists
    Verify(verify::VerifyArgs),

    /// Write a commented echobook.toml template
    InitConfig(init_config::InitConfigArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List supported language codes
    Languages,
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self, context: &CommandContext) -> Result<()> {
        match self {
            Commands::Preprocess(args) => args.execute(),
            Commands::Extract(args) => args.execute(),
            Commands::Split(args) => args.execute(context),
            Commands::Segment(args) => args.execute(context),
            Commands::Assemble(args) => args.execute(context),
            Commands::Translate(args) => args.execute(context),
            Commands::Audio(args) => args.execute(context),
            Commands::Validate(args) => args.execute(),
            Commands::Verify(args) => args.execute(),
            Commands::InitConfig(args) => args.execute(),
            Commands::List { subcommand } => subcommand.execute(),
        }
    }
}

impl ListCommands {
    pub fn execute(&self) -> Result<()> {
        match self {
            ListCommands::Languages => {
                for line in language_lines() {
                    println!("{line}");
                }
            }
        }
        Ok(())
    }
}

fn language_lines() -> Vec<String> {
    known_languages()
        .map(|(code, name)| format!("{code}  {name}"))
        .collect()
}
