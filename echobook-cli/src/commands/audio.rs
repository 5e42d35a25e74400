//! Audio command implementation

use super::CommandContext;
use crate::progress::ProgressReporter;
use crate::remote::{OpenAiClient, SpeechClient};
use anyhow::{Context, Result};
use clap::Args;
use echobook_core::language::parse_language_list;
use echobook_core::{AudioJob, AudioReport, SpeechSynthesizer};
use std::path::PathBuf;

/// Arguments for the audio command
#[derive(Debug, Args)]
pub struct AudioArgs {
    /// Book folder holding the language folders
    #[arg(short, long, value_name = "DIR")]
    pub book: PathBuf,

    /// Comma-separated languages to narrate (default: every language folder)
    #[arg(short, long, value_name = "LIST")]
    pub languages: Option<String>,

    /// Regenerate files that already exist [config: audio.overwrite]
    #[arg(long)]
    pub overwrite: bool,

    /// Voice [config: audio.voice]
    #[arg(long)]
    pub voice: Option<String>,

    /// Speech model [config: audio.model]
    #[arg(long)]
    pub model: Option<String>,

    /// Concurrent requests
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,
}

impl AudioArgs {
    /// Execute the audio command
    pub fn execute(&self, context: &CommandContext) -> Result<()> {
        let mut settings = context.config.audio.clone();
        if let Some(voice) = &self.voice {
            settings.voice = voice.clone();
        }
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        let client = OpenAiClient::from_config(&context.config.services)?;
        let speech = SpeechClient::new(client, &settings);
        log::info!("Synthesizing with {} ({})", settings.model, settings.voice);

        let report = self.run(&speech, context)?;
        print_summary(&report);
        Ok(())
    }

    /// Narrate the book with any synthesizer
    pub fn run(&self, synthesizer: &dyn SpeechSynthesizer, context: &CommandContext) -> Result<AudioReport> {
        let languages = match &self.languages {
            Some(list) => parse_language_list(list).context("Invalid language list")?,
            None => Vec::new(),
        };
        let job = AudioJob {
            book_dir: self.book.clone(),
            languages,
            overwrite: self.overwrite || context.config.audio.overwrite,
        };
        let pool = context.pool(self.threads)?;

        let mut progress = ProgressReporter::new(context.quiet);
        progress.init(0, "sentences");
        let report = job
            .run_with_progress(
                synthesizer,
                &pool,
                |planned| progress.set_total(planned as u64),
                || progress.tick(),
            )
            .with_context(|| format!("Failed to generate audio for {}", self.book.display()))?;
        progress.finish();
        Ok(report)
    }
}

fn print_summary(report: &AudioReport) {
    println!(
        "✓ Wrote {} audio files ({} already present)",
        report.written, report.existing
    );
    if report.skipped_sentences > 0 {
        println!(
            "  {} sentences without text or audio filename were skipped",
            report.skipped_sentences
        );
    }
    for failure in &report.failed {
        println!("  Failed {}: {}", failure.path.display(), failure.error);
    }
    for skipped in &report.skipped_files {
        println!("  Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
}
