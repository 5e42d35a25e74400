//! Extract command implementation

use crate::input::FileReader;
use anyhow::{Context, Result};
use clap::Args;
use echobook_core::extract_chapters;
use echobook_core::extractor::write_units;
use std::path::PathBuf;

/// Arguments for the extract command
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Book text with SUBBOOK and CHAPTER markers
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Folder receiving one text file per chapter
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,
}

impl ExtractArgs {
    /// Execute the extract command
    pub fn execute(&self) -> Result<()> {
        log::info!("Extracting chapters from {}", self.input.display());
        let text = FileReader::read_text(&self.input)?;
        let extraction = extract_chapters(&text);

        let written = write_units(&extraction.units, &self.output)
            .with_context(|| format!("Failed to write chapters to {}", self.output.display()))?;

        println!(
            "✓ Extracted {} chapters into {}",
            written.len(),
            self.output.display()
        );
        if extraction.discarded_lines > 0 || !extraction.empty_chapters.is_empty() {
            println!(
                "  {} lines outside any chapter, {} empty chapters dropped",
                extraction.discarded_lines,
                extraction.empty_chapters.len()
            );
        }
        Ok(())
    }
}
