//! Verify command implementation

use crate::error::CliError;
use anyhow::{Context, Result};
use clap::Args;
use echobook_core::{verify_book, VerificationReport};
use std::path::PathBuf;

/// Arguments for the verify command
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Book folder holding the structure file and language folders
    #[arg(short, long, value_name = "DIR")]
    pub book: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl VerifyArgs {
    /// Execute the verify command
    pub fn execute(&self) -> Result<()> {
        log::info!("Verifying {}", self.book.display());
        let report = verify_book(&self.book)
            .with_context(|| format!("Failed to verify {}", self.book.display()))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }

        if report.is_complete() {
            Ok(())
        } else {
            Err(CliError::Defects(report.defects.len()).into())
        }
    }
}

fn print_report(report: &VerificationReport) {
    let languages: Vec<&str> = report.languages.iter().map(|l| l.as_str()).collect();
    println!("Languages: {}", languages.join(", "));
    println!(
        "Checked {} chapter files and {} audio files",
        report.chapters_checked, report.audio_checked
    );
    for defect in &report.defects {
        println!("✗ {defect}");
    }
    if report.is_complete() {
        println!("✓ Book is complete");
    }
}
