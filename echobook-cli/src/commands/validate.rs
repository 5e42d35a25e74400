//! Validate command implementation

use crate::error::CliError;
use anyhow::{Context, Result};
use clap::Args;
use echobook_core::{validate_book, ValidationReport};
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Book folder holding the structure file and language folders
    #[arg(short, long, value_name = "DIR")]
    pub book: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        log::info!("Validating {}", self.book.display());
        let report = validate_book(&self.book)
            .with_context(|| format!("Failed to validate {}", self.book.display()))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }

        if report.is_valid() {
            Ok(())
        } else {
            Err(CliError::Defects(report.violation_count()).into())
        }
    }
}

fn print_report(report: &ValidationReport) {
    for problem in &report.book {
        println!("✗ {problem}");
    }
    for file in &report.files {
        println!("✗ {}", file.path.display());
        for violation in &file.violations {
            let pointer = if violation.pointer.is_empty() {
                "/"
            } else {
                violation.pointer.as_str()
            };
            println!("    {pointer}: {}", violation.message);
        }
    }
    if report.is_valid() {
        println!("✓ {} files valid", report.files_checked);
    } else {
        println!(
            "{} problems in {} checked files",
            report.violation_count(),
            report.files_checked
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_book_reports_defects() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("en-US/Content")).unwrap();
        let args = ValidateArgs {
            book: dir.path().to_path_buf(),
            json: false,
        };
        let err = args.execute().unwrap_err();
        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::Defects(_))));
    }
}
