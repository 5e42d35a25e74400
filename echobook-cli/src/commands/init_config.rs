//! Init-config command implementation

use crate::config::{template, DEFAULT_CONFIG_FILE};
use anyhow::{bail, Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Arguments for the init-config command
#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,

    /// Book code written into the template
    #[arg(long, value_name = "CODE", default_value = "BOOK")]
    pub book_code: String,

    /// Replace an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitConfigArgs {
    /// Execute the init-config command
    pub fn execute(&self) -> Result<()> {
        if self.output.exists() && !self.force {
            bail!(
                "{} already exists (use --force to replace it)",
                self.output.display()
            );
        }

        println!("Generating configuration template...");
        println!("  Book code: {}", self.book_code);
        println!("  Output file: {}", self.output.display());

        fs::write(&self.output, template(&self.book_code))
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        let config = self.output.display();
        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Fill in the [book] section and the languages to ship");
        println!("2. Split the marked book into chapters:");
        println!("   echobook extract -i book.txt -o texts");
        println!("3. Segment the chapters:");
        println!("   echobook -c {config} segment -i texts -o book");
        println!("4. Assemble, translate, narrate and check:");
        println!("   echobook -c {config} assemble -b book");
        println!("   echobook -c {config} translate -b book");
        println!("   echobook -c {config} audio -b book");
        println!("   echobook verify -b book");

        Ok(())
    }
}
