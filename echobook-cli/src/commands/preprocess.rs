//! Preprocess command implementation

use crate::input::FileReader;
use anyhow::{Context, Result};
use clap::Args;
use echobook_core::preprocess::{
    insert_numbered_chapter_markers, insert_reference_markers, insert_title_markers,
    join_inline_newlines,
};
use echobook_core::MarkerKind;
use std::path::PathBuf;

/// Arguments for the preprocess command
#[derive(Debug, Args)]
pub struct PreprocessArgs {
    /// Plain-text book
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Join single newlines inside a paragraph into spaces
    #[arg(long)]
    pub join_lines: bool,

    /// File listing subbook titles, one per line
    #[arg(long, value_name = "FILE")]
    pub subbook_titles: Option<PathBuf>,

    /// File listing chapter titles, one per line
    #[arg(long, value_name = "FILE")]
    pub chapter_titles: Option<PathBuf>,

    /// Mark every "Chapter N" line as a chapter
    #[arg(long)]
    pub numbered_chapters: bool,

    /// Move every chapter:verse locator onto its own REF marker line
    #[arg(long)]
    pub references: bool,
}

impl PreprocessArgs {
    /// Execute the preprocess command
    pub fn execute(&self) -> Result<()> {
        log::info!("Preprocessing {}", self.input.display());
        let text = FileReader::read_text(&self.input)?;
        let marked = self.apply(&text)?;

        match &self.output {
            Some(path) => {
                FileReader::write_text(path, &marked)?;
                println!("✓ Marked text written to {}", path.display());
            }
            None => print!("{marked}"),
        }
        Ok(())
    }

    /// Run the selected steps in pipeline order
    fn apply(&self, text: &str) -> Result<String> {
        let mut text = if self.join_lines {
            join_inline_newlines(text)
        } else {
            text.to_string()
        };

        if let Some(path) = &self.subbook_titles {
            let titles = FileReader::read_list(path)?;
            text = insert_title_markers(&text, &titles, MarkerKind::Subbook)
                .with_context(|| format!("Subbook titles from {}", path.display()))?;
        }
        if let Some(path) = &self.chapter_titles {
            let titles = FileReader::read_list(path)?;
            text = insert_title_markers(&text, &titles, MarkerKind::Chapter)
                .with_context(|| format!("Chapter titles from {}", path.display()))?;
        }
        if self.numbered_chapters {
            text = insert_numbered_chapter_markers(&text);
        }
        if self.references {
            text = insert_reference_markers(&text);
        }
        Ok(text)
    }
}
