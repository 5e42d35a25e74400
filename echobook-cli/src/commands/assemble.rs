//! Assemble command implementation

use super::CommandContext;
use anyhow::{Context, Result};
use clap::Args;
use echobook_core::book::CONTENT_DIR;
use echobook_core::structure::structure_filename;
use echobook_core::{assemble_structure, BookMetadata};
use std::path::PathBuf;

/// Arguments for the assemble command
#[derive(Debug, Args)]
pub struct AssembleArgs {
    /// Book folder holding {language}/Content
    #[arg(short, long, value_name = "DIR")]
    pub book: PathBuf,

    /// Output file (default: {book}/{code}_structure.json)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Book code [config: book.code]
    #[arg(long, value_name = "CODE")]
    pub book_code: Option<String>,

    /// Native language whose records are read [config: book.native_language]
    #[arg(short, long, value_name = "CODE")]
    pub native: Option<String>,

    /// Comma-separated languages of the book [config: book.languages]
    #[arg(short, long, value_name = "LIST")]
    pub languages: Option<String>,

    /// Comma-separated default playback order [config: book.playback_order]
    #[arg(long, value_name = "LIST")]
    pub playback_order: Option<String>,

    /// Book title [config: book.title]
    #[arg(long)]
    pub title: Option<String>,

    /// Author [config: book.author]
    #[arg(long)]
    pub author: Option<String>,

    /// Description [config: book.description]
    #[arg(long)]
    pub description: Option<String>,

    /// Cover image filename [config: book.cover_image]
    #[arg(long, value_name = "FILE")]
    pub cover_image: Option<String>,
}

impl AssembleArgs {
    /// Execute the assemble command
    pub fn execute(&self, context: &CommandContext) -> Result<()> {
        let meta = self.metadata(context)?;
        let native = context.config.native_language(self.native.as_deref())?;
        let content_dir = self.book.join(native.as_str()).join(CONTENT_DIR);
        log::info!("Assembling structure from {}", content_dir.display());

        let assembly = assemble_structure(&content_dir, &meta)
            .with_context(|| format!("Failed to assemble {}", content_dir.display()))?;
        for skipped in &assembly.skipped {
            println!("  Skipped {}: {}", skipped.path.display(), skipped.reason);
        }

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| self.book.join(structure_filename(&meta.book_code)));
        assembly
            .structure
            .write_to(&output)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        let chapters: usize = assembly
            .structure
            .sub_books
            .iter()
            .map(|s| s.chapters.len())
            .sum();
        println!(
            "✓ Structure with {} subbooks and {chapters} chapters written to {}",
            assembly.structure.sub_books.len(),
            output.display()
        );
        Ok(())
    }

    /// Book metadata, flags over config. Languages default to the native one.
    fn metadata(&self, context: &CommandContext) -> Result<BookMetadata> {
        let config = &context.config;
        let book = &config.book;
        let pick = |flag: &Option<String>, value: &str| flag.clone().unwrap_or_else(|| value.to_string());

        let mut languages = config.languages(self.languages.as_deref())?;
        if languages.is_empty() {
            languages.push(config.native_language(self.native.as_deref())?);
        }

        Ok(BookMetadata {
            title: pick(&self.title, &book.title),
            author: pick(&self.author, &book.author),
            description: pick(&self.description, &book.description),
            cover_image: pick(&self.cover_image, &book.cover_image),
            book_code: config.book_code(self.book_code.as_deref())?,
            languages,
            playback_order: config.playback_order(self.playback_order.as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echobook_core::engine::{ChapterCoordinates, SentenceCounter};
    use echobook_core::{LanguageCode, SegmentationEngine, StructureRecord};
    use tempfile::TempDir;

    fn args(book: PathBuf) -> AssembleArgs {
        AssembleArgs {
            book,
            output: None,
            book_code: Some("BOOKM".to_string()),
            native: None,
            languages: None,
            playback_order: None,
            title: Some("The Book".to_string()),
            author: None,
            description: None,
            cover_image: None,
        }
    }

    #[test]
    fn test_metadata_flags_over_config() {
        let mut context = CommandContext::default();
        context.config.book.author = "Config Author".to_string();
        context.config.book.title = "Config Title".to_string();
        context.config.book.languages = vec!["en-US".to_string(), "es-ES".to_string()];

        let meta = args(PathBuf::from("book")).metadata(&context).unwrap();
        assert_eq!(meta.title, "The Book");
        assert_eq!(meta.author, "Config Author");
        assert_eq!(meta.languages.len(), 2);
        assert!(meta.playback_order.is_empty());
    }

    #[test]
    fn test_languages_default_to_native() {
        let meta = args(PathBuf::from("book"))
            .metadata(&CommandContext::default())
            .unwrap();
        assert_eq!(meta.languages, vec![LanguageCode::new("en-US").unwrap()]);
    }

    #[test]
    fn test_execute_writes_structure() {
        let dir = TempDir::new().unwrap();
        let coords = ChapterCoordinates {
            book_code: "BOOKM".to_string(),
            subbook: 1,
            chapter: 1,
            language: LanguageCode::new("en-US").unwrap(),
        };
        let record = SegmentationEngine::english()
            .unwrap()
            .process_chapter("Opening\n\nFirst words.", &coords, &mut SentenceCounter::new())
            .unwrap();
        record
            .write_to(
                &dir.path()
                    .join("en-US/Content/1-Genesis/Chapter1/BOOKM_S1_C1_en-US.json"),
            )
            .unwrap();

        args(dir.path().to_path_buf())
            .execute(&CommandContext::default())
            .unwrap();

        let structure =
            StructureRecord::read_from(&dir.path().join("BOOKM_structure.json")).unwrap();
        assert_eq!(structure.book_title, "The Book");
        assert_eq!(structure.sub_books[0].sub_book_title, "Genesis");
        assert_eq!(structure.sub_books[0].chapters[0].chapter_id, record.chapter_id);
        assert_eq!(structure.sub_books[0].chapters[0].total_sentences, 1);
    }
}
