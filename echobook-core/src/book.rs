//! Whole-book segmentation run
//!
//! Discovers chapter text files, runs the engine over them in reading order
//! with one [`SentenceCounter`], and writes the native-language content tree:
//! `{out}/{lang}/Content/{subbook}/Chapter{N}/{book}_S{s}_C{N}_{lang}.json`.

use crate::discovery::{discover_chapter_texts, ChapterSource};
use crate::engine::{ChapterCoordinates, ChapterDraft, SegmentationEngine, SentenceCounter};
use crate::error::Result;
use crate::language::LanguageCode;
use crate::model::ChapterRecord;
use crate::naming::{chapter_folder, content_filename};
use crate::pool::WorkerPool;
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Folder holding content records under a language folder
pub const CONTENT_DIR: &str = "Content";

/// Folder holding audio under a language folder
pub const AUDIO_DIR: &str = "Audio";

/// Settings for one book run
#[derive(Debug, Clone)]
pub struct BookRunConfig {
    /// Folder of chapter text files
    pub input_dir: PathBuf,
    /// Book folder; the language folder is created inside it
    pub output_dir: PathBuf,
    /// Book code used in filenames
    pub book_code: String,
    /// Native language
    pub language: LanguageCode,
}

/// An input that produced no record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedInput {
    pub path: PathBuf,
    pub reason: String,
}

/// A written chapter record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenChapter {
    pub path: PathBuf,
    pub subbook: u32,
    pub chapter: u32,
    pub paragraphs: usize,
    pub sentences: usize,
}

/// Outcome of a book run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookRunReport {
    pub chapters: Vec<WrittenChapter>,
    /// Total global indices handed out
    pub sentences: u64,
    pub skipped: Vec<SkippedInput>,
}

/// Where a record for `source` is written
pub fn content_path(
    output_dir: &Path,
    language: &LanguageCode,
    book_code: &str,
    source: &ChapterSource,
) -> PathBuf {
    output_dir
        .join(language.as_str())
        .join(CONTENT_DIR)
        .join(&source.subbook_folder)
        .join(chapter_folder(source.chapter))
        .join(content_filename(
            book_code,
            source.subbook,
            source.chapter,
            language,
        ))
}

/// Segments every chapter of a book
#[derive(Debug, Clone)]
pub struct BookRun {
    engine: SegmentationEngine,
    config: BookRunConfig,
}

impl BookRun {
    pub fn new(engine: SegmentationEngine, config: BookRunConfig) -> Self {
        Self { engine, config }
    }

    /// Run the book. With a pool, drafts are built in parallel; identity
    /// assignment is always sequential in reading order.
    pub fn run(&self, pool: Option<&WorkerPool>) -> Result<BookRunReport> {
        let sources = discover_chapter_texts(&self.config.input_dir)?;
        info!(
            "Found {} chapter files under {}",
            sources.len(),
            self.config.input_dir.display()
        );

        let drafts: Vec<std::result::Result<ChapterDraft, String>> = match pool {
            Some(pool) => pool.map(sources.clone(), |s| self.draft_source(&s)),
            None => sources.iter().map(|s| self.draft_source(s)).collect(),
        };

        let mut report = BookRunReport::default();
        let mut counter = SentenceCounter::new();

        for (source, draft) in sources.iter().zip(drafts) {
            let draft = match draft {
                Ok(draft) => draft,
                Err(reason) => {
                    warn!("Skipping {}: {}", source.path.display(), reason);
                    report.skipped.push(SkippedInput {
                        path: source.path.clone(),
                        reason,
                    });
                    continue;
                }
            };
            let record = draft.assign(&self.coordinates(source), &mut counter);
            let path = content_path(
                &self.config.output_dir,
                &self.config.language,
                &self.config.book_code,
                source,
            );
            record.write_to(&path)?;
            info!(
                "Chapter {} of subbook {}: {} sentences -> {}",
                source.chapter,
                source.subbook,
                record.sentence_count(),
                path.display()
            );
            report.chapters.push(written(&record, source, path));
        }

        report.sentences = counter.assigned();
        Ok(report)
    }

    fn coordinates(&self, source: &ChapterSource) -> ChapterCoordinates {
        ChapterCoordinates {
            book_code: self.config.book_code.clone(),
            subbook: source.subbook,
            chapter: source.chapter,
            language: self.config.language.clone(),
        }
    }

    fn draft_source(&self, source: &ChapterSource) -> std::result::Result<ChapterDraft, String> {
        let text = fs::read_to_string(&source.path).map_err(|e| format!("unreadable: {e}"))?;
        self.engine
            .draft(text.trim_start_matches('\u{feff}'))
            .ok_or_else(|| "empty chapter file".to_string())
    }
}

fn written(record: &ChapterRecord, source: &ChapterSource, path: PathBuf) -> WrittenChapter {
    WrittenChapter {
        path,
        subbook: source.subbook,
        chapter: source.chapter,
        paragraphs: record.paragraphs.len(),
        sentences: record.sentence_count(),
    }
}
