//! Table-of-contents assembly from native content records

use crate::book::SkippedInput;
use crate::discovery::find_files;
use crate::error::{EchoError, Result};
use crate::language::LanguageCode;
use crate::model::{ChapterEntry, ChapterRecord, StructureRecord, SubBookEntry};
use crate::naming::{content_filename, parse_content_filename, parse_subbook_folder, DEFAULT_SUBBOOK_TITLE};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Book-level metadata supplied by configuration
#[derive(Debug, Clone, Default)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_image: String,
    pub book_code: String,
    /// Every language the book ships in
    pub languages: Vec<LanguageCode>,
    /// Defaults to `languages` when empty
    pub playback_order: Vec<LanguageCode>,
}

/// Assembled structure plus the chapter files that could not be used
#[derive(Debug, Clone)]
pub struct Assembly {
    pub structure: StructureRecord,
    pub skipped: Vec<SkippedInput>,
}

/// `{code}_structure.json`
pub fn structure_filename(book_code: &str) -> String {
    format!("{book_code}_structure.json")
}

/// Build the structure record from the native `Content` directory
pub fn assemble_structure(content_dir: &Path, meta: &BookMetadata) -> Result<Assembly> {
    let mut subbook_dirs: Vec<(u32, String, PathBuf)> = Vec::new();
    let entries = fs::read_dir(content_dir).map_err(|e| EchoError::io(content_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| EchoError::io(content_dir, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Some((number, title)) = entry.file_name().to_str().and_then(parse_subbook_folder) {
            subbook_dirs.push((number, title, path));
        }
    }
    subbook_dirs.sort_by(|a, b| (a.0, &a.2).cmp(&(b.0, &b.2)));

    let mut skipped = Vec::new();
    let sub_books = if subbook_dirs.is_empty() {
        debug!("No subbook folders, using top-level chapter files");
        let files = find_files(content_dir, "*.json")?;
        vec![subbook_entry(1, DEFAULT_SUBBOOK_TITLE.to_string(), files, meta, &mut skipped)]
    } else {
        let mut sub_books = Vec::with_capacity(subbook_dirs.len());
        for (number, title, dir) in subbook_dirs {
            let files = find_files(&dir, "**/*.json")?;
            sub_books.push(subbook_entry(number, title, files, meta, &mut skipped));
        }
        sub_books
    };

    let playback_order = if meta.playback_order.is_empty() {
        meta.languages.clone()
    } else {
        meta.playback_order.clone()
    };

    let structure = StructureRecord {
        book_id: Uuid::new_v4(),
        book_title: meta.title.clone(),
        author: meta.author.clone(),
        languages: meta.languages.clone(),
        book_description: meta.description.clone(),
        cover_image_name: meta.cover_image.clone(),
        book_code: meta.book_code.clone(),
        default_playback_order: playback_order,
        sub_books,
    };
    info!(
        "Assembled {} subbooks, {} chapters",
        structure.sub_books.len(),
        structure
            .sub_books
            .iter()
            .map(|s| s.chapters.len())
            .sum::<usize>()
    );
    Ok(Assembly { structure, skipped })
}

fn subbook_entry(
    number: u32,
    title: String,
    files: Vec<PathBuf>,
    meta: &BookMetadata,
    skipped: &mut Vec<SkippedInput>,
) -> SubBookEntry {
    let mut chapters = Vec::new();
    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((_, chapter_number)) = parse_content_filename(name, &meta.book_code) else {
            continue;
        };
        match ChapterRecord::read_from(&path) {
            Ok(record) => {
                if record.chapter_number != chapter_number {
                    warn!(
                        "{} says chapter {} but is named for chapter {}",
                        path.display(),
                        record.chapter_number,
                        chapter_number
                    );
                }
                chapters.push(chapter_entry(&record, number, chapter_number, meta));
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                skipped.push(SkippedInput {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }
    chapters.sort_by_key(|c| c.chapter_number);

    SubBookEntry {
        sub_book_id: Uuid::new_v4(),
        sub_book_number: number,
        sub_book_title: title,
        chapters,
    }
}

fn chapter_entry(
    record: &ChapterRecord,
    subbook: u32,
    chapter_number: u32,
    meta: &BookMetadata,
) -> ChapterEntry {
    ChapterEntry {
        chapter_id: record.chapter_id,
        chapter_number,
        chapter_title: record.chapter_title.clone(),
        total_paragraphs: record.paragraphs.len(),
        total_sentences: record.sentence_count(),
        content_references: meta
            .languages
            .iter()
            .map(|lang| {
                (
                    lang.clone(),
                    content_filename(&meta.book_code, subbook, chapter_number, lang),
                )
            })
            .collect(),
    }
}
