//! Locating chapter text files and content records on disk

use crate::error::{EchoError, Result};
use crate::language::{is_language_code, LanguageCode};
use crate::naming::{parse_chapter_text_filename, parse_subbook_folder, DEFAULT_SUBBOOK_FOLDER};
use glob::{glob_with, MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};

/// A chapter text file and where it belongs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSource {
    /// Path of the text file
    pub path: PathBuf,
    /// Subbook number, 1 for the default subbook
    pub subbook: u32,
    /// Subbook folder name used in the output tree
    pub subbook_folder: String,
    /// Chapter number from the filename
    pub chapter: u32,
}

/// Files under `root` matching a relative glob, case-insensitive, sorted
pub fn find_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = format!(
        "{}/{}",
        Pattern::escape(&root.to_string_lossy()),
        pattern
    );
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let paths = glob_with(&full, options)
        .map_err(|e| EchoError::Config(format!("Invalid glob pattern {full}: {e}")))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| EchoError::io(e.path().to_path_buf(), e.into_error()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Every `chapter<N>.txt` under `input`, in reading order (subbook, chapter)
pub fn discover_chapter_texts(input: &Path) -> Result<Vec<ChapterSource>> {
    let mut sources: Vec<ChapterSource> = find_files(input, "**/chapter*.txt")?
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let chapter = parse_chapter_text_filename(name)?;
            let (subbook, subbook_folder) = subbook_of(input, &path);
            Some(ChapterSource {
                path,
                subbook,
                subbook_folder,
                chapter,
            })
        })
        .collect();
    sources.sort_by(|a, b| {
        (a.subbook, a.chapter, &a.path).cmp(&(b.subbook, b.chapter, &b.path))
    });
    Ok(sources)
}

/// Subbook from the first path component below `root`, if it is a `N-Title` folder
fn subbook_of(root: &Path, path: &Path) -> (u32, String) {
    let first = path
        .strip_prefix(root)
        .ok()
        .and_then(|rel| {
            let mut components = rel.components();
            let first = components.next()?;
            // A bare file directly under root has no subbook folder
            components.next()?;
            first.as_os_str().to_str().map(str::to_string)
        });
    match first.as_deref().and_then(|f| parse_subbook_folder(f).map(|(n, _)| (n, f))) {
        Some((number, folder)) => (number, folder.to_string()),
        None => (1, DEFAULT_SUBBOOK_FOLDER.to_string()),
    }
}

/// Language folders (`xx-XX`) directly under a book directory, sorted
pub fn language_folders(book_dir: &Path) -> Result<Vec<LanguageCode>> {
    let entries = fs::read_dir(book_dir).map_err(|e| EchoError::io(book_dir, e))?;
    let mut languages = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| EchoError::io(book_dir, e))?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_language_code(name) {
                languages.push(LanguageCode::new(name)?);
            }
        }
    }
    languages.sort();
    Ok(languages)
}

/// Every JSON file under a `Content` directory
pub fn content_files(content_dir: &Path) -> Result<Vec<PathBuf>> {
    find_files(content_dir, "**/*.json")
}
