//! File naming conventions shared by every stage
//!
//! Audio files: `{global:07}_{book}_S{subbook}_C{chapter}_P{paragraph}_S{sentence}_{lang}.aac`
//! Content files: `{book}_S{subbook}_C{chapter}_{lang}.json`
//! Chapter text files: `chapter{N}.txt`, inside optional `{N}-{title}` subbook folders.

use crate::language::LanguageCode;
use regex::Regex;
use std::sync::OnceLock;

/// Name of the synthetic subbook folder used when a book has no subbooks
pub const DEFAULT_SUBBOOK_FOLDER: &str = "1-Default";

/// Title of the synthetic subbook
pub const DEFAULT_SUBBOOK_TITLE: &str = "Default";

/// Full coordinate tuple identifying one sentence's audio file
#[derive(Debug, Clone, Copy)]
pub struct AudioCoordinates<'a> {
    /// 1-based position across the whole book
    pub global_index: u64,
    /// Book code, e.g. `BOOKM`
    pub book_code: &'a str,
    /// Subbook number
    pub subbook: u32,
    /// Chapter number
    pub chapter: u32,
    /// Paragraph number within the chapter
    pub paragraph: u32,
    /// Sentence number within the paragraph
    pub sentence: u32,
    /// Language of the audio
    pub language: &'a LanguageCode,
}

/// Derive the audio filename for a sentence
pub fn audio_filename(c: &AudioCoordinates<'_>) -> String {
    format!(
        "{:07}_{}_S{}_C{}_P{}_S{}_{}.aac",
        c.global_index, c.book_code, c.subbook, c.chapter, c.paragraph, c.sentence, c.language
    )
}

/// Swap the trailing `_{from}.aac` language token for `_{to}.aac`.
///
/// Names that do not end with the `from` token are returned unchanged.
pub fn retarget_audio_filename(name: &str, from: &LanguageCode, to: &LanguageCode) -> String {
    retarget_suffix(name, from, to, "aac")
}

/// Content JSON filename for a chapter in one language
pub fn content_filename(book_code: &str, subbook: u32, chapter: u32, language: &LanguageCode) -> String {
    format!("{book_code}_S{subbook}_C{chapter}_{language}.json")
}

/// Swap the trailing `_{from}.json` token; appends `_{to}.json` to the stem if absent
pub fn retarget_content_filename(name: &str, from: &LanguageCode, to: &LanguageCode) -> String {
    let swapped = retarget_suffix(name, from, to, "json");
    if swapped != name {
        return swapped;
    }
    let stem = name.strip_suffix(".json").unwrap_or(name);
    format!("{stem}_{to}.json")
}

fn retarget_suffix(name: &str, from: &LanguageCode, to: &LanguageCode, ext: &str) -> String {
    let suffix = format!("_{from}.{ext}");
    match name.strip_suffix(&suffix) {
        Some(stem) => format!("{stem}_{to}.{ext}"),
        None => name.to_string(),
    }
}

/// Chapter text filename written by the extractor
pub fn chapter_text_filename(chapter: u32) -> String {
    format!("chapter{chapter}.txt")
}

/// Folder for a chapter's content or audio files
pub fn chapter_folder(chapter: u32) -> String {
    format!("Chapter{chapter}")
}

/// Parse `chapter12.txt` (case-insensitive) into 12
pub fn parse_chapter_text_filename(name: &str) -> Option<u32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^chapter(\d+)\.txt$").expect("chapter filename pattern is valid")
    });
    re.captures(name)?[1].parse().ok()
}

/// Parse a subbook folder name `3-Words of Mormon` into (3, "Words of Mormon")
pub fn parse_subbook_folder(name: &str) -> Option<(u32, String)> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN
        .get_or_init(|| Regex::new(r"^(\d+)-(.+)$").expect("subbook folder pattern is valid"));
    let caps = re.captures(name)?;
    let number = caps[1].parse().ok()?;
    Some((number, caps[2].trim().to_string()))
}

/// Folder name for a declared subbook
pub fn subbook_folder(number: u32, title: &str) -> String {
    format!("{number}-{}", crate::text::sanitize_filename(title))
}

/// Parse a content filename for `book_code` into (subbook, chapter)
pub fn parse_content_filename(name: &str, book_code: &str) -> Option<(u32, u32)> {
    let pattern = format!(r"(?i)^{}_S(\d+)_C(\d+)_.*\.json$", regex::escape(book_code));
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(name)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}
