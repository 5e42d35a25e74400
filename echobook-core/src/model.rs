//! Content and structure records
//!
//! These are the JSON documents every downstream stage reads. Field names and
//! shapes are fixed; `deny_unknown_fields` keeps reads as strict as writes.

use crate::error::{EchoError, Result};
use crate::language::LanguageCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// One chapter in one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChapterRecord {
    /// Identifier assigned once per chapter-language pair
    #[serde(rename = "chapterID")]
    pub chapter_id: Uuid,
    /// Language of `text` fields
    pub language: LanguageCode,
    /// Chapter number from the chapter's filename
    #[serde(rename = "chapterNumber")]
    pub chapter_number: u32,
    /// Title-cased display title
    #[serde(rename = "chapterTitle")]
    pub chapter_title: String,
    /// Paragraphs in reading order
    pub paragraphs: Vec<ParagraphRecord>,
}

/// One paragraph; never empty once emitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParagraphRecord {
    /// Paragraph identifier
    #[serde(rename = "paragraphID")]
    pub paragraph_id: Uuid,
    /// 1-based, contiguous within the chapter
    #[serde(rename = "paragraphIndex")]
    pub paragraph_index: u32,
    /// Sentences in reading order
    pub sentences: Vec<SentenceRecord>,
}

/// The atomic unit of narration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SentenceRecord {
    /// Sentence identifier
    #[serde(rename = "sentenceID")]
    pub sentence_id: Uuid,
    /// 1-based position within the paragraph
    #[serde(rename = "sentenceIndex")]
    pub sentence_index: u32,
    /// 1-based position across the whole book
    #[serde(rename = "globalSentenceIndex")]
    pub global_sentence_index: u64,
    /// Carried-forward locator, possibly empty
    pub reference: String,
    /// Sentence text
    pub text: String,
    /// Derived audio filename
    #[serde(rename = "audioFile")]
    pub audio_file: String,
}

impl ChapterRecord {
    /// Iterate every sentence in reading order
    pub fn sentences(&self) -> impl Iterator<Item = &SentenceRecord> {
        self.paragraphs.iter().flat_map(|p| p.sentences.iter())
    }

    /// Total sentence count
    pub fn sentence_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.sentences.len()).sum()
    }

    /// Read a chapter record from a JSON file
    pub fn read_from(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Write the record as 4-space indented JSON, creating parent folders
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}

/// Table of contents for a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructureRecord {
    /// Book identifier
    #[serde(rename = "bookID")]
    pub book_id: Uuid,
    /// Display title
    #[serde(rename = "bookTitle")]
    pub book_title: String,
    /// Author line
    pub author: String,
    /// Every language the book ships in
    pub languages: Vec<LanguageCode>,
    /// Free-text description
    #[serde(rename = "bookDescription")]
    pub book_description: String,
    /// Cover image filename
    #[serde(rename = "coverImageName")]
    pub cover_image_name: String,
    /// Book code used in filenames
    #[serde(rename = "bookCode")]
    pub book_code: String,
    /// Languages in default playback order
    #[serde(rename = "defaultPlaybackOrder")]
    pub default_playback_order: Vec<LanguageCode>,
    /// Subbooks in number order
    #[serde(rename = "subBooks")]
    pub sub_books: Vec<SubBookEntry>,
}

/// One subbook in the table of contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubBookEntry {
    /// Subbook identifier
    #[serde(rename = "subBookID")]
    pub sub_book_id: Uuid,
    /// Number from the folder prefix
    #[serde(rename = "subBookNumber")]
    pub sub_book_number: u32,
    /// Title from the folder name
    #[serde(rename = "subBookTitle")]
    pub sub_book_title: String,
    /// Chapters sorted by number
    pub chapters: Vec<ChapterEntry>,
}

/// One chapter in the table of contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChapterEntry {
    /// The chapter record's identifier
    #[serde(rename = "chapterID")]
    pub chapter_id: Uuid,
    /// Chapter number
    #[serde(rename = "chapterNumber")]
    pub chapter_number: u32,
    /// Chapter title
    #[serde(rename = "chapterTitle")]
    pub chapter_title: String,
    /// Paragraph count
    #[serde(rename = "totalParagraphs")]
    pub total_paragraphs: usize,
    /// Sentence count summed over paragraphs
    #[serde(rename = "totalSentences")]
    pub total_sentences: usize,
    /// Language → content filename
    #[serde(rename = "contentReferences")]
    pub content_references: BTreeMap<LanguageCode, String>,
}

impl StructureRecord {
    /// Read a structure record from a JSON file
    pub fn read_from(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Write the record as 4-space indented JSON, creating parent folders
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}

/// Read any JSON document from disk
pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| EchoError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| EchoError::json(path, e))
}

/// Serialize with 4-space indentation and a trailing newline
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Write any JSON document to disk, creating parent folders
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EchoError::io(parent, e))?;
    }
    let bytes = to_pretty_json(value).map_err(|e| EchoError::json(path, e))?;
    fs::write(path, bytes).map_err(|e| EchoError::io(path, e))
}
