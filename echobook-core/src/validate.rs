//! Schema validation of structure and chapter records
//!
//! Records are checked as raw JSON so that every violation can be reported
//! with a JSON-pointer path, not just the first one serde trips over. On top
//! of the shapes, each language is checked for a gap-free global index
//! sequence and contiguous local indices.

use crate::book::CONTENT_DIR;
use crate::discovery::{content_files, find_files, language_folders};
use crate::error::{EchoError, Result};
use crate::language::{is_language_code, LanguageCode};
use crate::model::ChapterRecord;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

enum Shape {
    Str,
    /// String or null
    OptionalStr,
    NonEmptyStr,
    Uuid,
    Language,
    Int { min: u64 },
    Array { items: &'static Shape, min_items: usize },
    Object { fields: &'static [Field] },
    /// Object keyed by language code
    LanguageMap { values: &'static Shape },
}

struct Field {
    name: &'static str,
    shape: Shape,
    required: bool,
}

static SENTENCE: Shape = Shape::Object {
    fields: &[
        Field { name: "sentenceID", shape: Shape::Uuid, required: true },
        Field { name: "sentenceIndex", shape: Shape::Int { min: 1 }, required: true },
        Field { name: "globalSentenceIndex", shape: Shape::Int { min: 1 }, required: true },
        Field { name: "reference", shape: Shape::Str, required: true },
        Field { name: "text", shape: Shape::Str, required: true },
        Field { name: "audioFile", shape: Shape::Str, required: true },
    ],
};

static PARAGRAPH: Shape = Shape::Object {
    fields: &[
        Field { name: "paragraphID", shape: Shape::Uuid, required: true },
        Field { name: "paragraphIndex", shape: Shape::Int { min: 1 }, required: true },
        Field {
            name: "sentences",
            shape: Shape::Array { items: &SENTENCE, min_items: 0 },
            required: true,
        },
    ],
};

static CHAPTER: Shape = Shape::Object {
    fields: &[
        Field { name: "chapterID", shape: Shape::Uuid, required: true },
        Field { name: "language", shape: Shape::Language, required: true },
        Field { name: "chapterNumber", shape: Shape::Int { min: 0 }, required: true },
        Field { name: "chapterTitle", shape: Shape::Str, required: true },
        Field {
            name: "paragraphs",
            shape: Shape::Array { items: &PARAGRAPH, min_items: 0 },
            required: true,
        },
    ],
};

static LANGUAGE: Shape = Shape::Language;
static STRING: Shape = Shape::Str;

static CHAPTER_ENTRY: Shape = Shape::Object {
    fields: &[
        Field { name: "chapterID", shape: Shape::Uuid, required: true },
        Field { name: "chapterNumber", shape: Shape::Int { min: 0 }, required: true },
        Field { name: "chapterTitle", shape: Shape::Str, required: true },
        Field { name: "totalParagraphs", shape: Shape::Int { min: 0 }, required: true },
        Field { name: "totalSentences", shape: Shape::Int { min: 0 }, required: true },
        Field {
            name: "contentReferences",
            shape: Shape::LanguageMap { values: &STRING },
            required: true,
        },
    ],
};

static SUBBOOK: Shape = Shape::Object {
    fields: &[
        Field { name: "subBookID", shape: Shape::Uuid, required: true },
        Field { name: "subBookNumber", shape: Shape::Int { min: 1 }, required: true },
        Field { name: "subBookTitle", shape: Shape::Str, required: true },
        Field {
            name: "chapters",
            shape: Shape::Array { items: &CHAPTER_ENTRY, min_items: 0 },
            required: true,
        },
    ],
};

static STRUCTURE: Shape = Shape::Object {
    fields: &[
        Field { name: "bookID", shape: Shape::Uuid, required: true },
        Field { name: "bookTitle", shape: Shape::Str, required: true },
        Field { name: "author", shape: Shape::Str, required: true },
        Field {
            name: "languages",
            shape: Shape::Array { items: &LANGUAGE, min_items: 1 },
            required: true,
        },
        Field { name: "bookDescription", shape: Shape::OptionalStr, required: false },
        Field { name: "coverImageName", shape: Shape::Str, required: true },
        Field { name: "bookCode", shape: Shape::NonEmptyStr, required: true },
        Field {
            name: "defaultPlaybackOrder",
            shape: Shape::Array { items: &LANGUAGE, min_items: 0 },
            required: true,
        },
        Field {
            name: "subBooks",
            shape: Shape::Array { items: &SUBBOOK, min_items: 1 },
            required: true,
        },
    ],
};

/// One schema or index violation inside a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON pointer to the offending value; empty for the whole document
    pub pointer: String,
    pub message: String,
}

impl Violation {
    fn new(pointer: &str, message: impl Into<String>) -> Self {
        Self {
            pointer: pointer.to_string(),
            message: message.into(),
        }
    }
}

/// Violations of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileViolations {
    pub path: PathBuf,
    pub violations: Vec<Violation>,
}

/// Outcome of validating a book
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub files_checked: usize,
    pub files: Vec<FileViolations>,
    /// Book-level problems such as a missing structure file
    pub book: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.files.is_empty() && self.book.is_empty()
    }

    /// Total number of reported problems
    pub fn violation_count(&self) -> usize {
        self.files.iter().map(|f| f.violations.len()).sum::<usize>() + self.book.len()
    }

    fn record(&mut self, path: &Path, violations: Vec<Violation>) {
        self.files_checked += 1;
        if violations.is_empty() {
            debug!("{} is valid", path.display());
        } else {
            warn!("{}: {} violations", path.display(), violations.len());
            self.files.push(FileViolations {
                path: path.to_path_buf(),
                violations,
            });
        }
    }
}

/// Check a chapter record document
pub fn validate_chapter_value(value: &Value) -> Vec<Violation> {
    let mut out = Vec::new();
    check(&CHAPTER, value, "", &mut out);
    out
}

/// Check a structure record document
pub fn validate_structure_value(value: &Value) -> Vec<Violation> {
    let mut out = Vec::new();
    check(&STRUCTURE, value, "", &mut out);
    out
}

fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn check(shape: &Shape, value: &Value, pointer: &str, out: &mut Vec<Violation>) {
    match shape {
        Shape::Str => {
            if !value.is_string() {
                out.push(Violation::new(pointer, "expected a string"));
            }
        }
        Shape::OptionalStr => {
            if !value.is_string() && !value.is_null() {
                out.push(Violation::new(pointer, "expected a string or null"));
            }
        }
        Shape::NonEmptyStr => match value.as_str() {
            Some("") => out.push(Violation::new(pointer, "must not be empty")),
            Some(_) => {}
            None => out.push(Violation::new(pointer, "expected a string")),
        },
        Shape::Uuid => match value.as_str() {
            Some(s) if Uuid::parse_str(s).is_ok() => {}
            Some(s) => out.push(Violation::new(pointer, format!("'{s}' is not a uuid"))),
            None => out.push(Violation::new(pointer, "expected a uuid string")),
        },
        Shape::Language => match value.as_str() {
            Some(s) if is_language_code(s) => {}
            Some(s) => out.push(Violation::new(
                pointer,
                format!("'{s}' does not match ^[a-z]{{2}}-[A-Z]{{2}}$"),
            )),
            None => out.push(Violation::new(pointer, "expected a language code string")),
        },
        Shape::Int { min } => {
            if let Some(n) = value.as_u64() {
                if n < *min {
                    out.push(Violation::new(pointer, format!("{n} is less than {min}")));
                }
            } else if let Some(n) = value.as_i64() {
                out.push(Violation::new(pointer, format!("{n} is less than {min}")));
            } else {
                out.push(Violation::new(pointer, "expected an integer"));
            }
        }
        Shape::Array { items, min_items } => {
            let Some(array) = value.as_array() else {
                out.push(Violation::new(pointer, "expected an array"));
                return;
            };
            if array.len() < *min_items {
                out.push(Violation::new(
                    pointer,
                    format!("expected at least {min_items} items, found {}", array.len()),
                ));
            }
            for (i, item) in array.iter().enumerate() {
                check(items, item, &format!("{pointer}/{i}"), out);
            }
        }
        Shape::Object { fields } => {
            let Some(object) = value.as_object() else {
                out.push(Violation::new(pointer, "expected an object"));
                return;
            };
            for field in fields.iter() {
                let child = format!("{pointer}/{}", escape_pointer(field.name));
                match object.get(field.name) {
                    Some(v) => check(&field.shape, v, &child, out),
                    None if field.required => {
                        out.push(Violation::new(pointer, format!("missing required field '{}'", field.name)))
                    }
                    None => {}
                }
            }
            for key in object.keys() {
                if !fields.iter().any(|f| f.name == key.as_str()) {
                    out.push(Violation::new(
                        &format!("{pointer}/{}", escape_pointer(key)),
                        "additional property not allowed",
                    ));
                }
            }
        }
        Shape::LanguageMap { values } => {
            let Some(object) = value.as_object() else {
                out.push(Violation::new(pointer, "expected an object"));
                return;
            };
            for (key, v) in object {
                let child = format!("{pointer}/{}", escape_pointer(key));
                if is_language_code(key) {
                    check(values, v, &child, out);
                } else {
                    out.push(Violation::new(&child, "key is not a language code"));
                }
            }
        }
    }
}

/// Local index checks on a record that already has a valid shape
pub fn check_local_indices(record: &ChapterRecord) -> Vec<Violation> {
    let mut out = Vec::new();
    for (p, paragraph) in record.paragraphs.iter().enumerate() {
        let expected = p as u32 + 1;
        if paragraph.paragraph_index != expected {
            out.push(Violation::new(
                &format!("/paragraphs/{p}/paragraphIndex"),
                format!("expected {expected}, found {}", paragraph.paragraph_index),
            ));
        }
        for (s, sentence) in paragraph.sentences.iter().enumerate() {
            let expected = s as u32 + 1;
            if sentence.sentence_index != expected {
                out.push(Violation::new(
                    &format!("/paragraphs/{p}/sentences/{s}/sentenceIndex"),
                    format!("expected {expected}, found {}", sentence.sentence_index),
                ));
            }
        }
    }
    out
}

/// Problems with a language's global indices; they must be exactly `{1..N}`
pub fn check_global_indices(indices: &[u64]) -> Vec<String> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();

    let mut problems = Vec::new();
    let mut duplicated = Vec::new();
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] && duplicated.last() != Some(&pair[0]) {
            duplicated.push(pair[0]);
        }
    }
    sorted.dedup();
    if !duplicated.is_empty() {
        problems.push(format!("duplicated global indices: {}", summarize(&duplicated)));
    }

    let n = indices.len() as u64;
    let missing: Vec<u64> = {
        let mut present = sorted.iter().peekable();
        (1..=n)
            .filter(|i| {
                while present.next_if(|&&p| p < *i).is_some() {}
                present.next_if(|&&p| p == *i).is_none()
            })
            .collect()
    };
    if !missing.is_empty() {
        problems.push(format!("missing global indices: {}", summarize(&missing)));
    }
    let beyond: Vec<u64> = sorted.iter().copied().filter(|&i| i > n || i == 0).collect();
    if !beyond.is_empty() {
        problems.push(format!("global indices outside 1..={n}: {}", summarize(&beyond)));
    }
    problems
}

fn summarize(values: &[u64]) -> String {
    const SHOWN: usize = 10;
    let head: Vec<String> = values.iter().take(SHOWN).map(u64::to_string).collect();
    if values.len() > SHOWN {
        format!("{} and {} more", head.join(", "), values.len() - SHOWN)
    } else {
        head.join(", ")
    }
}

fn read_value(path: &Path) -> std::result::Result<Value, Violation> {
    let content = fs::read_to_string(path)
        .map_err(|e| Violation::new("", EchoError::io(path, e).to_string()))?;
    serde_json::from_str(&content).map_err(|e| Violation::new("", format!("not valid JSON: {e}")))
}

/// Validate the structure file and every chapter record of a book
pub fn validate_book(book_dir: &Path) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();

    let structures = find_files(book_dir, "*structure*.json")?;
    if structures.is_empty() {
        report
            .book
            .push(format!("no structure file in {}", book_dir.display()));
    }
    for path in &structures {
        let violations = match read_value(path) {
            Ok(value) => validate_structure_value(&value),
            Err(v) => vec![v],
        };
        report.record(path, violations);
    }

    let mut global: BTreeMap<LanguageCode, Vec<u64>> = BTreeMap::new();
    for language in language_folders(book_dir)? {
        let content_dir = book_dir.join(language.as_str()).join(CONTENT_DIR);
        if !content_dir.is_dir() {
            debug!("No {} folder for {}", CONTENT_DIR, language);
            continue;
        }
        let files = content_files(&content_dir)?;
        info!("Validating {} chapter files for {}", files.len(), language);
        let indices = global.entry(language).or_default();

        for path in files {
            let violations = match read_value(&path) {
                Ok(value) => {
                    let mut violations = validate_chapter_value(&value);
                    if violations.is_empty() {
                        match serde_json::from_value::<ChapterRecord>(value) {
                            Ok(record) => {
                                indices.extend(record.sentences().map(|s| s.global_sentence_index));
                                violations.extend(check_local_indices(&record));
                            }
                            Err(e) => violations.push(Violation::new("", e.to_string())),
                        }
                    }
                    violations
                }
                Err(v) => vec![v],
            };
            report.record(&path, violations);
        }
    }

    for (language, indices) in &global {
        for problem in check_global_indices(indices) {
            report.book.push(format!("{language}: {problem}"));
        }
    }

    info!(
        "Validated {} files, {} violations",
        report.files_checked,
        report.violation_count()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ChapterCoordinates, SegmentationEngine, SentenceCounter};
    use crate::structure::{assemble_structure, structure_filename, BookMetadata};
    use serde_json::json;
    use tempfile::TempDir;

    fn record(text: &str, counter: &mut SentenceCounter, chapter: u32) -> ChapterRecord {
        let coords = ChapterCoordinates {
            book_code: "BOOKM".to_string(),
            subbook: 1,
            chapter,
            language: LanguageCode::new("en-US").unwrap(),
        };
        SegmentationEngine::english()
            .unwrap()
            .process_chapter(text, &coords, counter)
            .unwrap()
    }

    fn pointers(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.pointer.as_str()).collect()
    }

    #[test]
    fn test_engine_output_is_valid() {
        let rec = record("T\n\nA. B.\n\nC.", &mut SentenceCounter::new(), 1);
        let value = serde_json::to_value(&rec).unwrap();
        assert!(validate_chapter_value(&value).is_empty());
        assert!(check_local_indices(&rec).is_empty());
    }

    #[test]
    fn test_chapter_violations_have_pointers() {
        let rec = record("T\n\nA. B.", &mut SentenceCounter::new(), 1);
        let mut value = serde_json::to_value(&rec).unwrap();
        value["language"] = json!("english");
        value["paragraphs"][0]["sentences"][1]["sentenceIndex"] = json!(0);
        value["paragraphs"][0]["sentences"][0]["sentenceID"] = json!("nope");
        value["paragraphs"][0]["extra"] = json!(true);
        value.as_object_mut().unwrap().remove("chapterTitle");

        let violations = validate_chapter_value(&value);
        let ptrs = pointers(&violations);
        assert!(ptrs.contains(&"/language"));
        assert!(ptrs.contains(&"/paragraphs/0/sentences/1/sentenceIndex"));
        assert!(ptrs.contains(&"/paragraphs/0/sentences/0/sentenceID"));
        assert!(ptrs.contains(&"/paragraphs/0/extra"));
        assert!(violations
            .iter()
            .any(|v| v.pointer.is_empty() && v.message.contains("chapterTitle")));
    }

    #[test]
    fn test_structure_requires_subbooks() {
        let value = json!({
            "bookID": Uuid::new_v4().to_string(),
            "bookTitle": "T",
            "author": "A",
            "languages": ["en-US"],
            "bookDescription": null,
            "coverImageName": "",
            "bookCode": "BOOKM",
            "defaultPlaybackOrder": ["en-US"],
            "subBooks": []
        });
        let violations = validate_structure_value(&value);
        assert_eq!(pointers(&violations), vec!["/subBooks"]);
    }

    #[test]
    fn test_content_reference_keys_checked() {
        let value = json!({
            "chapterID": Uuid::new_v4().to_string(),
            "chapterNumber": 1,
            "chapterTitle": "One",
            "totalParagraphs": 1,
            "totalSentences": -2,
            "contentReferences": {"en-US": "a.json", "EN": "b.json"}
        });
        let mut out = Vec::new();
        check(&CHAPTER_ENTRY, &value, "", &mut out);
        assert_eq!(pointers(&out), vec!["/totalSentences", "/contentReferences/EN"]);
    }

    #[test]
    fn test_local_index_gaps() {
        let mut rec = record("T\n\nA. B.\n\nC.", &mut SentenceCounter::new(), 1);
        rec.paragraphs[1].paragraph_index = 3;
        rec.paragraphs[0].sentences[1].sentence_index = 5;
        let ptrs: Vec<String> = check_local_indices(&rec)
            .into_iter()
            .map(|v| v.pointer)
            .collect();
        assert_eq!(
            ptrs,
            vec![
                "/paragraphs/0/sentences/1/sentenceIndex",
                "/paragraphs/1/paragraphIndex"
            ]
        );
    }

    #[test]
    fn test_global_indices() {
        assert!(check_global_indices(&[3, 1, 2]).is_empty());
        assert!(check_global_indices(&[]).is_empty());
        let problems = check_global_indices(&[1, 2, 2, 5]);
        assert_eq!(problems.len(), 3);
        assert!(problems[0].contains("duplicated global indices: 2"));
        assert!(problems[1].contains("missing global indices: 3, 4"));
        assert!(problems[2].contains("5"));
    }

    #[test]
    fn test_validate_book() {
        let book = TempDir::new().unwrap();
        let content = book.path().join("en-US/Content/1-Default");
        let mut counter = SentenceCounter::new();
        let one = record("One\n\nA. B.", &mut counter, 1);
        let two = record("Two\n\nC.", &mut counter, 2);
        one.write_to(&content.join("Chapter1/BOOKM_S1_C1_en-US.json"))
            .unwrap();
        two.write_to(&content.join("Chapter2/BOOKM_S1_C2_en-US.json"))
            .unwrap();

        let report = validate_book(book.path()).unwrap();
        assert_eq!(report.files_checked, 2);
        assert!(!report.is_valid());
        assert!(report.book[0].contains("no structure file"));

        let meta = BookMetadata {
            book_code: "BOOKM".to_string(),
            languages: vec![LanguageCode::new("en-US").unwrap()],
            ..Default::default()
        };
        let assembly = assemble_structure(&book.path().join("en-US/Content"), &meta).unwrap();
        assembly
            .structure
            .write_to(&book.path().join(structure_filename("BOOKM")))
            .unwrap();
        let report = validate_book(book.path()).unwrap();
        assert!(report.is_valid(), "{report:?}");

        // A second run of the same chapter duplicates indices 1 and 2
        let again = record("One\n\nA. B.", &mut SentenceCounter::new(), 3);
        again
            .write_to(&content.join("Chapter3/BOOKM_S1_C3_en-US.json"))
            .unwrap();
        let report = validate_book(book.path()).unwrap();
        assert_eq!(report.files.len(), 0);
        assert!(report.book.iter().any(|p| p.contains("duplicated")));
    }
}
