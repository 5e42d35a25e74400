//! Presence check of every artifact a finished book needs
//!
//! Nothing is repaired; every defect found is collected into the report.

use crate::book::{AUDIO_DIR, CONTENT_DIR};
use crate::discovery::{content_files, find_files, language_folders};
use crate::error::Result;
use crate::language::LanguageCode;
use crate::model::ChapterRecord;
use log::{info, warn};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A missing or unusable artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Defect {
    MissingStructure,
    MissingContentDir { language: LanguageCode },
    MissingAudioDir { language: LanguageCode },
    UnreadableChapter { path: PathBuf, reason: String },
    MissingAudioFilename { path: PathBuf, sentence_id: String },
    MissingAudio { path: PathBuf },
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Defect::MissingStructure => write!(f, "structure file is missing"),
            Defect::MissingContentDir { language } => {
                write!(f, "{CONTENT_DIR} folder is missing for {language}")
            }
            Defect::MissingAudioDir { language } => {
                write!(f, "{AUDIO_DIR} folder is missing for {language}")
            }
            Defect::UnreadableChapter { path, reason } => {
                write!(f, "cannot read {}: {}", path.display(), reason)
            }
            Defect::MissingAudioFilename { path, sentence_id } => {
                write!(f, "sentence {} in {} has no audioFile", sentence_id, path.display())
            }
            Defect::MissingAudio { path } => write!(f, "missing audio file {}", path.display()),
        }
    }
}

/// Outcome of verifying a book
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub languages: Vec<LanguageCode>,
    pub chapters_checked: usize,
    pub audio_checked: usize,
    pub defects: Vec<Defect>,
}

impl VerificationReport {
    pub fn is_complete(&self) -> bool {
        self.defects.is_empty()
    }
}

/// Check that the structure file, content records and audio files all exist
pub fn verify_book(book_dir: &Path) -> Result<VerificationReport> {
    let mut report = VerificationReport::default();

    if find_files(book_dir, "*structure*.json")?.is_empty() {
        report.defects.push(Defect::MissingStructure);
    }

    for language in language_folders(book_dir)? {
        let lang_dir = book_dir.join(language.as_str());
        let content_dir = lang_dir.join(CONTENT_DIR);
        let audio_dir = lang_dir.join(AUDIO_DIR);
        report.languages.push(language.clone());

        if !content_dir.is_dir() {
            report.defects.push(Defect::MissingContentDir { language });
            continue;
        }
        if !audio_dir.is_dir() {
            report.defects.push(Defect::MissingAudioDir { language });
            continue;
        }

        for path in content_files(&content_dir)? {
            report.chapters_checked += 1;
            let record = match ChapterRecord::read_from(&path) {
                Ok(record) => record,
                Err(e) => {
                    report.defects.push(Defect::UnreadableChapter {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let expected_dir = path
                .parent()
                .and_then(|p| p.strip_prefix(&content_dir).ok())
                .map(|rel| audio_dir.join(rel))
                .unwrap_or_else(|| audio_dir.clone());

            for sentence in record.sentences() {
                if sentence.audio_file.is_empty() {
                    report.defects.push(Defect::MissingAudioFilename {
                        path: path.clone(),
                        sentence_id: sentence.sentence_id.to_string(),
                    });
                    continue;
                }
                report.audio_checked += 1;
                let audio = expected_dir.join(&sentence.audio_file);
                if !audio.is_file() {
                    report.defects.push(Defect::MissingAudio { path: audio });
                }
            }
        }
    }

    if report.is_complete() {
        info!("All expected files found");
    } else {
        for defect in &report.defects {
            warn!("{defect}");
        }
    }
    Ok(report)
}
