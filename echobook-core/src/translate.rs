//! Translation of native content records
//!
//! [`translate_chapter`] is a pure function from a native record to a new
//! record in the target language. Sentence and paragraph IDs are kept so that
//! sentences line up across languages.

use crate::book::{SkippedInput, CONTENT_DIR};
use crate::discovery::content_files;
use crate::error::{EchoError, Result, ServiceError};
use crate::language::LanguageCode;
use crate::model::{ChapterRecord, ParagraphRecord, SentenceRecord};
use crate::naming::{retarget_audio_filename, retarget_content_filename};
use crate::pool::WorkerPool;
use log::{error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Translates one piece of text
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`
    fn translate(&self, text: &str, target: &LanguageCode) -> std::result::Result<String, ServiceError>;
}

/// A sentence whose translation failed; its text is left empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedSentence {
    pub sentence_id: Uuid,
    pub global_sentence_index: u64,
    pub error: String,
}

/// A translated record and its failures
#[derive(Debug, Clone)]
pub struct TranslatedChapter {
    pub record: ChapterRecord,
    pub failures: Vec<FailedSentence>,
}

/// Produce a new record in `target` from `native`, which is never modified
pub fn translate_chapter(
    native: &ChapterRecord,
    target: &LanguageCode,
    translator: &dyn Translator,
    pool: Option<&WorkerPool>,
) -> TranslatedChapter {
    let texts: Vec<&str> = native.sentences().map(|s| s.text.trim()).collect();
    let work = |text: &str| -> std::result::Result<String, ServiceError> {
        if text.is_empty() {
            return Ok(String::new());
        }
        translator.translate(text, target).map(|t| t.trim().to_string())
    };
    let results = match pool {
        Some(pool) => pool.map(texts, work),
        None => texts.into_iter().map(work).collect(),
    };

    let mut results = results.into_iter();
    let mut failures = Vec::new();
    let paragraphs = native
        .paragraphs
        .iter()
        .map(|p| ParagraphRecord {
            paragraph_id: p.paragraph_id,
            paragraph_index: p.paragraph_index,
            sentences: p
                .sentences
                .iter()
                .map(|s| {
                    let text = match results.next() {
                        Some(Ok(text)) => text,
                        Some(Err(e)) => {
                            error!(
                                "Translation of sentence {} to {} failed: {}",
                                s.global_sentence_index, target, e
                            );
                            failures.push(FailedSentence {
                                sentence_id: s.sentence_id,
                                global_sentence_index: s.global_sentence_index,
                                error: e.to_string(),
                            });
                            String::new()
                        }
                        None => String::new(),
                    };
                    SentenceRecord {
                        sentence_id: s.sentence_id,
                        sentence_index: s.sentence_index,
                        global_sentence_index: s.global_sentence_index,
                        reference: s.reference.clone(),
                        text,
                        audio_file: retarget_audio_filename(&s.audio_file, &native.language, target),
                    }
                })
                .collect(),
        })
        .collect();

    TranslatedChapter {
        record: ChapterRecord {
            chapter_id: native.chapter_id,
            language: target.clone(),
            chapter_number: native.chapter_number,
            chapter_title: native.chapter_title.clone(),
            paragraphs,
        },
        failures,
    }
}

/// Settings for translating a whole book
#[derive(Debug, Clone)]
pub struct TranslationJob {
    /// Book folder holding `{lang}/Content`
    pub book_dir: PathBuf,
    pub native: LanguageCode,
    pub targets: Vec<LanguageCode>,
}

/// One translated file
#[derive(Debug, Clone, Serialize)]
pub struct TranslatedFile {
    pub path: PathBuf,
    pub language: LanguageCode,
    pub failures: Vec<FailedSentence>,
}

/// Outcome of a book translation
#[derive(Debug, Clone, Default, Serialize)]
pub struct TranslationReport {
    pub files: Vec<TranslatedFile>,
    pub skipped: Vec<SkippedInput>,
}

impl TranslationReport {
    /// Total failed sentences across every file
    pub fn failed_sentences(&self) -> usize {
        self.files.iter().map(|f| f.failures.len()).sum()
    }
}

impl TranslationJob {
    /// Target languages other than the native one
    pub fn effective_targets(&self) -> Vec<LanguageCode> {
        let mut targets: Vec<LanguageCode> = Vec::new();
        for t in &self.targets {
            if *t != self.native && !targets.contains(t) {
                targets.push(t.clone());
            }
        }
        targets
    }

    /// Translate every native record into every target language
    pub fn run(
        &self,
        translator: &dyn Translator,
        pool: Option<&WorkerPool>,
    ) -> Result<TranslationReport> {
        self.run_with_progress(translator, pool, |_| {}, |_| {})
    }

    /// Like [`TranslationJob::run`], reporting the number of files to write
    /// once and then every written file
    pub fn run_with_progress<P, D>(
        &self,
        translator: &dyn Translator,
        pool: Option<&WorkerPool>,
        on_planned: P,
        on_written: D,
    ) -> Result<TranslationReport>
    where
        P: FnOnce(usize),
        D: Fn(&Path),
    {
        let targets = self.effective_targets();
        if let Some(bad) = targets.iter().find(|t| t.display_name().is_none()) {
            return Err(EchoError::UnsupportedLanguage(bad.to_string()));
        }
        if targets.is_empty() {
            return Err(EchoError::Config(
                "No target languages after excluding the native language".to_string(),
            ));
        }

        let native_dir = self.book_dir.join(self.native.as_str()).join(CONTENT_DIR);
        let suffix = format!("_{}.json", self.native).to_lowercase();
        let files: Vec<PathBuf> = content_files(&native_dir)?
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.to_lowercase().ends_with(&suffix))
            })
            .collect();
        info!(
            "Found {} native content files in {}",
            files.len(),
            native_dir.display()
        );

        on_planned(files.len() * targets.len());

        let mut report = TranslationReport::default();
        for file in files {
            let native = match ChapterRecord::read_from(&file) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping {}: {}", file.display(), e);
                    report.skipped.push(SkippedInput {
                        path: file,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            for target in &targets {
                let translated = translate_chapter(&native, target, translator, pool);
                let path = self.target_path(&native_dir, &file, target);
                translated.record.write_to(&path)?;
                info!(
                    "Wrote {} ({} failed sentences)",
                    path.display(),
                    translated.failures.len()
                );
                on_written(&path);
                report.files.push(TranslatedFile {
                    path,
                    language: target.clone(),
                    failures: translated.failures,
                });
            }
        }
        Ok(report)
    }

    fn target_path(&self, native_dir: &Path, file: &Path, target: &LanguageCode) -> PathBuf {
        let rel_dir = file
            .parent()
            .and_then(|p| p.strip_prefix(native_dir).ok())
            .unwrap_or_else(|| Path::new(""));
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.book_dir
            .join(target.as_str())
            .join(CONTENT_DIR)
            .join(rel_dir)
            .join(retarget_content_filename(name, &self.native, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ChapterCoordinates, SegmentationEngine, SentenceCounter};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Upper {
        calls: AtomicUsize,
    }

    impl Translator for Upper {
        fn translate(
            &self,
            text: &str,
            target: &LanguageCode,
        ) -> std::result::Result<String, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains("fail") {
                return Err(ServiceError::Response("bad".to_string()));
            }
            Ok(format!("[{target}] {}", text.to_uppercase()))
        }
    }

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::new(code).unwrap()
    }

    fn native(text: &str) -> ChapterRecord {
        let coords = ChapterCoordinates {
            book_code: "BOOKM".to_string(),
            subbook: 1,
            chapter: 1,
            language: lang("en-US"),
        };
        SegmentationEngine::english()
            .unwrap()
            .process_chapter(text, &coords, &mut SentenceCounter::new())
            .unwrap()
    }

    #[test]
    fn test_translation_leaves_native_untouched() {
        let native = native("Title\n\nHello there. Good bye.");
        let before = native.clone();
        let translator = Upper {
            calls: AtomicUsize::new(0),
        };
        let es = translate_chapter(&native, &lang("es-ES"), &translator, None);
        let fr = translate_chapter(&native, &lang("fr-FR"), &translator, None);

        assert_eq!(native, before);
        assert_eq!(es.record.language, lang("es-ES"));
        assert_eq!(es.record.paragraphs[0].sentences[0].text, "[es-ES] HELLO THERE.");
        assert_eq!(
            fr.record.paragraphs[0].sentences[1].audio_file,
            "0000002_BOOKM_S1_C1_P1_S2_fr-FR.aac"
        );
        assert_eq!(es.record.chapter_id, native.chapter_id);
        assert_eq!(
            es.record.paragraphs[0].sentences[0].sentence_id,
            native.paragraphs[0].sentences[0].sentence_id
        );
        assert!(!std::ptr::eq(&es.record, &fr.record));
        assert_eq!(translator.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_failed_sentence_left_empty() {
        let native = native("Title\n\nThis will fail. This works.");
        let translator = Upper {
            calls: AtomicUsize::new(0),
        };
        let pool = WorkerPool::new(2).unwrap();
        let out = translate_chapter(&native, &lang("de-DE"), &translator, Some(&pool));
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].global_sentence_index, 1);
        let texts: Vec<&str> = out.record.sentences().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["", "[de-DE] THIS WORKS."]);
    }

    #[test]
    fn test_book_translation_layout() {
        let book = tempfile::TempDir::new().unwrap();
        let native_path = book
            .path()
            .join("en-US/Content/1-Default/Chapter1/BOOKM_S1_C1_en-US.json");
        native("Title\n\nOne.").write_to(&native_path).unwrap();

        let job = TranslationJob {
            book_dir: book.path().to_path_buf(),
            native: lang("en-US"),
            targets: vec![lang("en-US"), lang("es-ES")],
        };
        let translator = Upper {
            calls: AtomicUsize::new(0),
        };
        let report = job.run(&translator, None).unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.failed_sentences(), 0);
        let expected = book
            .path()
            .join("es-ES/Content/1-Default/Chapter1/BOOKM_S1_C1_es-ES.json");
        assert_eq!(report.files[0].path, expected);
        let record = ChapterRecord::read_from(&expected).unwrap();
        assert_eq!(record.language, lang("es-ES"));
    }

    #[test]
    fn test_unsupported_target_rejected_upfront() {
        let job = TranslationJob {
            book_dir: PathBuf::from("/nonexistent"),
            native: lang("en-US"),
            targets: vec![lang("xx-XX")],
        };
        let translator = Upper {
            calls: AtomicUsize::new(0),
        };
        assert!(matches!(
            job.run(&translator, None),
            Err(EchoError::UnsupportedLanguage(code)) if code == "xx-XX"
        ));
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    }
}
