//! Audio generation for every language of a book
//!
//! Each sentence of every `{lang}/Content/**.json` record becomes
//! `{lang}/Audio/{same relative dir}/{audioFile}`.

use crate::book::{SkippedInput, AUDIO_DIR, CONTENT_DIR};
use crate::discovery::{content_files, language_folders};
use crate::error::{EchoError, Result, ServiceError};
use crate::language::LanguageCode;
use crate::model::ChapterRecord;
use crate::pool::WorkerPool;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Turns text into encoded audio bytes
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` spoken in `language`
    fn synthesize(&self, text: &str, language: &LanguageCode) -> std::result::Result<Vec<u8>, ServiceError>;
}

/// One sentence to synthesize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTask {
    pub text: String,
    pub language: LanguageCode,
    pub path: PathBuf,
}

/// A sentence whose audio could not be produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of an audio run
#[derive(Debug, Clone, Default, Serialize)]
pub struct AudioReport {
    /// Files written in this run
    pub written: usize,
    /// Files kept because they already existed
    pub existing: usize,
    /// Sentences with no text or no audio filename
    pub skipped_sentences: usize,
    pub failed: Vec<AudioFailure>,
    /// Chapter files that could not be read
    pub skipped_files: Vec<SkippedInput>,
}

/// Settings for an audio run
#[derive(Debug, Clone)]
pub struct AudioJob {
    /// Book folder holding the language folders
    pub book_dir: PathBuf,
    /// Restrict to these languages; empty means every language folder
    pub languages: Vec<LanguageCode>,
    /// Regenerate files that already exist
    pub overwrite: bool,
}

enum Outcome {
    Written,
    Existing,
}

impl AudioJob {
    /// Collect the sentences to synthesize, recording unusable inputs in `report`
    pub fn plan(&self, report: &mut AudioReport) -> Result<Vec<AudioTask>> {
        let languages = if self.languages.is_empty() {
            language_folders(&self.book_dir)?
        } else {
            self.languages.clone()
        };

        let mut tasks = Vec::new();
        for language in languages {
            let lang_dir = self.book_dir.join(language.as_str());
            let content_dir = lang_dir.join(CONTENT_DIR);
            if !content_dir.is_dir() {
                debug!("{} has no {} folder", lang_dir.display(), CONTENT_DIR);
                continue;
            }
            let audio_dir = lang_dir.join(AUDIO_DIR);
            let files = content_files(&content_dir)?;
            info!("Found {} content files for {}", files.len(), language);

            for file in files {
                match ChapterRecord::read_from(&file) {
                    Ok(record) => {
                        let out_dir = mirrored_dir(&content_dir, &audio_dir, &file);
                        tasks.extend(sentence_tasks(&record, &out_dir, report));
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", file.display(), e);
                        report.skipped_files.push(SkippedInput {
                            path: file,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }
        Ok(tasks)
    }

    /// Synthesize every planned sentence. One failure never stops the others.
    pub fn run(&self, synthesizer: &dyn SpeechSynthesizer, pool: &WorkerPool) -> Result<AudioReport> {
        self.run_with_progress(synthesizer, pool, |_| {}, || {})
    }

    /// Like [`AudioJob::run`], reporting the planned task count once and
    /// calling `on_done` from a worker after every task
    pub fn run_with_progress<P, D>(
        &self,
        synthesizer: &dyn SpeechSynthesizer,
        pool: &WorkerPool,
        on_planned: P,
        on_done: D,
    ) -> Result<AudioReport>
    where
        P: FnOnce(usize),
        D: Fn() + Sync,
    {
        let mut report = AudioReport::default();
        let tasks = self.plan(&mut report)?;
        info!("Synthesizing up to {} sentences", tasks.len());
        on_planned(tasks.len());

        let overwrite = self.overwrite;
        let results = pool.map(tasks, |task| {
            let path = task.path.clone();
            let outcome = synthesize_one(task, synthesizer, overwrite).map_err(|e| (path, e));
            on_done();
            outcome
        });

        for result in results {
            match result {
                Ok(Outcome::Written) => report.written += 1,
                Ok(Outcome::Existing) => report.existing += 1,
                Err((path, e)) => {
                    error!("Audio for {} failed: {}", path.display(), e);
                    report.failed.push(AudioFailure {
                        path,
                        error: e,
                    });
                }
            }
        }
        info!(
            "Audio: {} written, {} existing, {} skipped, {} failed",
            report.written,
            report.existing,
            report.skipped_sentences,
            report.failed.len()
        );
        Ok(report)
    }
}

fn synthesize_one(
    task: AudioTask,
    synthesizer: &dyn SpeechSynthesizer,
    overwrite: bool,
) -> std::result::Result<Outcome, String> {
    if !overwrite && task.path.exists() {
        return Ok(Outcome::Existing);
    }
    let bytes = synthesizer
        .synthesize(&task.text, &task.language)
        .map_err(|e| e.to_string())?;
    if let Some(parent) = task.path.parent() {
        fs::create_dir_all(parent).map_err(|e| EchoError::io(parent, e).to_string())?;
    }
    fs::write(&task.path, bytes).map_err(|e| EchoError::io(&task.path, e).to_string())?;
    debug!("wrote {}", task.path.display());
    Ok(Outcome::Written)
}

/// `{audio}/{dir of file relative to content}`
fn mirrored_dir(content_dir: &Path, audio_dir: &Path, file: &Path) -> PathBuf {
    let rel = file
        .parent()
        .and_then(|p| p.strip_prefix(content_dir).ok())
        .unwrap_or_else(|| Path::new(""));
    audio_dir.join(rel)
}

fn sentence_tasks(record: &ChapterRecord, out_dir: &Path, report: &mut AudioReport) -> Vec<AudioTask> {
    let mut tasks = Vec::new();
    for sentence in record.sentences() {
        let text = sentence.text.trim();
        if text.is_empty() || sentence.audio_file.trim().is_empty() {
            warn!(
                "Sentence {} has no text or audio filename; skipping",
                sentence.sentence_id
            );
            report.skipped_sentences += 1;
            continue;
        }
        if !is_plain_file_name(&sentence.audio_file) {
            warn!(
                "Sentence {} has audio filename '{}' outside its chapter folder; skipping",
                sentence.sentence_id, sentence.audio_file
            );
            report.skipped_sentences += 1;
            continue;
        }
        tasks.push(AudioTask {
            text: text.to_string(),
            language: record.language.clone(),
            path: out_dir.join(&sentence.audio_file),
        });
    }
    tasks
}

/// A single path component with no separators or parent references
fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) || name.contains("..") {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ChapterCoordinates, SegmentationEngine, SentenceCounter};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FakeVoice {
        calls: AtomicUsize,
    }

    impl SpeechSynthesizer for FakeVoice {
        fn synthesize(
            &self,
            text: &str,
            language: &LanguageCode,
        ) -> std::result::Result<Vec<u8>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.starts_with("Broken") {
                return Err(ServiceError::Request("timeout".to_string()));
            }
            Ok(format!("{language}:{text}").into_bytes())
        }
    }

    fn write_record(book: &Path, lang: &str, text: &str) -> ChapterRecord {
        let language = LanguageCode::new(lang).unwrap();
        let coords = ChapterCoordinates {
            book_code: "BOOKM".to_string(),
            subbook: 1,
            chapter: 1,
            language: language.clone(),
        };
        let record = SegmentationEngine::english()
            .unwrap()
            .process_chapter(text, &coords, &mut SentenceCounter::new())
            .unwrap();
        let path = book.join(format!(
            "{lang}/Content/1-Default/Chapter1/BOOKM_S1_C1_{lang}.json"
        ));
        record.write_to(&path).unwrap();
        record
    }

    fn job(book: &Path, overwrite: bool) -> AudioJob {
        AudioJob {
            book_dir: book.to_path_buf(),
            languages: Vec::new(),
            overwrite,
        }
    }

    #[test]
    fn test_audio_mirrors_content_layout() {
        let book = TempDir::new().unwrap();
        write_record(book.path(), "en-US", "T\n\nOne. Two.");
        write_record(book.path(), "es-ES", "T\n\nUno.");
        let voice = FakeVoice {
            calls: AtomicUsize::new(0),
        };
        let pool = WorkerPool::new(2).unwrap();
        let report = job(book.path(), false).run(&voice, &pool).unwrap();
        assert_eq!(report.written, 3);
        assert!(report.failed.is_empty());

        let audio = book
            .path()
            .join("en-US/Audio/1-Default/Chapter1/0000002_BOOKM_S1_C1_P1_S2_en-US.aac");
        assert_eq!(fs::read_to_string(audio).unwrap(), "en-US:Two.");
    }

    #[test]
    fn test_existing_files_kept_unless_overwrite() {
        let book = TempDir::new().unwrap();
        write_record(book.path(), "en-US", "T\n\nOne.");
        let voice = FakeVoice {
            calls: AtomicUsize::new(0),
        };
        let pool = WorkerPool::new(1).unwrap();
        job(book.path(), false).run(&voice, &pool).unwrap();
        let second = job(book.path(), false).run(&voice, &pool).unwrap();
        assert_eq!(second.existing, 1);
        assert_eq!(voice.calls.load(Ordering::SeqCst), 1);

        let third = job(book.path(), true).run(&voice, &pool).unwrap();
        assert_eq!(third.written, 1);
        assert_eq!(voice.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failures_and_empty_text_do_not_stop_siblings() {
        let book = TempDir::new().unwrap();
        let mut record = write_record(book.path(), "en-US", "T\n\nBroken one. Fine one. Also fine.");
        record.paragraphs[0].sentences[2].text = String::new();
        record
            .write_to(&book.path().join("en-US/Content/1-Default/Chapter1/BOOKM_S1_C1_en-US.json"))
            .unwrap();

        let voice = FakeVoice {
            calls: AtomicUsize::new(0),
        };
        let pool = WorkerPool::new(2).unwrap();
        let report = job(book.path(), false).run(&voice, &pool).unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.skipped_sentences, 1);
        assert!(report.failed[0].error.contains("timeout"));
    }

    #[test]
    fn test_audio_filename_cannot_leave_chapter_folder() {
        let book = TempDir::new().unwrap();
        let mut record = write_record(book.path(), "en-US", "T\n\nOne. Two. Three.");
        record.paragraphs[0].sentences[0].audio_file = "../escape.aac".to_string();
        record.paragraphs[0].sentences[1].audio_file = "nested/deeper.aac".to_string();
        record
            .write_to(&book.path().join("en-US/Content/1-Default/Chapter1/BOOKM_S1_C1_en-US.json"))
            .unwrap();

        let voice = FakeVoice {
            calls: AtomicUsize::new(0),
        };
        let pool = WorkerPool::new(1).unwrap();
        let report = job(book.path(), false).run(&voice, &pool).unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(report.skipped_sentences, 2);
        assert_eq!(voice.calls.load(Ordering::SeqCst), 1);
        assert!(!book.path().join("en-US/Audio/1-Default/escape.aac").exists());
        assert!(!book
            .path()
            .join("en-US/Audio/1-Default/Chapter1/nested")
            .exists());
    }

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("0000001_BOOKM_S1_C1_P1_S1_en-US.aac"));
        assert!(!is_plain_file_name("../escape.aac"));
        assert!(!is_plain_file_name("/tmp/abs.aac"));
        assert!(!is_plain_file_name("a\\b.aac"));
        assert!(!is_plain_file_name("."));
    }

    #[test]
    fn test_progress_callbacks() {
        let book = TempDir::new().unwrap();
        write_record(book.path(), "en-US", "T\n\nOne. Two. Three.");
        let voice = FakeVoice {
            calls: AtomicUsize::new(0),
        };
        let done = AtomicUsize::new(0);
        let mut planned = 0;
        let pool = WorkerPool::new(2).unwrap();
        job(book.path(), false)
            .run_with_progress(&voice, &pool, |n| planned = n, || {
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(planned, 3);
        assert_eq!(done.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unreadable_record_skipped() {
        let book = TempDir::new().unwrap();
        let bad = book.path().join("en-US/Content/bad.json");
        fs::create_dir_all(bad.parent().unwrap()).unwrap();
        fs::write(&bad, "[]").unwrap();
        let voice = FakeVoice {
            calls: AtomicUsize::new(0),
        };
        let pool = WorkerPool::new(1).unwrap();
        let report = job(book.path(), false).run(&voice, &pool).unwrap();
        assert_eq!(report.skipped_files.len(), 1);
        assert_eq!(report.written, 0);
    }
}
