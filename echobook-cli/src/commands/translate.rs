//! Translate command implementation

use super::CommandContext;
use crate::progress::ProgressReporter;
use crate::remote::{ChatTranslator, OpenAiClient};
use anyhow::{Context, Result};
use clap::Args;
use echobook_core::{TranslationJob, TranslationReport, Translator};
use std::path::PathBuf;

/// Arguments for the translate command
#[derive(Debug, Args)]
pub struct TranslateArgs {
    /// Book folder holding {language}/Content
    #[arg(short, long, value_name = "DIR")]
    pub book: PathBuf,

    /// Language of the source records [config: book.native_language]
    #[arg(short, long, value_name = "CODE")]
    pub native: Option<String>,

    /// Comma-separated target languages [config: book.languages]
    #[arg(short, long, value_name = "LIST")]
    pub targets: Option<String>,

    /// Chat model [config: translation.model]
    #[arg(long)]
    pub model: Option<String>,

    /// Concurrent requests
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,
}

impl TranslateArgs {
    /// Execute the translate command
    pub fn execute(&self, context: &CommandContext) -> Result<()> {
        let mut settings = context.config.translation.clone();
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        let client = OpenAiClient::from_config(&context.config.services)?;
        let translator = ChatTranslator::new(client, &settings);
        log::info!("Translating with {}", settings.model);

        let report = self.run(&translator, context)?;
        print_summary(&report);
        Ok(())
    }

    /// Translate the book with any translator
    pub fn run(&self, translator: &dyn Translator, context: &CommandContext) -> Result<TranslationReport> {
        let config = &context.config;
        let job = TranslationJob {
            book_dir: self.book.clone(),
            native: config.native_language(self.native.as_deref())?,
            targets: config.languages(self.targets.as_deref())?,
        };
        let pool = context.pool(self.threads)?;

        let mut progress = ProgressReporter::new(context.quiet);
        progress.init(0, "files");
        let report = job
            .run_with_progress(
                translator,
                Some(&pool),
                |planned| progress.set_total(planned as u64),
                |path| {
                    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                    progress.advance(name);
                },
            )
            .with_context(|| format!("Failed to translate {}", self.book.display()))?;
        progress.finish();
        Ok(report)
    }
}

fn print_summary(report: &TranslationReport) {
    println!("✓ Wrote {} translated files", report.files.len());
    let failed = report.failed_sentences();
    if failed > 0 {
        println!("  {failed} sentences could not be translated and were left empty");
        for file in report.files.iter().filter(|f| !f.failures.is_empty()) {
            println!("    {}: {}", file.path.display(), file.failures.len());
        }
    }
    for skipped in &report.skipped {
        println!("  Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echobook_core::engine::{ChapterCoordinates, SentenceCounter};
    use echobook_core::{ChapterRecord, LanguageCode, SegmentationEngine, ServiceError};
    use tempfile::TempDir;

    struct Upper;

    impl Translator for Upper {
        fn translate(&self, text: &str, _target: &LanguageCode) -> Result<String, ServiceError> {
            Ok(text.to_uppercase())
        }
    }

    fn native_book(dir: &TempDir) {
        let coords = ChapterCoordinates {
            book_code: "BOOKM".to_string(),
            subbook: 1,
            chapter: 1,
            language: LanguageCode::new("en-US").unwrap(),
        };
        SegmentationEngine::english()
            .unwrap()
            .process_chapter("Opening\n\nFirst words.", &coords, &mut SentenceCounter::new())
            .unwrap()
            .write_to(&dir.path().join("en-US/Content/1-Default/Chapter1/BOOKM_S1_C1_en-US.json"))
            .unwrap();
    }

    fn args(dir: &TempDir, targets: &str) -> TranslateArgs {
        TranslateArgs {
            book: dir.path().to_path_buf(),
            native: None,
            targets: Some(targets.to_string()),
            model: None,
            threads: Some(2),
        }
    }

    #[test]
    fn test_run_writes_targets() {
        let dir = TempDir::new().unwrap();
        native_book(&dir);
        let context = CommandContext {
            quiet: true,
            ..Default::default()
        };

        let report = args(&dir, "en-US,es-ES").run(&Upper, &context).unwrap();
        assert_eq!(report.files.len(), 1);

        let es = ChapterRecord::read_from(
            &dir.path().join("es-ES/Content/1-Default/Chapter1/BOOKM_S1_C1_es-ES.json"),
        )
        .unwrap();
        assert_eq!(es.paragraphs[0].sentences[0].text, "FIRST WORDS.");
    }

    #[test]
    fn test_unsupported_target_rejected() {
        let dir = TempDir::new().unwrap();
        native_book(&dir);
        let context = CommandContext {
            quiet: true,
            ..Default::default()
        };
        assert!(args(&dir, "zz-ZZ").run(&Upper, &context).is_err());
        assert!(!dir.path().join("zz-ZZ").exists());
    }

    #[test]
    fn test_execute_without_api_key() {
        let dir = TempDir::new().unwrap();
        let mut context = CommandContext::default();
        context.config.services.api_key_env = "ECHOBOOK_UNSET_TEST_KEY".to_string();
        let err = args(&dir, "es-ES").execute(&context).unwrap_err();
        assert!(err.to_string().contains("ECHOBOOK_UNSET_TEST_KEY"));
    }
}
