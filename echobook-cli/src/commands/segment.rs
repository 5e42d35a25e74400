//! Segment command implementation

use super::CommandContext;
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use echobook_core::{BookRun, BookRunConfig, BookRunReport, SegmentationEngine};
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the segment command
#[derive(Debug, Args)]
pub struct SegmentArgs {
    /// Folder of chapter text files (output of `extract`)
    #[arg(short, long, value_name = "DIR")]
    pub input: PathBuf,

    /// Book folder; records go to {DIR}/{language}/Content
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Book code used in every filename [config: book.code]
    #[arg(long, value_name = "CODE")]
    pub book_code: Option<String>,

    /// Language the text is written in [config: book.native_language]
    #[arg(short, long, value_name = "CODE")]
    pub language: Option<String>,

    /// Segmenter rules file replacing the built-in English rules
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Draft chapters one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Number of threads for drafting
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,
}

impl SegmentArgs {
    /// Execute the segment command
    pub fn execute(&self, context: &CommandContext) -> Result<()> {
        let config = &context.config;
        let book_code = config.book_code(self.book_code.as_deref())?;
        let language = config.native_language(self.language.as_deref())?;
        let segmenter = context.segmenter(self.rules.as_deref())?;
        let engine = SegmentationEngine::new(Arc::new(segmenter));

        let run = BookRun::new(
            engine,
            BookRunConfig {
                input_dir: self.input.clone(),
                output_dir: self.output.clone(),
                book_code,
                language,
            },
        );

        let pool = if self.sequential || !config.segmentation.parallel {
            None
        } else {
            Some(context.pool(self.threads)?)
        };

        let mut progress = ProgressReporter::new(context.quiet);
        progress.spinner("Segmenting chapters");
        let report = run
            .run(pool.as_ref())
            .with_context(|| format!("Failed to segment {}", self.input.display()))?;
        progress.finish();

        print_summary(&report);
        Ok(())
    }
}

fn print_summary(report: &BookRunReport) {
    println!(
        "✓ Segmented {} chapters into {} sentences",
        report.chapters.len(),
        report.sentences
    );
    if !report.skipped.is_empty() {
        println!("  Skipped {} inputs:", report.skipped.len());
        for skipped in &report.skipped {
            println!("    {}: {}", skipped.path.display(), skipped.reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echobook_core::ChapterRecord;
    use std::fs;
    use tempfile::TempDir;

    fn args(input: PathBuf, output: PathBuf) -> SegmentArgs {
        SegmentArgs {
            input,
            output,
            book_code: Some("BOOKM".to_string()),
            language: None,
            rules: None,
            sequential: false,
            threads: Some(2),
        }
    }

    fn quiet() -> CommandContext {
        CommandContext {
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_execute_flat_input() {
        let dir = TempDir::new().unwrap();
        let texts = dir.path().join("texts");
        fs::create_dir_all(&texts).unwrap();
        fs::write(texts.join("chapter1.txt"), "Opening\n\nOne here. Two here.\n").unwrap();

        let book = dir.path().join("book");
        args(texts, book.clone()).execute(&quiet()).unwrap();

        let record = ChapterRecord::read_from(
            &book.join("en-US/Content/1-Default/Chapter1/BOOKM_S1_C1_en-US.json"),
        )
        .unwrap();
        assert_eq!(record.sentence_count(), 2);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let dir = TempDir::new().unwrap();
        let texts = dir.path().join("texts/1-Genesis");
        fs::create_dir_all(&texts).unwrap();
        fs::write(texts.join("chapter1.txt"), "One\n\nAlpha beta. Gamma delta.\n").unwrap();
        fs::write(texts.join("chapter2.txt"), "Two\n\nEcho fox.\n\nGolf hotel.\n").unwrap();

        let parallel = dir.path().join("parallel");
        let sequential = dir.path().join("sequential");
        args(dir.path().join("texts"), parallel.clone()).execute(&quiet()).unwrap();
        let mut seq = args(dir.path().join("texts"), sequential.clone());
        seq.sequential = true;
        seq.execute(&quiet()).unwrap();

        let rel = "en-US/Content/1-Genesis/Chapter2/BOOKM_S1_C2_en-US.json";
        let a = ChapterRecord::read_from(&parallel.join(rel)).unwrap();
        let b = ChapterRecord::read_from(&sequential.join(rel)).unwrap();
        let globals = |r: &ChapterRecord| -> Vec<u64> {
            r.sentences().map(|s| s.global_sentence_index).collect()
        };
        assert_eq!(globals(&a), globals(&b));
        assert_eq!(globals(&a), vec![3, 4]);
    }

    #[test]
    fn test_missing_book_code() {
        let mut args = args(PathBuf::from("texts"), PathBuf::from("book"));
        args.book_code = None;
        let err = args.execute(&quiet()).unwrap_err();
        assert!(err.to_string().contains("book.code"));
    }
}
