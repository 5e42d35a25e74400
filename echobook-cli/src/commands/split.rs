//! Split command implementation

use super::CommandContext;
use crate::input::{resolve_patterns, FileReader};
use crate::output::{formatter, OutputFormat, OutputFormatter};
use anyhow::{Context, Result};
use clap::Args;
use echobook_core::parse_marker;
use echobook_core::segmenter::{segment_line, SentenceSegmenter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Arguments for the split command
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Segmenter rules file replacing the built-in English rules
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

impl SplitArgs {
    /// Execute the split command
    pub fn execute(&self, context: &CommandContext) -> Result<()> {
        let files = resolve_patterns(&self.input)?;
        log::info!("Splitting {} files", files.len());
        let segmenter = context.segmenter(self.rules.as_deref())?;

        let writer: Box<dyn Write + Send + Sync> = match &self.output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?,
            )),
            None => Box::new(io::stdout()),
        };
        let mut out = formatter(self.format, writer);

        let mut total = 0;
        for file in &files {
            let text = FileReader::read_text(file)?;
            let count = split_text(&segmenter, &text, out.as_mut())?;
            log::info!("{}: {count} sentences", file.display());
            total += count;
        }
        out.finish()?;

        if let Some(path) = &self.output {
            println!("✓ {total} sentences written to {}", path.display());
        }
        Ok(())
    }
}

/// Feed every sentence of `text` to `out`. Blank and marker lines are skipped.
fn split_text(
    segmenter: &dyn SentenceSegmenter,
    text: &str,
    out: &mut dyn OutputFormatter,
) -> Result<usize> {
    let mut count = 0;
    for (number, line) in text.lines().enumerate() {
        if parse_marker(line).is_some() {
            continue;
        }
        for sentence in segment_line(segmenter, line) {
            out.format_sentence(&sentence, number + 1)?;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use echobook_core::RuleSegmenter;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Collect(Vec<(String, usize)>);

    impl OutputFormatter for Collect {
        fn format_sentence(&mut self, sentence: &str, line: usize) -> Result<()> {
            self.0.push((sentence.to_string(), line));
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_split_text_skips_markers_and_blanks() {
        let segmenter = RuleSegmenter::english().unwrap();
        let mut out = Collect::default();
        let text = "<!-- REF: 1:1 -->\nFirst one. Second one.\n\nThird one!\n";
        let count = split_text(&segmenter, text, &mut out).unwrap();

        assert_eq!(count, 3);
        assert_eq!(
            out.0,
            vec![
                ("First one.".to_string(), 2),
                ("Second one.".to_string(), 2),
                ("Third one!".to_string(), 4),
            ]
        );
    }

    #[test]
    fn test_execute_to_json_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("chapter.txt");
        let output = dir.path().join("sentences.json");
        fs::write(&input, "Hello there. General greeting.\n").unwrap();

        let args = SplitArgs {
            input: vec![input.display().to_string()],
            output: Some(output.clone()),
            format: OutputFormat::Json,
            rules: None,
        };
        args.execute(&CommandContext::default()).unwrap();

        let data: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(data.as_array().map(Vec::len), Some(2));
        assert_eq!(data[1]["text"], "General greeting.");
    }

    #[test]
    fn test_no_matching_files() {
        let args = SplitArgs {
            input: vec!["/nonexistent/*.txt".to_string()],
            output: None,
            format: OutputFormat::Text,
            rules: None,
        };
        assert!(args.execute(&CommandContext::default()).is_err());
    }
}
