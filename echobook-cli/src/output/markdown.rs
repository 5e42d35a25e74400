//! Markdown output formatter

use super::OutputFormatter;
use anyhow::Result;
use std::io::Write;

/// Markdown formatter - outputs sentences as a numbered list
pub struct MarkdownFormatter<W: Write> {
    writer: W,
    sentence_count: usize,
}

impl<W: Write> MarkdownFormatter<W> {
    /// Create a new markdown formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            sentence_count: 0,
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for MarkdownFormatter<W> {
    fn format_sentence(&mut self, sentence: &str, line: usize) -> Result<()> {
        self.sentence_count += 1;
        writeln!(
            self.writer,
            "{}. {} <sub>line {}</sub>",
            self.sentence_count,
            sentence.trim(),
            line
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "---")?;
        writeln!(self.writer, "*Total sentences: {}*", self.sentence_count)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_list_with_total() {
        let mut f = MarkdownFormatter::new(Vec::new());
        f.format_sentence("One.", 4).unwrap();
        f.finish().unwrap();
        let out = String::from_utf8(f.writer).unwrap();
        assert!(out.starts_with("1. One. <sub>line 4</sub>\n"));
        assert!(out.ends_with("*Total sentences: 1*\n"));
    }
}
