//! Chapter extraction from marked-up book text
//!
//! A small state machine reads the book line by line:
//!
//! | state       | SUBBOOK marker     | CHAPTER marker | body line  |
//! |-------------|--------------------|----------------|------------|
//! | `Preamble`  | → `InSubbook`      | → `InChapter`  | discarded  |
//! | `InSubbook` | → `InSubbook`      | → `InChapter`  | discarded  |
//! | `InChapter` | flush, `InSubbook` | flush, `InChapter` | kept   |
//!
//! Reference markers and malformed markers are body lines.

use crate::error::{EchoError, Result};
use crate::markers::{parse_marker, MarkerKind};
use crate::naming::{chapter_text_filename, subbook_folder};
use crate::text::title_case;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorState {
    /// Before any marker
    Preamble,
    /// After a subbook marker, before its first chapter
    InSubbook,
    /// Accumulating a chapter body
    InChapter,
}

/// A declared subbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubbookHeading {
    /// 1-based, in encounter order
    pub number: u32,
    /// Title as written in the marker
    pub title: String,
}

/// One chapter ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterUnit {
    /// Declared subbook, or `None` for the synthetic default subbook
    pub subbook: Option<SubbookHeading>,
    /// Positional number within the subbook
    pub number: u32,
    /// Title from the chapter marker
    pub title: String,
    /// Body lines, untrimmed, in order
    pub body: Vec<String>,
}

impl ChapterUnit {
    /// Subbook number, 1 for the synthetic default subbook
    pub fn subbook_number(&self) -> u32 {
        self.subbook.as_ref().map_or(1, |s| s.number)
    }

    /// Title-cased title line, a blank line, then the trimmed body
    pub fn render(&self) -> String {
        let body = self.body.join("\n");
        format!("{}\n\n{}\n", title_case(&self.title), body.trim())
    }

    /// Path of the chapter file relative to the output directory
    pub fn relative_path(&self) -> PathBuf {
        let file = chapter_text_filename(self.number);
        match &self.subbook {
            Some(s) => Path::new(&subbook_folder(s.number, &s.title)).join(file),
            None => PathBuf::from(file),
        }
    }
}

/// Result of splitting a book
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Chapters in discovery order
    pub units: Vec<ChapterUnit>,
    /// Body lines outside any chapter
    pub discarded_lines: usize,
    /// Chapters dropped for having no body
    pub empty_chapters: Vec<String>,
}

/// Line-driven chapter parser
#[derive(Debug)]
pub struct ChapterExtractor {
    state: ExtractorState,
    subbook: Option<SubbookHeading>,
    subbooks_seen: u32,
    chapters_in_subbook: u32,
    title: String,
    body: Vec<String>,
    out: Extraction,
}

impl Default for ChapterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ChapterExtractor {
    /// A parser in the `Preamble` state
    pub fn new() -> Self {
        Self {
            state: ExtractorState::Preamble,
            subbook: None,
            subbooks_seen: 0,
            chapters_in_subbook: 0,
            title: String::new(),
            body: Vec::new(),
            out: Extraction::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> ExtractorState {
        self.state
    }

    /// Feed one line
    pub fn push_line(&mut self, line: &str) {
        let marker = parse_marker(line).filter(|m| m.kind != MarkerKind::Reference);
        match marker {
            Some(m) if m.kind == MarkerKind::Subbook => {
                self.flush();
                self.subbooks_seen += 1;
                if self.subbooks_seen == 1 && !self.out.units.is_empty() {
                    warn!(
                        "Chapters before the first subbook marker go to the default subbook; \
                         subbook '{}' is also numbered 1",
                        m.value
                    );
                }
                debug!("subbook {}: {}", self.subbooks_seen, m.value);
                self.subbook = Some(SubbookHeading {
                    number: self.subbooks_seen,
                    title: m.value,
                });
                self.chapters_in_subbook = 0;
                self.state = ExtractorState::InSubbook;
            }
            Some(m) => {
                self.flush();
                debug!("chapter: {}", m.value);
                self.title = m.value;
                self.state = ExtractorState::InChapter;
            }
            None => match self.state {
                ExtractorState::InChapter => self.body.push(line.to_string()),
                ExtractorState::Preamble | ExtractorState::InSubbook => {
                    if !line.trim().is_empty() {
                        self.out.discarded_lines += 1;
                    }
                }
            },
        }
    }

    fn flush(&mut self) {
        if self.state != ExtractorState::InChapter {
            return;
        }
        let body = std::mem::take(&mut self.body);
        let title = std::mem::take(&mut self.title);
        if body.iter().all(|l| l.trim().is_empty()) {
            warn!("Dropping chapter '{title}' with no body");
            self.out.empty_chapters.push(title);
            return;
        }
        self.chapters_in_subbook += 1;
        self.out.units.push(ChapterUnit {
            subbook: self.subbook.clone(),
            number: self.chapters_in_subbook,
            title,
            body,
        });
    }

    /// Flush the last chapter and return everything collected
    pub fn finish(mut self) -> Extraction {
        self.flush();
        self.out
    }
}

/// Split marked-up text into chapter units
pub fn extract_chapters(text: &str) -> Extraction {
    let mut extractor = ChapterExtractor::new();
    for line in text.lines() {
        extractor.push_line(line);
    }
    let extraction = extractor.finish();
    if extraction.discarded_lines > 0 {
        info!(
            "Discarded {} lines outside any chapter",
            extraction.discarded_lines
        );
    }
    extraction
}

/// Write every unit under `out_dir`, returning the written paths
pub fn write_units(units: &[ChapterUnit], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(units.len());
    for unit in units {
        let path = out_dir.join(unit.relative_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| EchoError::io(parent, e))?;
        }
        fs::write(&path, unit.render()).map_err(|e| EchoError::io(&path, e))?;
        debug!("wrote {}", path.display());
        written.push(path);
    }
    info!("Wrote {} chapter files to {}", written.len(), out_dir.display());
    Ok(written)
}
