//! Sentence boundary detection
//!
//! The engine only depends on the [`SentenceSegmenter`] trait. [`RuleSegmenter`]
//! is the default implementation, driven by a TOML rules document.

mod config;
mod rules;
mod tables;

pub use config::{
    Abbreviations, Ellipsis, EnclosurePair, Enclosures, Metadata, SegmenterConfig,
    SentenceStarters, Terminators,
};
pub use rules::RuleSegmenter;
pub use tables::{AbbreviationTrie, EllipsisSet, EnclosureMap, EnclosureRole, SentenceStarterTable};

/// Splits one line of text into sentences
pub trait SentenceSegmenter: Send + Sync {
    /// Ordered sentences of `line`; may be empty
    fn segment(&self, line: &str) -> Vec<String>;
}

impl<F> SentenceSegmenter for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn segment(&self, line: &str) -> Vec<String> {
        self(line)
    }
}

/// Segment a line, falling back to the whole trimmed line when the segmenter
/// returns nothing. Blank lines yield no sentences.
pub fn segment_line(segmenter: &dyn SentenceSegmenter, line: &str) -> Vec<String> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }
    let sentences: Vec<String> = segmenter
        .segment(line)
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        vec![line.to_string()]
    } else {
        sentences
    }
}
