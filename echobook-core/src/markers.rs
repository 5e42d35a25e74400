//! Marker line recognition
//!
//! Markers are HTML comments on their own line inserted by the preprocessor:
//! `<!-- SUBBOOK: title -->`, `<!-- CHAPTER: title -->`, `<!-- REF: locator -->`.
//! Anything that does not match is ordinary body text.

use regex::Regex;
use std::sync::OnceLock;

/// Kind of marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Opens a new subbook
    Subbook,
    /// Opens a new chapter
    Chapter,
    /// Sets the reference carried by following sentences
    Reference,
}

impl MarkerKind {
    /// Keyword used inside the comment
    pub fn keyword(&self) -> &'static str {
        match self {
            MarkerKind::Subbook => "SUBBOOK",
            MarkerKind::Chapter => "CHAPTER",
            MarkerKind::Reference => "REF",
        }
    }

    /// Render a marker line (without trailing newline)
    pub fn render(&self, value: &str) -> String {
        format!("<!-- {}: {} -->", self.keyword(), value.trim())
    }
}

/// A recognized marker and its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Marker kind
    pub kind: MarkerKind,
    /// Trimmed payload (title or locator)
    pub value: String,
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"(?i)^<!--\s*(SUBBOOK|CHAPTER|REF):\s*(\S.*?)\s*-->")
            .expect("marker pattern is valid")
    })
}

/// Recognize a marker at the start of a (trimmed) line
pub fn parse_marker(line: &str) -> Option<Marker> {
    let caps = marker_regex().captures(line.trim())?;
    let kind = match caps[1].to_ascii_uppercase().as_str() {
        "SUBBOOK" => MarkerKind::Subbook,
        "CHAPTER" => MarkerKind::Chapter,
        _ => MarkerKind::Reference,
    };
    Some(Marker {
        kind,
        value: caps[2].trim().to_string(),
    })
}
