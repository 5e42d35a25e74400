//! Raw text cleanup and marker insertion
//!
//! Line-oriented transforms applied to the raw book before extraction. Each
//! function takes the whole text and returns a new one.

use crate::error::{EchoError, Result};
use crate::markers::MarkerKind;
use log::{debug, info};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Within each `\n\n`-separated paragraph, replace single newlines with spaces
pub fn join_inline_newlines(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    text.split("\n\n")
        .map(|paragraph| paragraph.replace('\n', " "))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Insert a marker line before every line whose trimmed content is a listed title.
///
/// Every title must appear exactly once; otherwise nothing is produced and the
/// error lists the titles that were missing or repeated.
pub fn insert_title_markers(text: &str, titles: &[String], kind: MarkerKind) -> Result<String> {
    let mut counts: HashMap<&str, usize> = titles
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| (t, 0))
        .collect();

    let output = map_lines(text, |line, out| {
        let trimmed = line.trim();
        if let Some(count) = counts.get_mut(trimmed) {
            *count += 1;
            out.push(kind.render(trimmed));
        }
        out.push(line.to_string());
    });

    let in_order = |pred: fn(usize) -> bool| -> Vec<String> {
        titles
            .iter()
            .map(|t| t.trim())
            .filter(|t| counts.get(t).is_some_and(|&c| pred(c)))
            .map(str::to_string)
            .collect()
    };
    let missing = in_order(|c| c == 0);
    let duplicated = in_order(|c| c > 1);
    if !missing.is_empty() || !duplicated.is_empty() {
        return Err(EchoError::MarkerTitles {
            missing,
            duplicated,
        });
    }

    info!("Inserted {} {} markers", counts.len(), kind.keyword());
    Ok(output)
}

/// Insert `<!-- CHAPTER: N -->` before every line containing `Chapter N`
pub fn insert_numbered_chapter_markers(text: &str) -> String {
    static CHAPTER: OnceLock<Regex> = OnceLock::new();
    let re = CHAPTER
        .get_or_init(|| Regex::new(r"(?i)\bchapter\s+(\d+)").expect("chapter pattern is valid"));
    let mut inserted = 0usize;
    let output = map_lines(text, |line, out| {
        if let Some(caps) = re.captures(line) {
            out.push(MarkerKind::Chapter.render(&caps[1]));
            inserted += 1;
        }
        out.push(line.to_string());
    });
    info!("Inserted {inserted} numbered chapter markers");
    output
}

/// Move every `N:M ` verse locator onto its own reference marker line.
///
/// Text before the first locator stays on its own line; each locator becomes a
/// marker line followed by the text it introduces.
pub fn insert_reference_markers(text: &str) -> String {
    static LOCATOR: OnceLock<Regex> = OnceLock::new();
    let re = LOCATOR
        .get_or_init(|| Regex::new(r"\b(\d+:\d+) ").expect("locator pattern is valid"));
    map_lines(text, |line, out| {
        let mut last = 0;
        let mut pending: Option<&str> = None;
        for caps in re.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            push_segment(out, pending, &line[last..whole.start()]);
            pending = Some(caps.get(1).map_or("", |m| m.as_str()));
            last = whole.end();
        }
        match pending {
            None => out.push(line.to_string()),
            Some(_) => push_segment(out, pending, &line[last..]),
        }
    })
}

fn push_segment(out: &mut Vec<String>, reference: Option<&str>, segment: &str) {
    if let Some(reference) = reference {
        debug!("reference {reference}");
        out.push(MarkerKind::Reference.render(reference));
    }
    let segment = segment.trim();
    if !segment.is_empty() {
        out.push(segment.to_string());
    }
}

/// Apply `f` to every line, keeping a trailing newline if the input had one
fn map_lines<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str, &mut Vec<String>),
{
    let mut out = Vec::new();
    for line in text.lines() {
        f(line, &mut out);
    }
    let mut joined = out.join("\n");
    if text.ends_with('\n') {
        joined.push('\n');
    }
    joined
}
