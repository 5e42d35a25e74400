//! Table-driven sentence boundary rules

use super::config::SegmenterConfig;
use super::tables::{
    AbbreviationTrie, EllipsisSet, EnclosureMap, EnclosureRole, SentenceStarterTable,
};
use super::SentenceSegmenter;
use crate::error::Result;
use std::collections::HashSet;
use std::path::Path;

/// How a run of terminator characters ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunKind {
    /// Exactly one `.`
    Period,
    /// Nothing but ellipsis patterns
    Ellipsis,
    /// Anything else (`!`, `?!`, `....`)
    Strong,
}

/// Sentence segmenter driven by a [`SegmenterConfig`]
#[derive(Debug, Clone)]
pub struct RuleSegmenter {
    code: String,
    terminators: HashSet<char>,
    ellipsis: EllipsisSet,
    ellipsis_is_boundary: bool,
    enclosures: EnclosureMap,
    abbreviations: AbbreviationTrie,
    starters: SentenceStarterTable,
}

impl RuleSegmenter {
    /// Build from a parsed rules document
    pub fn from_config(config: &SegmenterConfig) -> Self {
        Self {
            code: config.metadata.code.clone(),
            terminators: config.terminators.chars.iter().copied().collect(),
            ellipsis: EllipsisSet::new(&config.ellipsis.patterns),
            ellipsis_is_boundary: config.ellipsis.treat_as_boundary,
            enclosures: EnclosureMap::new(
                config
                    .enclosures
                    .pairs
                    .iter()
                    .map(|p| (p.open, p.close, p.symmetric)),
            ),
            abbreviations: AbbreviationTrie::from_categories(&config.abbreviations.categories),
            starters: SentenceStarterTable::from_categories(&config.sentence_starters.categories),
        }
    }

    /// The embedded English rules
    pub fn english() -> Result<Self> {
        Ok(Self::from_config(SegmenterConfig::english()?))
    }

    /// Load rules from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::from_config(&SegmenterConfig::from_file(path)?))
    }

    /// Rules code from the metadata section
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Opener positions that have a matching closer later on the line.
    ///
    /// Unbalanced openers (a quote continued from the previous paragraph, a
    /// stray bracket) are ignored so they cannot suppress every later boundary.
    fn balanced_openers(&self, chars: &[char]) -> HashSet<usize> {
        let mut matched = HashSet::new();
        let mut stack: Vec<(usize, usize)> = Vec::new();
        for (pos, &ch) in chars.iter().enumerate() {
            match self.enclosures.role(ch) {
                Some(EnclosureRole::Open(id)) => stack.push((pos, id)),
                Some(EnclosureRole::Close(id)) => {
                    if let Some(k) = stack.iter().rposition(|&(_, t)| t == id) {
                        matched.insert(stack[k].0);
                        stack.truncate(k);
                    }
                }
                Some(EnclosureRole::Toggle(id)) => match stack.last() {
                    Some(&(open_pos, t)) if t == id => {
                        matched.insert(open_pos);
                        stack.pop();
                    }
                    _ => stack.push((pos, id)),
                },
                None => {}
            }
        }
        matched
    }

    /// Scan a run of terminators and ellipses starting at `pos`
    fn terminator_run(&self, chars: &[char], pos: usize) -> Option<(usize, RunKind)> {
        let mut end = pos;
        let mut saw_terminator = false;
        let mut saw_ellipsis = false;
        while end < chars.len() {
            if let Some(len) = self.ellipsis.match_at(chars, end) {
                end += len;
                saw_ellipsis = true;
            } else if self.terminators.contains(&chars[end]) {
                end += 1;
                saw_terminator = true;
            } else {
                break;
            }
        }
        if end == pos {
            return None;
        }
        let kind = if saw_ellipsis && !saw_terminator {
            RunKind::Ellipsis
        } else if end - pos == 1 && chars[pos] == '.' {
            RunKind::Period
        } else {
            RunKind::Strong
        };
        Some((end, kind))
    }

    /// The token immediately before `pos`, without leading punctuation
    fn preceding_token(chars: &[char], pos: usize) -> String {
        let start = chars[..pos]
            .iter()
            .rposition(|c| c.is_whitespace())
            .map_or(0, |p| p + 1);
        let token: String = chars[start..pos].iter().collect();
        token
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_string()
    }

    /// First character and alphabetic word after `pos`, skipping whitespace and opening punctuation
    fn following_word(&self, chars: &[char], pos: usize) -> Option<(char, String)> {
        let first = chars[pos..]
            .iter()
            .position(|&c| !c.is_whitespace() && !self.is_leading_punct(c))?
            + pos;
        let word: String = chars[first..]
            .iter()
            .take_while(|c| c.is_alphabetic())
            .collect();
        Some((chars[first], word))
    }

    fn is_leading_punct(&self, c: char) -> bool {
        self.enclosures.is_opener(c) || matches!(c, '\'' | '‘' | '—' | '-' | '¿' | '¡')
    }

    fn is_boundary(&self, chars: &[char], run_start: usize, after: usize, kind: RunKind) -> bool {
        let Some((first, word)) = self.following_word(chars, after) else {
            return false;
        };
        if first.is_lowercase() {
            return false;
        }
        match kind {
            RunKind::Strong => true,
            RunKind::Ellipsis => self.ellipsis_is_boundary && first.is_uppercase(),
            RunKind::Period => {
                let token = Self::preceding_token(chars, run_start);
                let is_initial = {
                    let mut it = token.chars();
                    matches!((it.next(), it.next()), (Some(c), None) if c.is_uppercase())
                };
                if is_initial || self.abbreviations.contains(&token) {
                    self.starters.is_sentence_starter(&word)
                } else {
                    true
                }
            }
        }
    }
}

impl SentenceSegmenter for RuleSegmenter {
    fn segment(&self, line: &str) -> Vec<String> {
        let chars: Vec<char> = line.chars().collect();
        let balanced = self.balanced_openers(&chars);
        let mut sentences = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        let mut start = 0;
        let mut pos = 0;

        while pos < chars.len() {
            if let Some((run_end, kind)) = self.terminator_run(&chars, pos) {
                // Closing quotes and brackets stay with the sentence they end
                let mut end = run_end;
                while end < chars.len()
                    && self.enclosures.is_closer(chars[end])
                    && !balanced.contains(&end)
                {
                    close(&mut stack, &self.enclosures, chars[end]);
                    end += 1;
                }

                let followed_by_space = chars.get(end).is_some_and(|c| c.is_whitespace());
                if stack.is_empty()
                    && followed_by_space
                    && self.is_boundary(&chars, pos, end, kind)
                {
                    push_trimmed(&mut sentences, &chars[start..end]);
                    start = end;
                }
                pos = end;
                continue;
            }

            let ch = chars[pos];
            if balanced.contains(&pos) {
                if let Some(EnclosureRole::Open(id) | EnclosureRole::Toggle(id)) =
                    self.enclosures.role(ch)
                {
                    stack.push(id);
                }
            } else if self.enclosures.is_closer(ch) {
                close(&mut stack, &self.enclosures, ch);
            }
            pos += 1;
        }

        push_trimmed(&mut sentences, &chars[start..]);
        sentences
    }
}

fn close(stack: &mut Vec<usize>, enclosures: &EnclosureMap, ch: char) {
    if let Some(EnclosureRole::Close(id) | EnclosureRole::Toggle(id)) = enclosures.role(ch) {
        if let Some(k) = stack.iter().rposition(|&t| t == id) {
            stack.truncate(k);
        }
    }
}

fn push_trimmed(out: &mut Vec<String>, chars: &[char]) {
    let text: String = chars.iter().collect();
    let text = text.trim();
    if !text.is_empty() {
        out.push(text.to_string());
    }
}
