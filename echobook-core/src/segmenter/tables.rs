//! Lookup tables built from the rules document

use std::collections::{HashMap, HashSet};

/// Trie node keyed by lowercased character
#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    category: Option<String>,
}

/// Case-insensitive abbreviation trie
#[derive(Debug, Clone, Default)]
pub struct AbbreviationTrie {
    root: TrieNode,
}

impl AbbreviationTrie {
    /// Create an empty trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration categories
    pub fn from_categories(categories: &HashMap<String, Vec<String>>) -> Self {
        let mut trie = Self::new();
        for (category, abbreviations) in categories {
            for abbr in abbreviations {
                trie.insert(abbr, category);
            }
        }
        trie
    }

    /// Insert an abbreviation (without its final period)
    pub fn insert(&mut self, abbreviation: &str, category: &str) {
        let abbreviation = abbreviation.trim().trim_end_matches('.');
        if abbreviation.is_empty() {
            return;
        }
        let mut current = &mut self.root;
        for ch in abbreviation.chars().flat_map(char::to_lowercase) {
            current = current.children.entry(ch).or_default();
        }
        current.category = Some(category.to_string());
    }

    /// Check if the trie is empty
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Category of `word` when it is a known abbreviation
    pub fn lookup(&self, word: &str) -> Option<&str> {
        let mut current = &self.root;
        for ch in word.chars().flat_map(char::to_lowercase) {
            current = current.children.get(&ch)?;
        }
        current.category.as_deref()
    }

    /// Whether `word` is a known abbreviation
    pub fn contains(&self, word: &str) -> bool {
        self.lookup(word).is_some()
    }
}

/// Words that commonly open a sentence; case-sensitive
#[derive(Debug, Clone, Default)]
pub struct SentenceStarterTable {
    starters: HashSet<String>,
    max_length: usize,
}

impl SentenceStarterTable {
    /// Flatten categorized word lists into one set
    pub fn from_categories(categories: &HashMap<String, Vec<String>>) -> Self {
        let starters: HashSet<String> = categories.values().flatten().cloned().collect();
        let max_length = starters.iter().map(String::len).max().unwrap_or(0);
        Self {
            starters,
            max_length,
        }
    }

    /// Check if a word is a sentence starter
    pub fn is_sentence_starter(&self, word: &str) -> bool {
        word.len() <= self.max_length && self.starters.contains(word)
    }

    /// Check if we have any sentence starters configured
    pub fn is_empty(&self) -> bool {
        self.starters.is_empty()
    }
}

/// Ellipsis patterns, longest first
#[derive(Debug, Clone, Default)]
pub struct EllipsisSet {
    patterns: Vec<Vec<char>>,
}

impl EllipsisSet {
    /// Build from pattern strings
    pub fn new(patterns: &[String]) -> Self {
        let mut patterns: Vec<Vec<char>> = patterns
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.chars().collect())
            .collect();
        patterns.sort_by_key(|p| std::cmp::Reverse(p.len()));
        Self { patterns }
    }

    /// Length in chars of an ellipsis starting at `pos`, if any
    pub fn match_at(&self, chars: &[char], pos: usize) -> Option<usize> {
        self.patterns
            .iter()
            .find(|p| chars[pos..].starts_with(p.as_slice()))
            .map(Vec::len)
    }
}

/// Role of a character in an enclosure pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnclosureRole {
    Open(usize),
    Close(usize),
    /// Same character opens and closes
    Toggle(usize),
}

/// Maps characters to their enclosure roles
#[derive(Debug, Clone, Default)]
pub struct EnclosureMap {
    roles: HashMap<char, EnclosureRole>,
}

impl EnclosureMap {
    /// Create from `(open, close, symmetric)` pairs; the pair index is the type id
    pub fn new(pairs: impl IntoIterator<Item = (char, char, bool)>) -> Self {
        let mut roles = HashMap::new();
        for (idx, (open, close, symmetric)) in pairs.into_iter().enumerate() {
            if symmetric || open == close {
                roles.insert(open, EnclosureRole::Toggle(idx));
                roles.insert(close, EnclosureRole::Toggle(idx));
            } else {
                roles.insert(open, EnclosureRole::Open(idx));
                roles.insert(close, EnclosureRole::Close(idx));
            }
        }
        Self { roles }
    }

    /// Role of `ch`, if it belongs to a pair
    pub fn role(&self, ch: char) -> Option<EnclosureRole> {
        self.roles.get(&ch).copied()
    }

    /// Whether `ch` closes (or toggles) some enclosure
    pub fn is_closer(&self, ch: char) -> bool {
        matches!(
            self.role(ch),
            Some(EnclosureRole::Close(_) | EnclosureRole::Toggle(_))
        )
    }

    /// Whether `ch` opens (or toggles) some enclosure
    pub fn is_opener(&self, ch: char) -> bool {
        matches!(
            self.role(ch),
            Some(EnclosureRole::Open(_) | EnclosureRole::Toggle(_))
        )
    }
}
