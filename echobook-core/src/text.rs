//! Small text helpers shared by the extractor and the engine

/// Words kept lowercase in titles unless they lead the title
const MINOR_WORDS: [&str; 11] = [
    "of", "and", "the", "in", "on", "at", "to", "for", "with", "a", "an",
];

/// Title-case a chapter or subbook title.
///
/// Every whitespace-separated word is capitalized (first letter upper, rest lower)
/// except minor words, which are lowercased unless they are the first word.
/// Runs of whitespace collapse to a single space.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && MINOR_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Remove characters that are invalid in file or directory names
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_first_word_always_capitalized() {
        assert_eq!(title_case("the golden bird"), "The Golden Bird");
        assert_eq!(title_case("song of the sea"), "Song of the Sea");
    }

    #[test]
    fn test_title_case_normalizes_shouting() {
        assert_eq!(title_case("THE BOOK OF ALMA"), "The Book of Alma");
        assert_eq!(title_case("  a   tale  "), "A Tale");
    }

    #[test]
    fn test_title_case_keeps_digits() {
        assert_eq!(title_case("chapter 12"), "Chapter 12");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Words of Mormon: Part 1?"), "Words of Mormon Part 1");
        assert_eq!(sanitize_filename(r#"a\b/c*d"e<f>g|h"#), "abcdefgh");
    }
}
