//! Language codes of the form `xx-XX`

use crate::error::EchoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated `xx-XX` language code (two lowercase letters, dash, two uppercase letters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse and validate a language code
    pub fn new(code: impl Into<String>) -> Result<Self, EchoError> {
        let code = code.into();
        if is_language_code(&code) {
            Ok(Self(code))
        } else {
            Err(EchoError::InvalidLanguage(code))
        }
    }

    /// The code as written, e.g. `en-US`
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// English display name used in translation prompts
    pub fn display_name(&self) -> Option<&'static str> {
        LANGUAGE_NAMES
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, name)| *name)
    }
}

/// Check the `^[a-z]{2}-[A-Z]{2}$` pattern without allocating
pub fn is_language_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 5
        && bytes[0].is_ascii_lowercase()
        && bytes[1].is_ascii_lowercase()
        && bytes[2] == b'-'
        && bytes[3].is_ascii_uppercase()
        && bytes[4].is_ascii_uppercase()
}

/// Parse a comma-separated list such as `"en-US, es-ES,fr-FR"`
pub fn parse_language_list(list: &str) -> Result<Vec<LanguageCode>, EchoError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(LanguageCode::new)
        .collect()
}

/// Every language with a known display name, in table order
pub fn known_languages() -> impl Iterator<Item = (&'static str, &'static str)> {
    LANGUAGE_NAMES.iter().copied()
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = EchoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = EchoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("af-ZA", "Afrikaans"),
    ("ar-SA", "Arabic"),
    ("hy-AM", "Armenian"),
    ("az-AZ", "Azerbaijani"),
    ("be-BY", "Belarusian"),
    ("bs-BA", "Bosnian"),
    ("bg-BG", "Bulgarian"),
    ("ca-ES", "Catalan"),
    ("zh-CN", "Chinese"),
    ("hr-HR", "Croatian"),
    ("cs-CZ", "Czech"),
    ("da-DK", "Danish"),
    ("nl-NL", "Dutch"),
    ("en-US", "English"),
    ("et-EE", "Estonian"),
    ("fi-FI", "Finnish"),
    ("fr-FR", "French"),
    ("gl-ES", "Galician"),
    ("de-DE", "German"),
    ("el-GR", "Greek"),
    ("he-IL", "Hebrew"),
    ("hi-IN", "Hindi"),
    ("hu-HU", "Hungarian"),
    ("is-IS", "Icelandic"),
    ("id-ID", "Indonesian"),
    ("it-IT", "Italian"),
    ("ja-JP", "Japanese"),
    ("kn-IN", "Kannada"),
    ("kk-KZ", "Kazakh"),
    ("ko-KR", "Korean"),
    ("lv-LV", "Latvian"),
    ("lt-LT", "Lithuanian"),
    ("mk-MK", "Macedonian"),
    ("ms-MY", "Malay"),
    ("mr-IN", "Marathi"),
    ("mi-NZ", "Maori"),
    ("ne-NP", "Nepali"),
    ("nb-NO", "Norwegian"),
    ("fa-IR", "Persian"),
    ("pl-PL", "Polish"),
    ("pt-PT", "Portuguese"),
    ("ro-RO", "Romanian"),
    ("ru-RU", "Russian"),
    ("sr-RS", "Serbian"),
    ("sk-SK", "Slovak"),
    ("sl-SI", "Slovenian"),
    ("es-ES", "Spanish"),
    ("sw-KE", "Swahili"),
    ("sv-SE", "Swedish"),
    ("tl-PH", "Tagalog"),
    ("ta-IN", "Tamil"),
    ("th-TH", "Thai"),
    ("tr-TR", "Turkish"),
    ("uk-UA", "Ukrainian"),
    ("ur-PK", "Urdu"),
    ("vi-VN", "Vietnamese"),
    ("cy-GB", "Welsh"),
];
