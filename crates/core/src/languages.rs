//! Supported Languages
//!
//! The fixed table of ISO-639-1 codes that the upstream transcription model
//! accepts, along with the human-readable label used in interpreter prompts.

use std::fmt;
use std::str::FromStr;

/// Every supported language as `(code, label)`, sorted by code.
const LANGUAGES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("ar", "Arabic"),
    ("az", "Azerbaijani"),
    ("be", "Belarusian"),
    ("bg", "Bulgarian"),
    ("bs", "Bosnian"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("cy", "Welsh"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("gl", "Galician"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("hy", "Armenian"),
    ("id", "Indonesian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("kk", "Kazakh"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("mi", "Maori"),
    ("mk", "Macedonian"),
    ("mr", "Marathi"),
    ("ms", "Malay"),
    ("ne", "Nepali"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("ta", "Tamil"),
    ("th", "Thai"),
    ("tl", "Tagalog"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese (Mandarin)"),
];

/// Returned when a code is not in the supported table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language code: '{0}'")]
pub struct LanguageError(pub String);

/// A validated, supported language.
///
/// Only constructible from an entry of the supported table, so `code()` and
/// `label()` never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
    label: &'static str,
}

impl Language {
    /// English, the default receptionist language.
    pub const ENGLISH: Language = Language {
        code: "en",
        label: "English",
    };

    /// Mandarin Chinese, the default patient language.
    pub const CHINESE: Language = Language {
        code: "zh",
        label: "Chinese (Mandarin)",
    };

    /// Looks up a code, ignoring ASCII case and surrounding whitespace.
    pub fn from_code(code: &str) -> Option<Language> {
        let normalized = code.trim().to_ascii_lowercase();
        LANGUAGES
            .binary_search_by(|(c, _)| (*c).cmp(normalized.as_str()))
            .ok()
            .map(|idx| {
                let (code, label) = LANGUAGES[idx];
                Language { code, label }
            })
    }

    /// Resolves a raw, possibly missing code to a supported language.
    ///
    /// Anything that is not a supported code yields `fallback`.
    pub fn resolve(candidate: Option<&str>, fallback: Language) -> Language {
        candidate.and_then(Self::from_code).unwrap_or(fallback)
    }

    /// The lowercase ISO-639-1 code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// The human-readable label, e.g. `"English"`.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Iterates over every supported language in code order.
    pub fn all() -> impl Iterator<Item = Language> {
        LANGUAGES
            .iter()
            .map(|&(code, label)| Language { code, label })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| LanguageError(s.to_string()))
    }
}
