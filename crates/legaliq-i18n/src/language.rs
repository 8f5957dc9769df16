use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language the app ships strings for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Bn,
    Mr,
    Te,
}

/// A language code no table exists for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0:?}")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    /// Every supported language, English first.
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Hi,
        Language::Bn,
        Language::Mr,
        Language::Te,
    ];

    /// The two-letter code, e.g. `"hi"`.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Bn => "bn",
            Self::Mr => "mr",
            Self::Te => "te",
        }
    }

    /// The language's name in its own script.
    pub fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "हिन्दी",
            Self::Bn => "বাংলা",
            Self::Mr => "मराठी",
            Self::Te => "తెలుగు",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi",
            Self::Bn => "Bengali",
            Self::Mr => "Marathi",
            Self::Te => "Telugu",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parses a code or a region tag: `"hi"`, `"HI"`, `"hi-IN"`, `"te_IN"`.
impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let primary = trimmed
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == primary)
            .ok_or_else(|| UnsupportedLanguage(trimmed.to_string()))
    }
}

/// The first supported language in a preference list.
///
/// Entries may carry a quality suffix (`"hi;q=0.8"`), which is ignored:
/// list order is the preference order. A comma-separated header value can
/// be passed as `header.split(',')`.
pub fn preferred_language<'a>(
    tags: impl IntoIterator<Item = &'a str>,
) -> Option<Language> {
    tags.into_iter()
        .filter_map(|tag| tag.split(';').next())
        .find_map(|tag| tag.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_codes() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>(), Ok(lang));
        }
    }

    #[test]
    fn test_parse_region_tags_and_case() {
        assert_eq!("hi-IN".parse(), Ok(Language::Hi));
        assert_eq!("te_IN".parse(), Ok(Language::Te));
        assert_eq!(" BN ".parse(), Ok(Language::Bn));
        assert_eq!("en-GB".parse(), Ok(Language::En));
    }

    #[test]
    fn test_parse_unsupported_keeps_input() {
        assert_eq!(
            "fr-FR".parse::<Language>(),
            Err(UnsupportedLanguage("fr-FR".into()))
        );
        assert!("".parse::<Language>().is_err());
    }

    #[test]
    fn test_preferred_language_takes_first_supported() {
        assert_eq!(
            preferred_language(["fr-FR", "mr-IN", "hi"]),
            Some(Language::Mr)
        );
        assert_eq!(
            preferred_language("de,te;q=0.9,en;q=0.8".split(',')),
            Some(Language::Te)
        );
    }

    #[test]
    fn test_preferred_language_none_supported() {
        assert_eq!(preferred_language(["fr", "de"]), None);
        assert_eq!(preferred_language([]), None);
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Language::Mr).unwrap(), "\"mr\"");
        let lang: Language = serde_json::from_str("\"te\"").unwrap();
        assert_eq!(lang, Language::Te);
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::Bn.to_string(), "bn");
        assert_eq!(Language::default(), Language::En);
    }
}
