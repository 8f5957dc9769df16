//! Localized UI strings for LegalIQ.
//!
//! Five languages are supported (see [`Language`]). Strings live in static
//! sections merged into a [`Translations`] table; lookups fall back to
//! English, then to the key itself.
//!
//! ```
//! use legaliq_i18n::{Language, Translations};
//!
//! let t = Translations::builtin();
//! assert_eq!(t.text("auth_log_in", Language::En), "Log In");
//! assert_eq!(
//!     t.format("language_prompt_title", Language::En, &[("languageName", "Hindi")]),
//!     "Switch to Hindi?"
//! );
//! ```

mod language;
mod prompt;
mod translations;

pub use language::{Language, UnsupportedLanguage, preferred_language};
pub use prompt::LanguagePrompt;
pub use translations::{
    COMMON, LANGUAGE_PROMPT, Localized, Section, Translations, interpolate,
};
