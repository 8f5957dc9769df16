//! Keyed string tables.
//!
//! Strings are grouped into sections. [`Translations::builtin`] merges
//! them in order, so a key defined twice resolves to the later section.

use std::collections::HashMap;

use crate::Language;

/// One string in every supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Localized {
    pub en: &'static str,
    pub hi: &'static str,
    pub bn: &'static str,
    pub mr: &'static str,
    pub te: &'static str,
}

impl Localized {
    /// The string for `lang`, or `None` if that entry is blank.
    pub fn get(&self, lang: Language) -> Option<&'static str> {
        let text = match lang {
            Language::En => self.en,
            Language::Hi => self.hi,
            Language::Bn => self.bn,
            Language::Mr => self.mr,
            Language::Te => self.te,
        };
        (!text.is_empty()).then_some(text)
    }
}

/// A named group of keys.
pub type Section = &'static [(&'static str, Localized)];

/// Header, navigation, and auth buttons.
pub const COMMON: Section = &[
    (
        "tagline",
        Localized {
            en: "Your AI Legal Assistant",
            hi: "आपका AI कानूनी सहायक",
            bn: "আপনার AI আইনি সহায়ক",
            mr: "तुमचा AI कायदेशीर सहाय्यक",
            te: "మీ AI న్యాయ సహాయకుడు",
        },
    ),
    (
        "ai_legal_support_button_label",
        Localized {
            en: "AI Legal Support",
            hi: "AI कानूनी सहायता",
            bn: "AI আইনি সহায়তা",
            mr: "AI कायदेशीर सहाय्य",
            te: "AI న్యాయ సహాయం",
        },
    ),
    (
        "auth_log_in",
        Localized {
            en: "Log In",
            hi: "लॉग इन करें",
            bn: "লগ ইন করুন",
            mr: "लॉग इन करा",
            te: "లాగిన్ చేయండి",
        },
    ),
    (
        "auth_sign_up",
        Localized {
            en: "Sign Up",
            hi: "साइन अप करें",
            bn: "সাইন আপ করুন",
            mr: "साइन अप करा",
            te: "సైన్ అప్ చేయండి",
        },
    ),
    (
        "auth_log_out",
        Localized {
            en: "Log Out",
            hi: "लॉग आउट करें",
            bn: "লগ আউট করুন",
            mr: "लॉग आउट करा",
            te: "లాగ్ అవుట్ చేయండి",
        },
    ),
    (
        "nav_menu",
        Localized {
            en: "Menu",
            hi: "मेनू",
            bn: "মেনু",
            mr: "मेनू",
            te: "మెనూ",
        },
    ),
    (
        "nav_open_main_menu",
        Localized {
            en: "Open main menu",
            hi: "मुख्य मेनू खोलें",
            bn: "প্রধান মেনু খুলুন",
            mr: "मुख्य मेनू उघडा",
            te: "ప్రధాన మెనూ తెరవండి",
        },
    ),
];

/// The offer to switch to the browser's preferred language.
/// Every string takes a `{languageName}` parameter except the decline.
pub const LANGUAGE_PROMPT: Section = &[
    (
        "language_prompt_title",
        Localized {
            en: "Switch to {languageName}?",
            hi: "{languageName} में स्विच करें?",
            bn: "{languageName} এ পরিবর্তন করবেন?",
            mr: "{languageName} मध्ये बदलायचे आहे का?",
            te: "{languageName} కి మారాలా?",
        },
    ),
    (
        "language_prompt_message",
        Localized {
            en: "It looks like you prefer {languageName}. Would you like to switch the language of the app?",
            hi: "ऐसा लगता है कि आप {languageName} पसंद करते हैं। क्या आप ऐप की भाषा बदलना चाहेंगे?",
            bn: "মনে হচ্ছে আপনি {languageName} পছন্দ করেন। আপনি কি অ্যাপের ভাষা পরিবর্তন করতে চান?",
            mr: "असे दिसते की तुम्हाला {languageName} आवडते. तुम्हाला अॅपची भाषा बदलायची आहे का?",
            te: "మీరు {languageName}ని ఇష్టపడుతున్నట్లు కనిపిస్తోంది. మీరు అనువర్తనం యొక్క భాషను మార్చాలనుకుంటున్నారా?",
        },
    ),
    (
        "language_prompt_no_thanks",
        Localized {
            en: "No, Thanks",
            hi: "नहीं, धन्यवाद",
            bn: "না, ধন্যবাদ",
            mr: "नाही, धन्यवाद",
            te: "వద్దు, ధన్యవాదాలు",
        },
    ),
    (
        "language_prompt_translate",
        Localized {
            en: "Translate to {languageName}",
            hi: "{languageName} में अनुवाद करें",
            bn: "{languageName} এ অনুবাদ করুন",
            mr: "{languageName} मध्ये अनुवाद करा",
            te: "{languageName}లోకి అనువదించండి",
        },
    ),
];

/// A merged key → strings table.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    entries: HashMap<&'static str, Localized>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in sections, merged.
    pub fn builtin() -> Self {
        Self::new().with_section(COMMON).with_section(LANGUAGE_PROMPT)
    }

    /// Merges `section` in. Its keys replace existing ones.
    pub fn with_section(mut self, section: Section) -> Self {
        self.merge(section);
        self
    }

    pub fn merge(&mut self, section: Section) {
        self.entries.extend(section.iter().copied());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every known key, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// The string for `key` in `lang`.
    ///
    /// Falls back to English when `lang` has no entry, and to the key
    /// itself when the key is unknown. The latter is logged.
    pub fn text<'a>(&self, key: &'a str, lang: Language) -> &'a str {
        match self.entries.get(key) {
            Some(entry) => entry
                .get(lang)
                .or_else(|| entry.get(Language::En))
                .unwrap_or(key),
            None => {
                tracing::warn!(key, %lang, "missing translation key");
                key
            }
        }
    }

    /// [`text`](Self::text) with `{name}` placeholders replaced from
    /// `params`.
    pub fn format(&self, key: &str, lang: Language, params: &[(&str, &str)]) -> String {
        interpolate(self.text(key, lang), params)
    }
}

/// Replaces each `{name}` in `template` with its value in `params`.
///
/// Placeholders without a value, and braces that don't form a
/// placeholder, are kept verbatim.
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        match params.iter().find(|(k, _)| *k == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERRIDE: Section = &[(
        "tagline",
        Localized {
            en: "Override",
            hi: "",
            bn: "",
            mr: "",
            te: "",
        },
    )];

    #[test]
    fn test_builtin_has_every_section() {
        let t = Translations::builtin();
        assert_eq!(t.len(), COMMON.len() + LANGUAGE_PROMPT.len());
        assert!(t.contains("auth_log_in"));
        assert!(t.contains("language_prompt_title"));
    }

    #[test]
    fn test_builtin_entries_are_complete() {
        let t = Translations::builtin();
        for key in t.keys() {
            for lang in Language::ALL {
                assert_ne!(t.text(key, lang), key, "{key} missing for {lang}");
            }
        }
    }

    #[test]
    fn test_text_returns_requested_language() {
        let t = Translations::builtin();
        assert_eq!(t.text("auth_log_out", Language::En), "Log Out");
        assert_eq!(t.text("auth_log_out", Language::Hi), "लॉग आउट करें");
    }

    #[test]
    fn test_later_section_overrides_and_blank_falls_back_to_english() {
        let t = Translations::builtin().with_section(OVERRIDE);
        assert_eq!(t.text("tagline", Language::En), "Override");
        assert_eq!(t.text("tagline", Language::Te), "Override");
    }

    #[test]
    fn test_text_unknown_key_returns_key() {
        let t = Translations::builtin();
        assert_eq!(t.text("no_such_key", Language::Bn), "no_such_key");
    }

    #[test]
    fn test_format_substitutes_language_name() {
        let t = Translations::builtin();
        let title = t.format(
            "language_prompt_title",
            Language::Hi,
            &[("languageName", Language::Hi.native_name())],
        );
        assert_eq!(title, "हिन्दी में स्विच करें?");
    }

    #[test]
    fn test_interpolate_keeps_unknown_placeholders() {
        assert_eq!(
            interpolate("Hi {name}, see {other}", &[("name", "Asha")]),
            "Hi Asha, see {other}"
        );
    }

    #[test]
    fn test_interpolate_unclosed_brace_is_literal() {
        assert_eq!(interpolate("a {b", &[("b", "x")]), "a {b");
        assert_eq!(interpolate("{}", &[]), "{}");
        assert_eq!(interpolate("no params", &[]), "no params");
    }

    #[test]
    fn test_interpolate_repeated_placeholder() {
        assert_eq!(interpolate("{x}-{x}", &[("x", "1")]), "1-1");
    }
}
