use crate::{Language, Translations};

/// The rendered offer to switch languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePrompt {
    /// The language being offered.
    pub language: Language,
    pub title: String,
    pub message: String,
    pub accept: String,
    pub decline: String,
}

impl LanguagePrompt {
    /// Renders the prompt when the user's preferred language differs from
    /// the current one. The prompt is written in the preferred language.
    pub fn offer(
        translations: &Translations,
        current: Language,
        preferred: Language,
    ) -> Option<Self> {
        if current == preferred {
            return None;
        }

        let params = [("languageName", preferred.native_name())];
        let render = |key: &str| translations.format(key, preferred, &params);

        Some(Self {
            language: preferred,
            title: render("language_prompt_title"),
            message: render("language_prompt_message"),
            accept: render("language_prompt_translate"),
            decline: render("language_prompt_no_thanks"),
        })
    }
}
