//! The application context.
//!
//! [`App`] is created once at startup and owns everything the UI layer
//! shares: the session provider, the document store, the string tables,
//! and the current language. Dropping it (or calling
//! [`shutdown`](App::shutdown)) releases the auth-state subscription.

use std::sync::Arc;

use legaliq_auth::{IdentityService, Session, SessionProvider};
use legaliq_i18n::{Language, LanguagePrompt, Translations, preferred_language};
use legaliq_store::{
    AnalysisDraft, ChatHistoryUpdate, DocumentDatabase, DocumentStore,
    create_analysis, load_chat_history, save_user_profile, update_chat_history,
};
use legaliq_types::{ChatMessage, User, UserCredential};
use tokio::sync::watch;

use crate::{AppConfig, LegalIqError};

/// Builder for an [`App`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use legaliq::prelude::*;
///
/// let app = AppBuilder::new()
///     .language(Language::Hi)
///     .build(Arc::new(InMemoryIdentity::new()), Arc::new(InMemoryDatabase::new()));
/// assert_eq!(app.text("auth_log_in"), "लॉग इन करें");
/// ```
pub struct AppBuilder {
    config: AppConfig,
    translations: Translations,
}

impl AppBuilder {
    /// Default configuration and the built-in string tables.
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            translations: Translations::builtin(),
        }
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the configured starting language.
    pub fn language(mut self, language: Language) -> Self {
        self.config.language = language;
        self
    }

    pub fn translations(mut self, translations: Translations) -> Self {
        self.translations = translations;
        self
    }

    /// Mounts the session provider on `identity` and wraps `database`.
    pub fn build<I, D>(self, identity: Arc<I>, database: Arc<D>) -> App<I, D>
    where
        I: IdentityService,
        D: DocumentDatabase,
    {
        let missing = self.config.firebase.missing_keys();
        if !missing.is_empty() {
            tracing::debug!(
                ?missing,
                "hosted service keys not configured"
            );
        }

        let language = self.config.language;
        tracing::info!(%language, "app context started");

        App {
            session: SessionProvider::mount(identity),
            store: DocumentStore::from_arc(database),
            translations: self.translations,
            language,
            config: self.config,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared application state for one running client.
pub struct App<I: IdentityService, D: DocumentDatabase> {
    config: AppConfig,
    session: SessionProvider<I>,
    store: DocumentStore<D>,
    translations: Translations,
    language: Language,
}

impl<I: IdentityService, D: DocumentDatabase> App<I, D> {
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The session provider. Forms submit through this.
    pub fn session(&self) -> &SessionProvider<I> {
        &self.session
    }

    pub fn store(&self) -> &DocumentStore<D> {
        &self.store
    }

    // -- Session ----------------------------------------------------------

    /// A receiver that sees every session change.
    pub fn watch_session(&self) -> watch::Receiver<Session> {
        self.session.watch()
    }

    /// Waits for the first auth-state report.
    pub async fn ready(&self) -> Session {
        self.session.ready().await
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    /// What the header shows for the signed-in user.
    pub fn account_label(&self) -> Option<String> {
        self.current_user().map(|user| user.label().to_string())
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UserCredential, LegalIqError> {
        Ok(self.session.sign_up(email, password, name).await?)
    }

    pub async fn log_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, LegalIqError> {
        Ok(self.session.log_in(email, password).await?)
    }

    pub async fn log_out(&self) -> Result<(), LegalIqError> {
        Ok(self.session.log_out().await?)
    }

    pub async fn sign_in_with_google(&self) -> Result<UserCredential, LegalIqError> {
        Ok(self.session.sign_in_with_google().await?)
    }

    /// Releases the auth-state subscription. Later notifications are
    /// ignored. Idempotent.
    pub fn shutdown(&mut self) {
        if self.session.is_mounted() {
            self.session.unmount();
            tracing::info!("app context shut down");
        }
    }

    // -- Analyses ---------------------------------------------------------

    fn require_user(&self) -> Result<User, LegalIqError> {
        self.current_user().ok_or(LegalIqError::NotSignedIn)
    }

    /// Writes the signed-in user's profile document.
    pub async fn save_profile(&self) -> Result<(), LegalIqError> {
        let user = self.require_user()?;
        save_user_profile(&self.store, &user).await?;
        Ok(())
    }

    /// Creates an analysis for the signed-in user and returns its id.
    pub async fn start_analysis(
        &self,
        draft: &AnalysisDraft,
    ) -> Result<String, LegalIqError> {
        let user = self.require_user()?;
        Ok(create_analysis(&self.store, user.uid.as_str(), draft).await?)
    }

    /// Appends messages to an analysis of the signed-in user.
    ///
    /// Best-effort, like [`update_chat_history`]: with nobody signed in the
    /// call is skipped, and store failures are only logged.
    pub async fn record_chat(
        &self,
        analysis_id: &str,
        messages: &[ChatMessage],
    ) -> ChatHistoryUpdate {
        let uid = self
            .current_user()
            .map(|user| user.uid.0)
            .unwrap_or_default();
        update_chat_history(&self.store, &uid, analysis_id, messages).await
    }

    pub async fn chat_history(
        &self,
        analysis_id: &str,
    ) -> Result<Vec<ChatMessage>, LegalIqError> {
        let user = self.require_user()?;
        Ok(load_chat_history(&self.store, user.uid.as_str(), analysis_id).await?)
    }

    // -- Language ---------------------------------------------------------

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        if self.language != language {
            tracing::info!(from = %self.language, to = %language, "language changed");
            self.language = language;
        }
    }

    /// Switches to the language named by `code` (`"te"`, `"hi-IN"`).
    pub fn set_language_code(&mut self, code: &str) -> Result<Language, LegalIqError> {
        let language = code.parse::<Language>()?;
        self.set_language(language);
        Ok(language)
    }

    /// The string for `key` in the current language.
    pub fn text<'a>(&self, key: &'a str) -> &'a str {
        self.translations.text(key, self.language)
    }

    pub fn format(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.translations.format(key, self.language, params)
    }

    /// The switch prompt to show for a browser's language preferences, if
    /// any. See [`LanguagePrompt::offer`].
    pub fn language_prompt<'t>(
        &self,
        browser_tags: impl IntoIterator<Item = &'t str>,
    ) -> Option<LanguagePrompt> {
        let preferred = preferred_language(browser_tags)?;
        LanguagePrompt::offer(&self.translations, self.language, preferred)
    }
}
