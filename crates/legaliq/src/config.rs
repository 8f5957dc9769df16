//! Configuration loaded from environment variables.
//!
//! Every setting has a default so the client core starts with zero
//! configuration against in-memory collaborators. A real identity service
//! and database need the `FIREBASE_*` keys.

use legaliq_i18n::Language;
use serde::{Deserialize, Serialize};

/// Log filter used when neither `LEGALIQ_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str =
    "warn,legaliq=info,legaliq_auth=info,legaliq_store=info";

/// Connection settings for the hosted identity service and database.
///
/// Serializes with the camelCase field names the hosted SDK expects.
/// Missing variables become empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    /// Env: `FIREBASE_API_KEY`
    pub api_key: String,
    /// Env: `FIREBASE_AUTH_DOMAIN`
    pub auth_domain: String,
    /// Env: `FIREBASE_PROJECT_ID`
    pub project_id: String,
    /// Env: `FIREBASE_STORAGE_BUCKET`
    pub storage_bucket: String,
    /// Env: `FIREBASE_MESSAGING_SENDER_ID`
    pub messaging_sender_id: String,
    /// Env: `FIREBASE_APP_ID`
    pub app_id: String,
    /// Env: `FIREBASE_MEASUREMENT_ID`
    pub measurement_id: String,
}

impl FirebaseConfig {
    /// Reads every key through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).unwrap_or_default();
        Self {
            api_key: var("FIREBASE_API_KEY"),
            auth_domain: var("FIREBASE_AUTH_DOMAIN"),
            project_id: var("FIREBASE_PROJECT_ID"),
            storage_bucket: var("FIREBASE_STORAGE_BUCKET"),
            messaging_sender_id: var("FIREBASE_MESSAGING_SENDER_ID"),
            app_id: var("FIREBASE_APP_ID"),
            measurement_id: var("FIREBASE_MEASUREMENT_ID"),
        }
    }

    /// Env names of the keys a hosted connection can't work without and
    /// that are empty here.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            ("FIREBASE_API_KEY", &self.api_key),
            ("FIREBASE_AUTH_DOMAIN", &self.auth_domain),
            ("FIREBASE_PROJECT_ID", &self.project_id),
            ("FIREBASE_APP_ID", &self.app_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_keys().is_empty()
    }
}

/// Client core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub firebase: FirebaseConfig,

    /// Named database to use instead of the project's default one.
    /// Env: `FIRESTORE_DATABASE`
    /// Default: `None`
    pub database_id: Option<String>,

    /// Initial UI language.
    /// Env: `LEGALIQ_LANGUAGE`
    /// Default: `en`
    pub language: Language,

    /// Log filter used when `RUST_LOG` isn't set.
    /// Env: `LEGALIQ_LOG`
    /// Default: [`DEFAULT_LOG_FILTER`]
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            firebase: FirebaseConfig::default(),
            database_id: None,
            language: Language::En,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self {
            firebase: FirebaseConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(db) = lookup("FIRESTORE_DATABASE") {
            if !db.trim().is_empty() {
                config.database_id = Some(db.trim().to_string());
            }
        }

        if let Some(code) = lookup("LEGALIQ_LANGUAGE") {
            match code.parse::<Language>() {
                Ok(lang) => config.language = lang,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Invalid LEGALIQ_LANGUAGE, using default"
                    );
                }
            }
        }

        if let Some(filter) = lookup("LEGALIQ_LOG") {
            if !filter.trim().is_empty() {
                config.log_filter = filter;
            }
        }

        // RUST_LOG is read directly by the EnvFilter in `init_tracing`.

        config
    }
}
