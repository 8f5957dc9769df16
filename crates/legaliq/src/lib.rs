//! # LegalIQ
//!
//! Client core for the LegalIQ legal-assistance app.
//!
//! The UI layer talks to one [`App`] context. It owns:
//!
//! - the auth session ([`legaliq_auth`]): sign-up, log-in, log-out,
//!   federated sign-in, and the session state kept in sync with the
//!   identity service
//! - the document store ([`legaliq_store`]): the chained adapter and
//!   analysis chat history
//! - the string tables ([`legaliq_i18n`]) and the current language
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use legaliq::prelude::*;
//!
//! # async fn run() -> Result<(), LegalIqError> {
//! let config = AppConfig::from_env();
//! legaliq::init_tracing(&config.log_filter);
//!
//! let identity = Arc::new(InMemoryIdentity::new());
//! let database = Arc::new(InMemoryDatabase::new());
//! let app = AppBuilder::new().config(config).build(identity, database);
//!
//! app.ready().await;
//! app.sign_up("asha@example.com", "secret1", "Asha").await?;
//! # Ok(())
//! # }
//! ```

mod app;
mod config;
mod error;
mod telemetry;

pub use app::{App, AppBuilder};
pub use config::{AppConfig, DEFAULT_LOG_FILTER, FirebaseConfig};
pub use error::LegalIqError;
pub use telemetry::{env_filter, init_tracing};

pub use legaliq_auth as auth;
pub use legaliq_i18n as i18n;
pub use legaliq_store as store;
pub use legaliq_types as types;

/// Everything a UI layer usually needs.
pub mod prelude {
    pub use crate::{App, AppBuilder, AppConfig, FirebaseConfig, LegalIqError};
    pub use legaliq_auth::{
        AuthError, FormOutcome, IdentityService, InMemoryIdentity, LogInForm,
        Session, SessionState, SignUpForm,
    };
    pub use legaliq_i18n::{Language, LanguagePrompt, Translations};
    pub use legaliq_store::{
        AnalysisDraft, ChatHistoryUpdate, DocumentDatabase, DocumentStore,
        InMemoryDatabase,
    };
    pub use legaliq_types::{ChatMessage, Role, User, UserCredential, UserId};
}
