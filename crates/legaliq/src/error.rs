//! Unified error type for the LegalIQ client core.

use legaliq_auth::AuthError;
use legaliq_i18n::UnsupportedLanguage;
use legaliq_store::StoreError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attributes let `?` lift sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LegalIqError {
    /// Sign-up, log-in, log-out, or federated sign-in failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A document-store call failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Language(#[from] UnsupportedLanguage),

    /// The operation needs a signed-in user and there is none.
    #[error("no user is signed in")]
    NotSignedIn,
}

impl LegalIqError {
    /// The text a dialog should show for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.user_message(),
            Self::NotSignedIn => "Please log in to continue.",
            Self::Store(_) | Self::Language(_) => legaliq_auth::GENERIC_MESSAGE,
        }
    }
}
