//! Error types for the auth layer.
//!
//! The identity service reports failures as string codes
//! ([`ProviderError`]). Each operation knows which codes it can explain to
//! a user; [`AuthError::classify`] maps those to dedicated variants and
//! everything else to [`AuthError::AuthFailure`].

use std::fmt;

use crate::ProviderError;

// Provider codes recognized by the classifier.
const EMAIL_ALREADY_IN_USE: &str = "auth/email-already-in-use";
const INVALID_EMAIL: &str = "auth/invalid-email";
const WEAK_PASSWORD: &str = "auth/weak-password";
const WRONG_PASSWORD: &str = "auth/wrong-password";
const USER_NOT_FOUND: &str = "auth/user-not-found";
const INVALID_CREDENTIAL: &str = "auth/invalid-credential";
const INVALID_LOGIN_CREDENTIALS: &str = "auth/invalid-login-credentials";
const POPUP_CLOSED_BY_USER: &str = "auth/popup-closed-by-user";
const CANCELLED_POPUP_REQUEST: &str = "auth/cancelled-popup-request";
const USER_CANCELLED: &str = "auth/user-cancelled";

/// Shown for every failure without a more specific message.
pub const GENERIC_MESSAGE: &str =
    "An unexpected error occurred. Please try again.";

/// The auth operation that produced an error.
///
/// Classification depends on the operation: `auth/invalid-email` during
/// sign-up means "fix your email", while during log-in it is folded into
/// "invalid credentials".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthOperation {
    SignUp,
    LogIn,
    LogOut,
    FederatedSignIn,
}

impl fmt::Display for AuthOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignUp => write!(f, "sign-up"),
            Self::LogIn => write!(f, "log-in"),
            Self::LogOut => write!(f, "log-out"),
            Self::FederatedSignIn => write!(f, "federated sign-in"),
        }
    }
}

/// Errors surfaced by the [`SessionProvider`](crate::SessionProvider).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Sign-up with an email that already has an account.
    #[error("email address is already in use")]
    EmailAlreadyInUse,

    /// The email address is malformed.
    #[error("invalid email address")]
    InvalidEmail,

    /// The identity service rejected the password as too weak.
    #[error("password is too weak")]
    WeakPassword,

    /// Log-in with an unknown account or the wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The user closed the federated sign-in popup. Not a real failure.
    #[error("sign-in popup was closed before completing")]
    PopupClosed,

    /// Any other provider failure, with the original code preserved.
    #[error("authentication failed ({code}): {message}")]
    AuthFailure { code: String, message: String },
}

impl AuthError {
    /// Maps a provider error for the given operation.
    pub fn classify(operation: AuthOperation, err: ProviderError) -> Self {
        let code = err.code.as_str();
        match operation {
            AuthOperation::SignUp => match code {
                EMAIL_ALREADY_IN_USE => return Self::EmailAlreadyInUse,
                INVALID_EMAIL => return Self::InvalidEmail,
                WEAK_PASSWORD => return Self::WeakPassword,
                _ => {}
            },
            AuthOperation::LogIn => match code {
                WRONG_PASSWORD
                | USER_NOT_FOUND
                | INVALID_CREDENTIAL
                | INVALID_LOGIN_CREDENTIALS
                | INVALID_EMAIL => return Self::InvalidCredentials,
                _ => {}
            },
            AuthOperation::FederatedSignIn => match code {
                POPUP_CLOSED_BY_USER
                | CANCELLED_POPUP_REQUEST
                | USER_CANCELLED => return Self::PopupClosed,
                _ => {}
            },
            AuthOperation::LogOut => {}
        }
        Self::AuthFailure {
            code: err.code,
            message: err.message,
        }
    }

    /// `true` when the user backed out on purpose.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::PopupClosed)
    }

    /// The message to show in a form.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmailAlreadyInUse => "This email address is already in use.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::WeakPassword => {
                "Password is too weak. Please choose a stronger one."
            }
            Self::InvalidCredentials => "Incorrect email or password.",
            Self::PopupClosed => "Sign-in was cancelled.",
            Self::AuthFailure { .. } => GENERIC_MESSAGE,
        }
    }

    /// The provider code for unclassified failures.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::AuthFailure { code, .. } => Some(code),
            _ => None,
        }
    }
}
