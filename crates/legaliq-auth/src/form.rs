//! Form controllers for the sign-up and log-in dialogs.
//!
//! The forms own the field values and the one error line a dialog shows.
//! They apply the checks the UI is responsible for (password length) and
//! turn [`AuthError`](crate::AuthError)s into user-facing text. Rendering is not their job.

use legaliq_types::UserCredential;

use crate::{IdentityService, SessionProvider};

/// Shortest password the sign-up form accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long.";
const GOOGLE_SIGN_UP_FAILED: &str =
    "Could not sign up with Google. Please try again.";
const GOOGLE_LOG_IN_FAILED: &str =
    "Could not sign in with Google. Please try again.";

/// What a submit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The operation succeeded; the dialog can close.
    Completed(UserCredential),

    /// The form rejected the input or the operation failed. The message
    /// is in [`error`](SignUpForm::error).
    Rejected,

    /// The user dismissed the federated popup. No error is shown.
    Cancelled,
}

impl FormOutcome {
    /// `true` when the dialog should close.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

// ---------------------------------------------------------------------------
// SignUpForm
// ---------------------------------------------------------------------------

/// State behind the "Create an Account" dialog.
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    error: Option<String>,
}

impl SignUpForm {
    /// An empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// A form with all fields filled in.
    pub fn filled(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            error: None,
        }
    }

    /// The message currently shown, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submits the email/password sign-up.
    ///
    /// Rejects passwords shorter than [`MIN_PASSWORD_LEN`] without calling
    /// the identity service.
    pub async fn submit<I: IdentityService>(
        &mut self,
        provider: &SessionProvider<I>,
    ) -> FormOutcome {
        self.error = None;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            self.error = Some(PASSWORD_TOO_SHORT.to_string());
            return FormOutcome::Rejected;
        }

        match provider
            .sign_up(&self.email, &self.password, &self.name)
            .await
        {
            Ok(credential) => FormOutcome::Completed(credential),
            Err(err) => {
                tracing::error!(error = %err, "sign up failed");
                self.error = Some(err.user_message().to_string());
                FormOutcome::Rejected
            }
        }
    }

    /// Signs up through the Google popup.
    pub async fn submit_google<I: IdentityService>(
        &mut self,
        provider: &SessionProvider<I>,
    ) -> FormOutcome {
        self.error = None;
        federated(provider, &mut self.error, GOOGLE_SIGN_UP_FAILED).await
    }
}

// ---------------------------------------------------------------------------
// LogInForm
// ---------------------------------------------------------------------------

/// State behind the "Log in" dialog.
#[derive(Debug, Clone, Default)]
pub struct LogInForm {
    pub email: String,
    pub password: String,
    error: Option<String>,
}

impl LogInForm {
    /// A form with both fields filled in.
    pub fn filled(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            error: None,
        }
    }

    /// The message currently shown, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submits the email/password log-in.
    pub async fn submit<I: IdentityService>(
        &mut self,
        provider: &SessionProvider<I>,
    ) -> FormOutcome {
        self.error = None;
        match provider.log_in(&self.email, &self.password).await {
            Ok(credential) => FormOutcome::Completed(credential),
            Err(err) => {
                tracing::error!(error = %err, "log in failed");
                self.error = Some(err.user_message().to_string());
                FormOutcome::Rejected
            }
        }
    }

    /// Logs in through the Google popup.
    pub async fn submit_google<I: IdentityService>(
        &mut self,
        provider: &SessionProvider<I>,
    ) -> FormOutcome {
        self.error = None;
        federated(provider, &mut self.error, GOOGLE_LOG_IN_FAILED).await
    }
}

/// Shared Google flow for both forms. A closed popup is not an error.
async fn federated<I: IdentityService>(
    provider: &SessionProvider<I>,
    error: &mut Option<String>,
    failure_message: &str,
) -> FormOutcome {
    match provider.sign_in_with_google().await {
        Ok(credential) => FormOutcome::Completed(credential),
        Err(err) if err.is_cancellation() => FormOutcome::Cancelled,
        Err(err) => {
            tracing::error!(error = %err, "google sign-in failed");
            *error = Some(failure_message.to_string());
            FormOutcome::Rejected
        }
    }
}
