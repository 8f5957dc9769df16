//! The seam between LegalIQ and the external identity service.
//!
//! LegalIQ doesn't implement accounts itself: a hosted identity service
//! (Firebase Auth in production) owns passwords, federated sign-in, and
//! the "who is signed in right now" state.
//!
//! Instead, this module defines the [`IdentityService`] trait: the exact
//! set of capabilities the session layer depends on. Production code wraps
//! the real SDK behind it; tests and local development use
//! [`InMemoryIdentity`](crate::InMemoryIdentity).
//!
//! # Notifications
//!
//! The identity service pushes session changes to registered listeners.
//! Registering returns a [`Subscription`]; dropping it (or calling
//! [`Subscription::unsubscribe`]) removes the listener so nothing is
//! delivered after teardown.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use legaliq_types::{User, UserCredential, UserId};

// ---------------------------------------------------------------------------
// ProviderError
// ---------------------------------------------------------------------------

/// An error exactly as the identity service reported it.
///
/// The `code` is a string tag like `"auth/email-already-in-use"`. The
/// session layer classifies it into an [`AuthError`](crate::AuthError);
/// nothing below that point interprets it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    /// Provider error code, e.g. `auth/weak-password`.
    pub code: String,

    /// Provider's human-readable explanation (not shown to users).
    pub message: String,
}

impl ProviderError {
    /// Creates a provider error from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Federated providers and profile updates
// ---------------------------------------------------------------------------

/// A federated identity provider usable with a popup flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FederatedProvider {
    Google,
}

impl FederatedProvider {
    /// The provider id string the identity service expects.
    pub fn provider_id(self) -> &'static str {
        match self {
            Self::Google => "google.com",
        }
    }
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_id())
    }
}

/// Fields to change on an account's profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
}

impl ProfileUpdate {
    /// An update that only sets the display name.
    pub fn display_name(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Listeners and subscriptions
// ---------------------------------------------------------------------------

/// Callback invoked with the current user (or `None`) on every session
/// change.
///
/// `Arc` rather than `Box` so an implementation can clone the listener out
/// of its registry and call it without holding a lock.
pub type AuthListener = Arc<dyn Fn(Option<User>) + Send + Sync + 'static>;

/// Handle for a registered [`AuthListener`].
///
/// Releasing happens exactly once: either through
/// [`unsubscribe`](Self::unsubscribe) or when the handle is dropped.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    /// Wraps the closure that removes the listener.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Removes the listener now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// IdentityService
// ---------------------------------------------------------------------------

/// Everything the session layer needs from an identity service.
///
/// # Trait bounds
///
/// - `Send + Sync` → the service is shared behind an `Arc` and may be
///   called from any Tokio worker.
/// - `'static` → it lives as long as the application.
///
/// The async methods return `impl Future + Send` so callers can spawn the
/// resulting futures.
pub trait IdentityService: Send + Sync + 'static {
    /// Creates a password account and signs it in.
    fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<UserCredential, ProviderError>> + Send;

    /// Changes profile fields on an existing account.
    ///
    /// This does NOT trigger an auth-state notification.
    fn update_profile(
        &self,
        uid: &UserId,
        update: ProfileUpdate,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Signs in with email and password.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<UserCredential, ProviderError>> + Send;

    /// Runs a federated popup flow.
    fn sign_in_with_popup(
        &self,
        provider: FederatedProvider,
    ) -> impl Future<Output = Result<UserCredential, ProviderError>> + Send;

    /// Signs the current account out.
    fn sign_out(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Registers a listener for session changes.
    ///
    /// The listener fires once with the current state after registration,
    /// then on every sign-in and sign-out.
    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription;

    /// The account signed in right now, read synchronously.
    fn current_user(&self) -> Option<User>;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_subscription_drop_releases_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);

        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(sub);

        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_unsubscribe_does_not_release_twice() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);

        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        // `unsubscribe` consumes the handle, and Drop runs right after.
        sub.unsubscribe();

        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new("auth/weak-password", "too short");
        assert_eq!(err.to_string(), "auth/weak-password: too short");
    }

    #[test]
    fn test_federated_provider_id() {
        assert_eq!(FederatedProvider::Google.provider_id(), "google.com");
        assert_eq!(FederatedProvider::Google.to_string(), "google.com");
    }
}
