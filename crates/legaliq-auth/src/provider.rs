//! The session provider: the app-wide owner of authentication state.
//!
//! This is the central piece of the auth layer. It's responsible for:
//! - Subscribing once to the identity service's change notifications
//! - Publishing the current [`Session`] to everything that reads it
//! - Running sign-up, log-in, log-out, and federated sign-in
//! - Releasing the subscription when the app shuts down
//!
//! # Concurrency note
//!
//! The session lives in a `tokio::sync::watch` channel. Only two places
//! write to it: the notification listener and the refresh at the end of
//! [`SessionProvider::sign_up`]. Readers either take a snapshot
//! ([`session`](SessionProvider::session)) or hold a receiver
//! ([`watch`](SessionProvider::watch)) and await changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use legaliq_types::{User, UserCredential};
use tokio::sync::watch;

use crate::{
    AuthError, AuthListener, AuthOperation, FederatedProvider,
    IdentityService, ProfileUpdate, ProviderError, Session, SessionState,
    Subscription,
};

/// Owns the application's [`Session`] and the auth operations.
///
/// Construct one with [`mount`](Self::mount) at startup and pass it down
/// by reference. There is no global instance.
///
/// ## Lifecycle
///
/// ```text
/// mount() ──→ [Uninitialized] ──(first notification)──→ [Authenticated]
///                                                     or [Unauthenticated]
///                    ... notifications keep replacing `user` ...
/// unmount() / drop ──→ subscription released, no further updates
/// ```
pub struct SessionProvider<I: IdentityService> {
    /// The external identity service, shared with whoever built it.
    identity: Arc<I>,

    /// Publishes the current session. Wrapped in `Arc` because the
    /// notification listener needs its own handle to write through.
    session: Arc<watch::Sender<Session>>,

    /// The listener registration. `None` after [`unmount`](Self::unmount).
    subscription: Option<Subscription>,

    /// Cleared by [`unmount`](Self::unmount). The listener checks it
    /// before every write, so a delivery already in flight at teardown
    /// is dropped.
    mounted: Arc<AtomicBool>,
}

impl<I: IdentityService> SessionProvider<I> {
    /// Creates the provider and subscribes to the identity service.
    ///
    /// The subscription is registered exactly once, here. Each
    /// notification replaces `user`; the first one also clears
    /// `is_loading`.
    pub fn mount(identity: Arc<I>) -> Self {
        let (tx, _rx) = watch::channel(Session::loading());
        let session = Arc::new(tx);

        let mounted = Arc::new(AtomicBool::new(true));

        let publisher: Weak<watch::Sender<Session>> = Arc::downgrade(&session);
        let live = Arc::clone(&mounted);
        let listener: AuthListener = Arc::new(move |user: Option<User>| {
            if !live.load(Ordering::Acquire) {
                tracing::debug!("notification after unmount ignored");
                return;
            }
            let Some(publisher) = publisher.upgrade() else {
                return;
            };
            publisher.send_modify(|current| {
                if current.is_loading {
                    tracing::info!(
                        signed_in = user.is_some(),
                        "initial auth state received"
                    );
                }
                match &user {
                    Some(user) => {
                        tracing::debug!(uid = %user.uid, "auth state changed")
                    }
                    None => tracing::debug!("auth state changed: signed out"),
                }
                current.user = user;
                current.is_loading = false;
            });
        });

        let subscription = identity.on_auth_state_changed(listener);
        tracing::debug!("session provider mounted");

        Self {
            identity,
            session,
            subscription: Some(subscription),
            mounted,
        }
    }

    /// Releases the identity subscription.
    ///
    /// After this returns, no notification reaches this provider. The last
    /// published session stays readable. Calling it twice is a no-op.
    pub fn unmount(&mut self) {
        self.mounted.store(false, Ordering::Release);
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            tracing::debug!("session provider unmounted");
        }
    }

    /// `true` until [`unmount`](Self::unmount) is called.
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    // -- Reading the session ----------------------------------------------

    /// A snapshot of the current session.
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.session.borrow().user.clone()
    }

    /// `true` until the first notification arrives.
    pub fn is_loading(&self) -> bool {
        self.session.borrow().is_loading
    }

    /// The state-machine view of the current session.
    pub fn state(&self) -> SessionState {
        self.session.borrow().state()
    }

    /// A receiver that observes every session change.
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Waits until the identity service has reported once, then returns
    /// the session at that moment.
    pub async fn ready(&self) -> Session {
        let mut rx = self.session.subscribe();
        match rx.wait_for(Session::is_ready).await {
            Ok(session) => session.clone(),
            // The sender lives in `self`, so the channel can't be closed
            // while we're borrowed. Fall back to a snapshot anyway.
            Err(_) => self.session(),
        }
    }

    /// The identity service this provider wraps.
    pub fn identity(&self) -> &Arc<I> {
        &self.identity
    }

    // -- Auth operations --------------------------------------------------

    /// Creates an account and sets its display name.
    ///
    /// Two sequential calls to the identity service. If the profile update
    /// fails, the account already exists and stays signed in; the error is
    /// still returned. There is no rollback.
    ///
    /// On success the local session is refreshed from the identity
    /// service's current-user snapshot immediately, so the new display
    /// name is visible before any notification arrives.
    ///
    /// # Errors
    /// - [`AuthError::EmailAlreadyInUse`], [`AuthError::InvalidEmail`],
    ///   [`AuthError::WeakPassword`]
    /// - [`AuthError::AuthFailure`] for any other provider code
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserCredential, AuthError> {
        let mut credential = self
            .identity
            .create_account(email, password)
            .await
            .map_err(|e| classify(AuthOperation::SignUp, e))?;

        tracing::info!(uid = %credential.user.uid, "account created");

        self.identity
            .update_profile(
                &credential.user.uid,
                ProfileUpdate::display_name(display_name),
            )
            .await
            .map_err(|e| {
                tracing::warn!(
                    uid = %credential.user.uid,
                    "account created but display name update failed"
                );
                classify(AuthOperation::SignUp, e)
            })?;

        credential.user.display_name = Some(display_name.to_string());

        // The profile update doesn't fire a notification, so pull the
        // fresh account in now. `is_loading` is left alone.
        let refreshed = self.identity.current_user();
        self.session.send_modify(|current| current.user = refreshed);

        Ok(credential)
    }

    /// Signs in with email and password.
    ///
    /// The session updates when the identity service's notification
    /// arrives, not here.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`] or [`AuthError::AuthFailure`].
    pub async fn log_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, AuthError> {
        let credential = self
            .identity
            .sign_in(email, password)
            .await
            .map_err(|e| classify(AuthOperation::LogIn, e))?;
        tracing::info!(uid = %credential.user.uid, "logged in");
        Ok(credential)
    }

    /// Signs out.
    ///
    /// Never clears `user` itself: it becomes `None` only when the
    /// identity service's notification says so.
    pub async fn log_out(&self) -> Result<(), AuthError> {
        self.identity
            .sign_out()
            .await
            .map_err(|e| classify(AuthOperation::LogOut, e))?;
        tracing::info!("sign-out requested");
        Ok(())
    }

    /// Runs the Google popup flow.
    ///
    /// # Errors
    /// [`AuthError::PopupClosed`] when the user dismisses the popup, or
    /// [`AuthError::AuthFailure`].
    pub async fn sign_in_with_google(&self) -> Result<UserCredential, AuthError> {
        self.sign_in_with(FederatedProvider::Google).await
    }

    /// Runs a popup flow for any federated provider.
    pub async fn sign_in_with(
        &self,
        provider: FederatedProvider,
    ) -> Result<UserCredential, AuthError> {
        let credential = self
            .identity
            .sign_in_with_popup(provider)
            .await
            .map_err(|e| classify(AuthOperation::FederatedSignIn, e))?;
        tracing::info!(
            uid = %credential.user.uid,
            %provider,
            is_new_user = credential.is_new_user,
            "federated sign-in completed"
        );
        Ok(credential)
    }
}

/// Classifies a provider error and logs it.
fn classify(operation: AuthOperation, err: ProviderError) -> AuthError {
    let classified = AuthError::classify(operation, err);
    if classified.is_cancellation() {
        tracing::debug!(%operation, "cancelled by user");
    } else {
        tracing::warn!(%operation, error = %classified, "auth operation failed");
    }
    classified
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionProvider` against the in-memory identity
    //! service.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //!
    //! Most tests use a *deferred* identity service: notifications queue
    //! up until the test calls `flush_notifications()`. That lets us
    //! assert what the provider does BEFORE the service reports back.

    use super::*;
    use crate::{IdentityCall, InMemoryIdentity};

    // -- Helpers ----------------------------------------------------------

    fn deferred() -> Arc<InMemoryIdentity> {
        Arc::new(InMemoryIdentity::deferred())
    }

    fn immediate() -> Arc<InMemoryIdentity> {
        Arc::new(InMemoryIdentity::new())
    }

    // =====================================================================
    // mount()
    // =====================================================================

    #[test]
    fn test_mount_starts_loading() {
        let identity = deferred();
        let provider = SessionProvider::mount(Arc::clone(&identity));

        assert!(provider.is_loading());
        assert_eq!(provider.state(), SessionState::Uninitialized);
        assert!(provider.is_mounted());
    }

    #[test]
    fn test_mount_subscribes_exactly_once() {
        let identity = deferred();
        let _provider = SessionProvider::mount(Arc::clone(&identity));

        assert_eq!(identity.listener_count(), 1);
    }

    #[test]
    fn test_first_notification_clears_loading() {
        let identity = deferred();
        let provider = SessionProvider::mount(Arc::clone(&identity));

        identity.flush_notifications();

        assert!(!provider.is_loading());
        assert_eq!(provider.state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_notification_replaces_user() {
        let identity = immediate();
        let provider = SessionProvider::mount(Arc::clone(&identity));

        identity.emit(Some(User::new("u1")));
        assert_eq!(provider.current_user(), Some(User::new("u1")));

        identity.emit(Some(User::new("u2")));
        assert_eq!(provider.current_user(), Some(User::new("u2")));

        identity.emit(None);
        assert_eq!(provider.current_user(), None);
    }

    // =====================================================================
    // unmount()
    // =====================================================================

    #[test]
    fn test_unmount_releases_subscription() {
        let identity = immediate();
        let mut provider = SessionProvider::mount(Arc::clone(&identity));

        provider.unmount();

        assert_eq!(identity.listener_count(), 0);
        assert!(!provider.is_mounted());
    }

    #[test]
    fn test_unmount_stops_delivery() {
        let identity = immediate();
        let mut provider = SessionProvider::mount(Arc::clone(&identity));
        provider.unmount();

        identity.emit(Some(User::new("late")));

        assert_eq!(provider.current_user(), None);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let identity = immediate();
        let provider = SessionProvider::mount(Arc::clone(&identity));

        drop(provider);

        assert_eq!(identity.listener_count(), 0);
    }

    #[test]
    fn test_unmount_twice_is_noop() {
        let identity = immediate();
        let mut provider = SessionProvider::mount(Arc::clone(&identity));
        provider.unmount();
        provider.unmount();
        assert!(!provider.is_mounted());
    }

    #[test]
    fn test_unmount_during_delivery_drops_in_flight_notification() {
        use std::sync::Mutex;

        let identity = immediate();
        let slot: Arc<Mutex<Option<SessionProvider<InMemoryIdentity>>>> =
            Arc::default();

        // Registered ahead of the provider, so it runs first in each
        // delivery and tears the provider down mid-dispatch.
        let teardown = Arc::clone(&slot);
        let _earlier = identity.on_auth_state_changed(Arc::new(
            move |user: Option<User>| {
                if user.is_some() {
                    if let Some(provider) = teardown.lock().unwrap().as_mut() {
                        provider.unmount();
                    }
                }
            },
        ));
        let provider = SessionProvider::mount(Arc::clone(&identity));
        *slot.lock().unwrap() = Some(provider);

        identity.emit(Some(User::new("late")));

        let guard = slot.lock().unwrap();
        let provider = guard.as_ref().unwrap();
        assert!(!provider.is_mounted());
        assert_eq!(provider.current_user(), None);
        assert!(!provider.is_loading());
    }

    // =====================================================================
    // sign_up()
    // =====================================================================

    #[tokio::test]
    async fn test_sign_up_refreshes_display_name_before_notification() {
        let identity = deferred();
        let provider = SessionProvider::mount(Arc::clone(&identity));

        let credential = provider
            .sign_up("asha@example.com", "secret123", "Asha")
            .await
            .expect("sign-up should succeed");

        // No notification has been delivered yet...
        assert!(identity.pending_notifications() > 0);
        // ...but the local user already carries the new name.
        let user = provider.current_user().expect("user should be set");
        assert_eq!(user.display_name.as_deref(), Some("Asha"));
        assert_eq!(user.uid, credential.user.uid);
        assert_eq!(credential.user.display_name.as_deref(), Some("Asha"));
        assert!(credential.is_new_user);
    }

    #[tokio::test]
    async fn test_sign_up_refresh_keeps_loading_flag() {
        let identity = deferred();
        let provider = SessionProvider::mount(Arc::clone(&identity));

        provider
            .sign_up("asha@example.com", "secret123", "Asha")
            .await
            .unwrap();

        // Only a notification may clear `is_loading`.
        assert!(provider.is_loading());
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email_returns_email_in_use() {
        let identity = immediate();
        identity.register("asha@example.com", "secret123", None);
        let provider = SessionProvider::mount(Arc::clone(&identity));

        let result = provider
            .sign_up("asha@example.com", "another1", "Asha")
            .await;

        assert_eq!(result, Err(AuthError::EmailAlreadyInUse));
    }

    #[tokio::test]
    async fn test_sign_up_profile_failure_keeps_account() {
        let identity = immediate();
        identity.fail_next(
            IdentityCall::UpdateProfile,
            ProviderError::new("auth/network-request-failed", "offline"),
        );
        let provider = SessionProvider::mount(Arc::clone(&identity));

        let result = provider
            .sign_up("asha@example.com", "secret123", "Asha")
            .await;

        assert!(matches!(result, Err(AuthError::AuthFailure { .. })));
        // The account was created and is signed in, without a name.
        let user = identity.current_user().expect("account should exist");
        assert_eq!(user.email.as_deref(), Some("asha@example.com"));
        assert_eq!(user.display_name, None);
        assert!(identity.has_account("asha@example.com"));
    }

    // =====================================================================
    // log_in() / log_out()
    // =====================================================================

    #[tokio::test]
    async fn test_log_in_wrong_password_returns_invalid_credentials() {
        let identity = immediate();
        identity.register("asha@example.com", "secret123", None);
        let provider = SessionProvider::mount(Arc::clone(&identity));

        let result = provider.log_in("asha@example.com", "nope").await;

        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_log_in_updates_session_via_notification() {
        let identity = deferred();
        let registered =
            identity.register("asha@example.com", "secret123", Some("Asha"));
        let provider = SessionProvider::mount(Arc::clone(&identity));
        identity.flush_notifications();

        provider.log_in("asha@example.com", "secret123").await.unwrap();
        assert_eq!(provider.current_user(), None, "no optimistic update");

        identity.flush_notifications();
        assert_eq!(provider.current_user(), Some(registered));
    }

    #[tokio::test]
    async fn test_log_out_waits_for_notification() {
        let identity = deferred();
        identity.register("asha@example.com", "secret123", None);
        let provider = SessionProvider::mount(Arc::clone(&identity));
        provider.log_in("asha@example.com", "secret123").await.unwrap();
        identity.flush_notifications();
        assert!(provider.current_user().is_some());

        provider.log_out().await.expect("log-out should succeed");

        // Still signed in locally until the service says otherwise.
        assert!(provider.current_user().is_some());

        identity.flush_notifications();
        assert_eq!(provider.current_user(), None);
        assert_eq!(provider.state(), SessionState::Unauthenticated);
    }

    // =====================================================================
    // sign_in_with_google()
    // =====================================================================

    #[tokio::test]
    async fn test_google_popup_closed_returns_popup_closed() {
        let identity = immediate();
        let provider = SessionProvider::mount(Arc::clone(&identity));

        let result = provider.sign_in_with_google().await;

        assert_eq!(result, Err(AuthError::PopupClosed));
    }

    #[tokio::test]
    async fn test_google_popup_completes() {
        let identity = immediate();
        let google_user = User::new("g-1")
            .with_email("asha@gmail.com")
            .with_display_name("Asha G");
        identity.complete_popup_as(google_user.clone());
        let provider = SessionProvider::mount(Arc::clone(&identity));

        let credential = provider.sign_in_with_google().await.unwrap();

        assert_eq!(credential.user, google_user);
        assert_eq!(provider.current_user(), Some(google_user));
    }

    // =====================================================================
    // ready() / watch()
    // =====================================================================

    #[tokio::test]
    async fn test_ready_resolves_after_first_notification() {
        let identity = deferred();
        let provider = SessionProvider::mount(Arc::clone(&identity));

        let notifier = Arc::clone(&identity);
        let flusher = tokio::spawn(async move {
            tokio::task::yield_now().await;
            notifier.flush_notifications();
        });

        let session = provider.ready().await;
        flusher.await.unwrap();

        assert!(session.is_ready());
    }

    #[tokio::test]
    async fn test_watch_observes_changes() {
        let identity = immediate();
        let provider = SessionProvider::mount(Arc::clone(&identity));
        let mut rx = provider.watch();
        rx.borrow_and_update();

        identity.emit(Some(User::new("u1")));

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow().user, Some(User::new("u1")));
    }
}
