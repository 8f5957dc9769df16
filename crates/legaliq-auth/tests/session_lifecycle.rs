//! Integration tests for the session lifecycle through the public API.
//!
//! Uses the deferred in-memory identity service so each test controls
//! exactly when the service's notifications are delivered.

use std::sync::Arc;

use legaliq_auth::{
    AuthError, FormOutcome, IdentityCall, InMemoryIdentity, ProviderError,
    SessionProvider, SessionState, SignUpForm,
};
use legaliq_types::User;

// =========================================================================
// Helpers
// =========================================================================

fn mounted() -> (Arc<InMemoryIdentity>, SessionProvider<InMemoryIdentity>) {
    let identity = Arc::new(InMemoryIdentity::deferred());
    let provider = SessionProvider::mount(Arc::clone(&identity));
    (identity, provider)
}

// =========================================================================
// Full lifecycle
// =========================================================================

#[tokio::test]
async fn test_full_lifecycle_sign_up_log_out_log_in() {
    let (identity, provider) = mounted();

    // 1. App starts: nothing may render yet.
    assert_eq!(provider.state(), SessionState::Uninitialized);

    // 2. The service reports "nobody signed in".
    identity.flush_notifications();
    assert_eq!(provider.state(), SessionState::Unauthenticated);

    // 3. Sign-up: the display name is visible immediately.
    let credential = provider
        .sign_up("asha@example.com", "secret123", "Asha")
        .await
        .unwrap();
    assert_eq!(
        provider.current_user().and_then(|u| u.display_name),
        Some("Asha".to_string())
    );

    // 4. The service's notification arrives and agrees.
    identity.flush_notifications();
    match provider.state() {
        SessionState::Authenticated(user) => {
            assert_eq!(user.uid, credential.user.uid);
            assert_eq!(user.display_name.as_deref(), Some("Asha"));
        }
        other => panic!("expected Authenticated, got {other:?}"),
    }

    // 5. Log out: local state holds until the notification.
    provider.log_out().await.unwrap();
    assert!(matches!(provider.state(), SessionState::Authenticated(_)));
    identity.flush_notifications();
    assert_eq!(provider.state(), SessionState::Unauthenticated);

    // 6. Log back in with the same credentials.
    provider.log_in("asha@example.com", "secret123").await.unwrap();
    identity.flush_notifications();
    assert_eq!(
        provider.state().user().map(|u| u.uid.clone()),
        Some(credential.user.uid)
    );
}

#[tokio::test]
async fn test_every_sign_up_code_maps_to_distinct_error() {
    let cases = [
        ("auth/email-already-in-use", AuthError::EmailAlreadyInUse),
        ("auth/invalid-email", AuthError::InvalidEmail),
        ("auth/weak-password", AuthError::WeakPassword),
    ];

    for (code, expected) in cases {
        let (identity, provider) = mounted();
        identity.fail_next(
            IdentityCall::CreateAccount,
            ProviderError::new(code, "injected"),
        );

        let result = provider.sign_up("a@example.com", "secret123", "A").await;

        assert_eq!(result, Err(expected));
    }
}

#[tokio::test]
async fn test_failed_log_out_keeps_user() {
    let (identity, provider) = mounted();
    identity.emit(Some(User::new("u1")));
    identity.flush_notifications();
    identity.fail_next(
        IdentityCall::SignOut,
        ProviderError::new("auth/network-request-failed", "offline"),
    );

    let result = provider.log_out().await;

    assert!(matches!(result, Err(AuthError::AuthFailure { .. })));
    identity.flush_notifications();
    assert_eq!(provider.current_user(), Some(User::new("u1")));
}

#[tokio::test]
async fn test_sign_up_form_drives_provider() {
    let (identity, provider) = mounted();
    identity.flush_notifications();
    let mut form = SignUpForm::filled("Ravi", "ravi@example.com", "hunter22");

    let outcome = form.submit(&provider).await;

    let FormOutcome::Completed(credential) = outcome else {
        panic!("sign-up should complete, error: {:?}", form.error());
    };
    assert_eq!(credential.user.display_name.as_deref(), Some("Ravi"));
    assert_eq!(provider.current_user().map(|u| u.uid), Some(credential.user.uid));
}

#[tokio::test]
async fn test_teardown_ignores_late_notifications() {
    let (identity, mut provider) = mounted();
    identity.flush_notifications();

    identity.emit(Some(User::new("u1")));
    provider.unmount();
    let delivered = identity.flush_notifications();

    assert_eq!(delivered, 0);
    assert_eq!(provider.current_user(), None);
}
