//! Session types: what the application knows about who is signed in.
//!
//! A [`Session`] is the value the provider publishes to the rest of the
//! app. It tracks:
//! - WHO is signed in (`user`, or `None`)
//! - WHETHER the identity service has reported yet (`is_loading`)
//!
//! [`SessionState`] is the same information viewed as a state machine.

use legaliq_types::User;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Authentication state visible to the application.
///
/// Starts as `user: None, is_loading: true`. The first identity
/// notification clears `is_loading`; every notification replaces `user`.
///
/// While `is_loading` is true, UI that depends on the session must not
/// render, or a signed-in user would briefly see the signed-out view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The signed-in account, if any.
    pub user: Option<User>,

    /// `true` until the identity service reports for the first time.
    pub is_loading: bool,
}

impl Session {
    /// The state at application start.
    pub fn loading() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    /// `true` once dependent UI may render.
    pub fn is_ready(&self) -> bool {
        !self.is_loading
    }

    /// `true` when an account is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The state-machine view of this session.
    pub fn state(&self) -> SessionState {
        match (&self.user, self.is_loading) {
            (_, true) => SessionState::Uninitialized,
            (Some(user), false) => SessionState::Authenticated(user.clone()),
            (None, false) => SessionState::Unauthenticated,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle of the application's session.
///
/// ```text
///                  ┌──(notify user)──→ Authenticated ─┐
///   Uninitialized ─┤                        ↑   │     │
///                  └──(notify None)──→ Unauthenticated ←┘
/// ```
///
/// - **Uninitialized**: waiting for the identity service's first
///   notification. Nothing session-dependent renders.
/// - **Authenticated**: a user is signed in.
/// - **Unauthenticated**: the service reported that nobody is signed in.
///
/// There is no terminal state; the session lives as long as the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Authenticated(User),
    Unauthenticated,
}

impl SessionState {
    /// Returns the user for `Authenticated`, `None` otherwise.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}
