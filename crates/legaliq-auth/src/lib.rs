//! Authentication session lifecycle for LegalIQ.
//!
//! This crate owns "who is signed in":
//!
//! 1. **Identity seam**: the [`IdentityService`] trait describes what the
//!    external identity service must provide
//! 2. **Session state**: [`Session`] / [`SessionState`], published by the
//!    [`SessionProvider`] and kept in sync with the service's notifications
//! 3. **Auth operations**: sign-up, log-in, log-out, federated sign-in,
//!    with provider codes classified into [`AuthError`]
//! 4. **Forms**: [`SignUpForm`] and [`LogInForm`] turn failures into the
//!    messages a dialog shows
//!
//! # How it fits in the stack
//!
//! ```text
//! App context (above)  ← owns one SessionProvider for its lifetime
//!     ↕
//! Auth layer (this crate)  ← session state + auth operations
//!     ↕
//! Identity service (below)  ← hosted accounts, or InMemoryIdentity
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod form;
mod identity;
mod memory;
mod provider;
mod session;

pub use error::{AuthError, AuthOperation, GENERIC_MESSAGE};
pub use form::{FormOutcome, LogInForm, MIN_PASSWORD_LEN, SignUpForm};
pub use identity::{
    AuthListener, FederatedProvider, IdentityService, ProfileUpdate,
    ProviderError, Subscription,
};
pub use memory::{IdentityCall, InMemoryIdentity, PopupOutcome};
pub use provider::SessionProvider;
pub use session::{Session, SessionState};
