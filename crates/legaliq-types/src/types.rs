//! Core domain types for LegalIQ.
//!
//! Everything here is serializable with serde so it can be written to the
//! document store or handed to the UI layer as JSON. Field names use
//! camelCase on the wire because the stored documents are shared with the
//! web client.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The identity service's unique id for an account.
///
/// A newtype over `String` so a user id can't be confused with a document
/// id or an email address in function signatures.
///
/// `#[serde(transparent)]` serializes this as the bare string, so
/// `UserId("u1")` becomes `"u1"` in JSON.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a `UserId` from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty id.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A signed-in account as reported by the identity service.
///
/// Only `uid` is guaranteed. Federated accounts usually carry both an
/// email and a display name; password accounts have no display name until
/// the profile is updated after sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique, stable account id.
    pub uid: UserId,

    /// Account email, if the provider exposes one.
    pub email: Option<String>,

    /// Human-readable name shown in the header.
    pub display_name: Option<String>,
}

impl User {
    /// Creates a user with only an id.
    pub fn new(uid: impl Into<UserId>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    /// Sets the email (builder style).
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the display name (builder style).
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// The best label to show for this user: display name, then the
    /// local part of the email, then the raw uid.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|email| email.split('@').next())
                    .filter(|local| !local.is_empty())
            })
            .unwrap_or(self.uid.as_str())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// How an account signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignInMethod {
    /// Email and password.
    Password,

    /// Google popup sign-in.
    Google,
}

impl SignInMethod {
    /// The provider id string the identity service uses for this method.
    pub fn provider_id(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Google => "google.com",
        }
    }
}

/// The result of a successful sign-up or sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredential {
    /// The account that is now signed in.
    pub user: User,

    /// Which method produced this credential.
    pub method: SignInMethod,

    /// `true` when the operation created the account.
    pub is_new_user: bool,
}

// ---------------------------------------------------------------------------
// Chat records
// ---------------------------------------------------------------------------

/// Who wrote a chat message.
///
/// Serialized lowercase (`"user"`, `"model"`) to match the stored
/// `chatHistory` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The signed-in person.
    User,

    /// The legal assistant backend.
    Model,
}

/// One entry in an analysis document's chat history.
///
/// The core treats the content as opaque; it only appends records and
/// reads them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a message with an explicit timestamp.
    pub fn new(
        role: Role,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// A message from the user, stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, Utc::now())
    }

    /// A message from the assistant, stamped now.
    pub fn model(content: impl Into<String>) -> Self {
        Self::new(Role::Model, content, Utc::now())
    }
}

// =========================================================================
// Tests
// =========================================================================
