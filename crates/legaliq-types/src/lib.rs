//! Shared domain types for LegalIQ.
//!
//! This crate defines the values that travel between the layers of the
//! client core:
//!
//! - **Identity** ([`UserId`], [`User`], [`UserCredential`],
//!   [`SignInMethod`]): who is signed in and how they got there.
//! - **Chat records** ([`ChatMessage`], [`Role`]): the entries appended
//!   to an analysis document's chat history.
//!
//! # Architecture
//!
//! The types crate sits below both the auth layer and the store layer.
//! It knows nothing about identity services or databases: it only
//! defines data and how that data is serialized.
//!
//! ```text
//! Auth (sessions) ─┐
//!                  ├─→ Types (User, ChatMessage)
//! Store (records) ─┘
//! ```

mod types;

pub use types::{ChatMessage, Role, SignInMethod, User, UserCredential, UserId};
