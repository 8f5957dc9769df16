//! Document-store adapter for LegalIQ.
//!
//! Application code addresses documents with chained calls
//! (`collection → doc → collection → doc → update`). The database client
//! underneath takes explicit paths. This crate sits in between.
//!
//! # Key types
//!
//! - [`DocumentDatabase`]: the call-based client the adapter delegates to
//! - [`DocumentStore`]: entry point of the chained API
//! - [`CollectionRef`] / [`DocumentRef`] / [`NewDocumentRef`]: path-bound
//!   references, resolved on every call
//! - [`FieldValue`]: literal values plus the [`server_timestamp`] and
//!   [`array_union`] sentinels
//! - [`InMemoryDatabase`]: an in-process database that records calls
//!
//! Chat-history persistence for analyses lives in [`update_chat_history`]
//! and friends.

#![allow(async_fn_in_trait)]

mod adapter;
mod database;
mod error;
mod history;
mod memory;
mod path;
mod value;

pub use adapter::{
    AddedDocument, CollectionRef, DocumentRef, DocumentStore, NewDocumentRef,
};
pub use database::DocumentDatabase;
pub use error::StoreError;
pub use history::{
    ANALYSES, AnalysisDraft, CHAT_HISTORY, ChatHistoryUpdate, USERS,
    create_analysis, load_chat_history, save_user_profile,
    update_chat_history,
};
pub use memory::{InMemoryDatabase, StoreCall, StoreOp};
pub use path::DocumentPath;
pub use value::{
    DocumentData, DocumentSnapshot, FieldValue, SetOptions, array_union,
    array_union_of, server_timestamp,
};
