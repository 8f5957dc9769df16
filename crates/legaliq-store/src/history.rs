//! Analysis records and their chat history.
//!
//! Layout in the store:
//!
//! ```text
//! users/{uid}                         profile (email, displayName, lastSeenAt)
//! users/{uid}/analyses/{analysisId}   title, summary, createdAt, chatHistory[]
//! ```
//!
//! [`update_chat_history`] is best-effort: it never returns an error.
//! Everything else propagates store errors to the caller.

use legaliq_types::{ChatMessage, User};
use serde_json::Value;

use crate::{
    DocumentData, DocumentDatabase, DocumentStore, SetOptions, StoreError,
    array_union_of, server_timestamp,
};

pub const USERS: &str = "users";
pub const ANALYSES: &str = "analyses";
pub const CHAT_HISTORY: &str = "chatHistory";

/// What [`update_chat_history`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatHistoryUpdate {
    /// Arguments were empty; nothing was sent. A warning was logged.
    Skipped,

    /// The messages were appended.
    Appended,

    /// The store rejected the append. The error was logged and dropped.
    Failed,
}

/// The fields of a new analysis document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisDraft {
    pub title: String,
    pub summary: String,
}

/// Appends `new_messages` to the analysis' `chatHistory` with array-union.
///
/// Returns without touching the store if `user_id` or `analysis_id` is
/// empty or there are no messages. Store failures are logged and
/// swallowed; the caller is never told beyond the returned outcome.
pub async fn update_chat_history<D: DocumentDatabase>(
    store: &DocumentStore<D>,
    user_id: &str,
    analysis_id: &str,
    new_messages: &[ChatMessage],
) -> ChatHistoryUpdate {
    if user_id.is_empty() || analysis_id.is_empty() || new_messages.is_empty() {
        tracing::warn!(
            user_id,
            analysis_id,
            messages = new_messages.len(),
            "update chat history called with invalid arguments"
        );
        return ChatHistoryUpdate::Skipped;
    }

    let union = match array_union_of(new_messages) {
        Ok(union) => union,
        Err(e) => {
            tracing::error!(error = %e, "could not encode chat messages");
            return ChatHistoryUpdate::Failed;
        }
    };

    let analysis = store
        .collection(USERS)
        .doc(user_id)
        .collection(ANALYSES)
        .doc(analysis_id);

    match analysis
        .update(DocumentData::new().with(CHAT_HISTORY, union))
        .await
    {
        Ok(()) => {
            tracing::debug!(
                path = %analysis.path(),
                appended = new_messages.len(),
                "chat history updated"
            );
            ChatHistoryUpdate::Appended
        }
        Err(e) => {
            tracing::error!(
                path = %analysis.path(),
                error = %e,
                "error updating chat history"
            );
            ChatHistoryUpdate::Failed
        }
    }
}

/// Creates an analysis under the user with an empty chat history and
/// returns its generated id.
pub async fn create_analysis<D: DocumentDatabase>(
    store: &DocumentStore<D>,
    user_id: &str,
    draft: &AnalysisDraft,
) -> Result<String, StoreError> {
    let data = DocumentData::new()
        .with("title", draft.title.as_str())
        .with("summary", draft.summary.as_str())
        .with("createdAt", server_timestamp())
        .with(CHAT_HISTORY, Value::Array(Vec::new()));

    let added = store
        .collection(USERS)
        .doc(user_id)
        .collection(ANALYSES)
        .new_doc()
        .add(data)
        .await?;

    tracing::info!(user_id, analysis_id = added.id(), "analysis created");
    Ok(added.id().to_string())
}

/// Reads an analysis' chat history, oldest first.
///
/// # Errors
/// - [`StoreError::NotFound`] if the analysis doesn't exist
/// - [`StoreError::InvalidData`] if a stored entry isn't a message
pub async fn load_chat_history<D: DocumentDatabase>(
    store: &DocumentStore<D>,
    user_id: &str,
    analysis_id: &str,
) -> Result<Vec<ChatMessage>, StoreError> {
    let analysis = store
        .collection(USERS)
        .doc(user_id)
        .collection(ANALYSES)
        .doc(analysis_id);

    let snapshot = analysis.get().await?;
    if !snapshot.exists() {
        return Err(StoreError::NotFound(analysis.path().to_string()));
    }

    match snapshot.get(CHAT_HISTORY) {
        Some(history) => Ok(serde_json::from_value(history.clone())?),
        None => Ok(Vec::new()),
    }
}

/// Writes the user's profile fields, merging into any existing profile.
pub async fn save_user_profile<D: DocumentDatabase>(
    store: &DocumentStore<D>,
    user: &User,
) -> Result<(), StoreError> {
    let mut data = DocumentData::new().with("lastSeenAt", server_timestamp());
    if let Some(email) = &user.email {
        data.insert("email", email.as_str());
    }
    if let Some(name) = &user.display_name {
        data.insert("displayName", name.as_str());
    }

    store
        .collection(USERS)
        .doc(user.uid.as_str())
        .set(data, SetOptions::merge())
        .await
}
