//! Error types for the store layer.

/// Errors reported by a [`DocumentDatabase`](crate::DocumentDatabase).
///
/// The adapter never creates these itself; it passes the database's
/// errors through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// `update` on a document that doesn't exist, or a read that needed
    /// the document to exist.
    #[error("no document at {0}")]
    NotFound(String),

    /// Any other database failure: permissions, network, quota.
    #[error("store request failed ({code}): {message}")]
    Failure { code: String, message: String },

    /// Data that couldn't be converted to or from a stored document.
    #[error("invalid document data: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Shorthand for [`StoreError::Failure`].
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidData(err.to_string())
    }
}
