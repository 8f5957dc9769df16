//! The `DocumentDatabase` trait: the call-based client the adapter wraps.
//!
//! A modern document-database client takes explicit addresses on every
//! call (`update_doc(path, data)`) instead of handing out chained
//! references. This trait is exactly that shape: four operations, each
//! given a fully resolved path. The chained surface in
//! [`DocumentStore`](crate::DocumentStore) is built on top of it.

use std::future::Future;

use crate::{
    DocumentData, DocumentPath, DocumentSnapshot, SetOptions, StoreError,
};

/// The operations the adapter delegates to.
///
/// Implementations own all I/O and all semantics: merge behavior,
/// array-union deduplication, server timestamps, id generation, and
/// not-found handling for `update_doc`.
pub trait DocumentDatabase: Send + Sync + 'static {
    /// Reads one document. A missing document is a snapshot with
    /// `exists() == false`, not an error.
    fn get_doc(
        &self,
        path: &DocumentPath,
    ) -> impl Future<Output = Result<DocumentSnapshot, StoreError>> + Send;

    /// Writes a whole document, or merges into it when `options.merge`.
    fn set_doc(
        &self,
        path: &DocumentPath,
        data: DocumentData,
        options: SetOptions,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Updates fields of an existing document.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the document doesn't exist.
    fn update_doc(
        &self,
        path: &DocumentPath,
        data: DocumentData,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Creates a document with a generated id in `collection` and returns
    /// its path.
    fn add_doc(
        &self,
        collection: &str,
        data: DocumentData,
    ) -> impl Future<Output = Result<DocumentPath, StoreError>> + Send;
}
