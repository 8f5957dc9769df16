//! The chained document-store adapter.
//!
//! Application code was written against a chained API:
//!
//! ```text
//! store.collection("users").doc(uid).collection("analyses").doc(id).update(..)
//! ```
//!
//! The database client underneath takes explicit paths instead. The types
//! here bridge the two: every step of the chain just builds a longer path
//! string, and only the terminal call (`get`, `set`, `update`, `add`)
//! reaches the [`DocumentDatabase`].
//!
//! References borrow the database (`'a`) and own their path. They are
//! cheap to create and hold no other state.

use std::sync::Arc;

use crate::{
    DocumentData, DocumentDatabase, DocumentPath, DocumentSnapshot, SetOptions, StoreError,
};

// ---------------------------------------------------------------------------
// DocumentStore
// ---------------------------------------------------------------------------

/// Entry point of the chained API.
///
/// Cloning is cheap: the database is shared through an `Arc`.
pub struct DocumentStore<D> {
    db: Arc<D>,
}

impl<D> Clone for DocumentStore<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<D: DocumentDatabase> DocumentStore<D> {
    /// Wraps a database client.
    pub fn new(db: D) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Wraps a database client that is already shared.
    pub fn from_arc(db: Arc<D>) -> Self {
        Self { db }
    }

    /// The underlying client.
    pub fn database(&self) -> &D {
        &self.db
    }

    /// A reference to the collection at `path`. No I/O.
    pub fn collection(&self, path: impl Into<String>) -> CollectionRef<'_, D> {
        CollectionRef {
            db: &self.db,
            path: path.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// CollectionRef
// ---------------------------------------------------------------------------

/// A collection path waiting for a terminal call.
pub struct CollectionRef<'a, D> {
    db: &'a D,
    path: String,
}

impl<'a, D: DocumentDatabase> CollectionRef<'a, D> {
    /// The collection path, e.g. `users/u1/analyses`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// A reference to the document `id` in this collection. No I/O.
    pub fn doc(&self, id: impl Into<String>) -> DocumentRef<'a, D> {
        DocumentRef {
            db: self.db,
            path: DocumentPath::new(self.path.clone(), id),
        }
    }

    /// A reference to a document whose id the database will generate.
    /// It only supports [`add`](NewDocumentRef::add).
    pub fn new_doc(&self) -> NewDocumentRef<'a, D> {
        NewDocumentRef {
            db: self.db,
            collection: self.path.clone(),
        }
    }

    /// Creates a document with a generated id.
    pub async fn add(
        &self,
        data: DocumentData,
    ) -> Result<AddedDocument<'a, D>, StoreError> {
        add_to(self.db, &self.path, data).await
    }
}

// ---------------------------------------------------------------------------
// DocumentRef
// ---------------------------------------------------------------------------

/// A specific document.
pub struct DocumentRef<'a, D> {
    db: &'a D,
    path: DocumentPath,
}

impl<'a, D: DocumentDatabase> DocumentRef<'a, D> {
    /// The document id.
    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// The full document path.
    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    /// A sub-collection under this document: `path/id/sub`. No I/O.
    pub fn collection(&self, sub: &str) -> CollectionRef<'a, D> {
        CollectionRef {
            db: self.db,
            path: self.path.child(sub),
        }
    }

    /// Reads the document. Check [`DocumentSnapshot::exists`].
    pub async fn get(&self) -> Result<DocumentSnapshot, StoreError> {
        tracing::trace!(path = %self.path, "get");
        self.db.get_doc(&self.path).await
    }

    /// Overwrites the document, or merges into it if `options.merge`.
    pub async fn set(
        &self,
        data: DocumentData,
        options: SetOptions,
    ) -> Result<(), StoreError> {
        tracing::trace!(path = %self.path, merge = options.merge, "set");
        self.db.set_doc(&self.path, data, options).await
    }

    /// Updates fields. Fails if the document doesn't exist.
    pub async fn update(&self, data: DocumentData) -> Result<(), StoreError> {
        tracing::trace!(path = %self.path, fields = data.len(), "update");
        self.db.update_doc(&self.path, data).await
    }
}

// ---------------------------------------------------------------------------
// NewDocumentRef / AddedDocument
// ---------------------------------------------------------------------------

/// A document-to-be in a collection, created by
/// [`CollectionRef::new_doc`].
pub struct NewDocumentRef<'a, D> {
    db: &'a D,
    collection: String,
}

impl<'a, D: DocumentDatabase> NewDocumentRef<'a, D> {
    /// Creates the document with a generated id.
    pub async fn add(
        &self,
        data: DocumentData,
    ) -> Result<AddedDocument<'a, D>, StoreError> {
        add_to(self.db, &self.collection, data).await
    }
}

/// A document that `add` just created.
///
/// Carries the generated id so sub-collections can be addressed without
/// another read.
pub struct AddedDocument<'a, D> {
    db: &'a D,
    path: DocumentPath,
}

impl<'a, D: DocumentDatabase> AddedDocument<'a, D> {
    /// The generated id.
    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// The full path of the new document.
    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    /// A sub-collection under the new document. No I/O.
    pub fn collection(&self, sub: &str) -> CollectionRef<'a, D> {
        CollectionRef {
            db: self.db,
            path: self.path.child(sub),
        }
    }

    /// A regular reference to the new document.
    pub fn doc_ref(&self) -> DocumentRef<'a, D> {
        DocumentRef {
            db: self.db,
            path: self.path.clone(),
        }
    }
}

async fn add_to<'a, D: DocumentDatabase>(
    db: &'a D,
    collection: &str,
    data: DocumentData,
) -> Result<AddedDocument<'a, D>, StoreError> {
    tracing::trace!(collection, "add");
    let path = db.add_doc(collection, data).await?;
    tracing::debug!(%path, "document added");
    Ok(AddedDocument { db, path })
}
