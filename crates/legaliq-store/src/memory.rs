//! An in-process document database for local development and tests.
//!
//! [`InMemoryDatabase`] implements the same semantics as the hosted store
//! for the operations LegalIQ uses, and additionally records every call so
//! tests can assert exactly what reached the database.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::{Map, Value};

use crate::{
    DocumentData, DocumentDatabase, DocumentPath, DocumentSnapshot,
    FieldValue, SetOptions, StoreError,
};

/// Length of generated document ids.
const AUTO_ID_LEN: usize = 20;

/// Database operations that can have a failure injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Set,
    Update,
    Add,
}

/// A call as it reached the database.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Get {
        path: String,
    },
    Set {
        path: String,
        data: DocumentData,
        options: SetOptions,
    },
    Update {
        path: String,
        data: DocumentData,
    },
    Add {
        collection: String,
        data: DocumentData,
    },
}

impl StoreCall {
    /// The path or collection the call targeted.
    pub fn target(&self) -> &str {
        match self {
            Self::Get { path }
            | Self::Set { path, .. }
            | Self::Update { path, .. } => path,
            Self::Add { collection, .. } => collection,
        }
    }
}

#[derive(Default)]
struct Inner {
    /// Documents keyed by full path.
    docs: BTreeMap<String, Map<String, Value>>,
    calls: Vec<StoreCall>,
    failures: HashMap<StoreOp, VecDeque<StoreError>>,
}

/// A [`DocumentDatabase`] that keeps documents in a map.
#[derive(Default)]
pub struct InMemoryDatabase {
    inner: Mutex<Inner>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document directly, bypassing the call log.
    pub fn insert_document(&self, path: &str, data: Map<String, Value>) {
        self.lock().docs.insert(path.to_string(), data);
    }

    /// The stored fields at `path`.
    pub fn document(&self, path: &str) -> Option<Map<String, Value>> {
        self.lock().docs.get(path).cloned()
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.lock().docs.len()
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Makes the next `op` call fail with `err`. The call is still
    /// recorded.
    pub fn fail_next(&self, op: StoreOp, err: StoreError) {
        self.lock().failures.entry(op).or_default().push_back(err);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    /// Logs the call, then returns an injected failure if one is queued.
    fn record(&mut self, op: StoreOp, call: StoreCall) -> Result<(), StoreError> {
        self.calls.push(call);
        match self.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl DocumentDatabase for InMemoryDatabase {
    async fn get_doc(
        &self,
        path: &DocumentPath,
    ) -> Result<DocumentSnapshot, StoreError> {
        let key = path.to_string();
        let mut inner = self.lock();
        inner.record(StoreOp::Get, StoreCall::Get { path: key.clone() })?;

        Ok(match inner.docs.get(&key) {
            Some(data) => DocumentSnapshot::found(path.clone(), data.clone()),
            None => DocumentSnapshot::missing(path.clone()),
        })
    }

    async fn set_doc(
        &self,
        path: &DocumentPath,
        data: DocumentData,
        options: SetOptions,
    ) -> Result<(), StoreError> {
        let key = path.to_string();
        let mut inner = self.lock();
        inner.record(
            StoreOp::Set,
            StoreCall::Set {
                path: key.clone(),
                data: data.clone(),
                options,
            },
        )?;

        let mut doc = if options.merge {
            inner.docs.remove(&key).unwrap_or_default()
        } else {
            Map::new()
        };
        apply(&mut doc, data);
        inner.docs.insert(key, doc);
        Ok(())
    }

    async fn update_doc(
        &self,
        path: &DocumentPath,
        data: DocumentData,
    ) -> Result<(), StoreError> {
        let key = path.to_string();
        let mut inner = self.lock();
        inner.record(
            StoreOp::Update,
            StoreCall::Update {
                path: key.clone(),
                data: data.clone(),
            },
        )?;

        let doc = inner
            .docs
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        apply(doc, data);
        Ok(())
    }

    async fn add_doc(
        &self,
        collection: &str,
        data: DocumentData,
    ) -> Result<DocumentPath, StoreError> {
        let mut inner = self.lock();
        inner.record(
            StoreOp::Add,
            StoreCall::Add {
                collection: collection.to_string(),
                data: data.clone(),
            },
        )?;

        let path = loop {
            let candidate = DocumentPath::new(collection, generate_id());
            if !inner.docs.contains_key(&candidate.to_string()) {
                break candidate;
            }
        };
        let mut doc = Map::new();
        apply(&mut doc, data);
        inner.docs.insert(path.to_string(), doc);
        Ok(path)
    }
}

/// Writes `data` into `doc`, resolving sentinels against what is stored.
fn apply(doc: &mut Map<String, Value>, data: DocumentData) {
    for (field, value) in data {
        let resolved = match value {
            FieldValue::Value(v) => v,
            FieldValue::ServerTimestamp => Value::String(
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            FieldValue::ArrayUnion(elements) => {
                let mut array = match doc.remove(&field) {
                    Some(Value::Array(existing)) => existing,
                    _ => Vec::new(),
                };
                for element in elements {
                    if !array.contains(&element) {
                        array.push(element);
                    }
                }
                Value::Array(array)
            }
        };
        doc.insert(field, resolved);
    }
}

/// Generates a 20-character alphanumeric document id.
fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}
