//! Document data, field-value sentinels, and snapshots.
//!
//! Writes carry a [`DocumentData`]: a map from field name to
//! [`FieldValue`]. Most fields are plain JSON values; two are sentinels
//! the database resolves at write time:
//!
//! - [`FieldValue::ServerTimestamp`]: "use the database's clock"
//! - [`FieldValue::ArrayUnion`]: "append these elements to the stored
//!   array unless already present"
//!
//! Reads come back as a [`DocumentSnapshot`] of plain JSON.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{DocumentPath, StoreError};

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// One field in a write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A literal JSON value.
    Value(Value),

    /// Resolved to the database's current time when written.
    ServerTimestamp,

    /// Appends each element not already in the stored array. A missing
    /// or non-array field becomes a new array.
    ArrayUnion(Vec<Value>),
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

/// The server-timestamp sentinel.
pub fn server_timestamp() -> FieldValue {
    FieldValue::ServerTimestamp
}

/// The array-union sentinel for the given elements.
///
/// Deduplication against the stored array is left to the database.
pub fn array_union(elements: impl IntoIterator<Item = Value>) -> FieldValue {
    FieldValue::ArrayUnion(elements.into_iter().collect())
}

/// [`array_union`] for any serializable elements.
pub fn array_union_of<T: Serialize>(
    elements: &[T],
) -> Result<FieldValue, StoreError> {
    let values = elements
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FieldValue::ArrayUnion(values))
}

// ---------------------------------------------------------------------------
// DocumentData
// ---------------------------------------------------------------------------

/// The fields of a write, keyed by field name.
///
/// A `BTreeMap` keeps field order stable, which makes recorded writes easy
/// to compare in tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentData(BTreeMap<String, FieldValue>);

impl DocumentData {
    /// No fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field (builder style).
    pub fn with(
        mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.insert(field, value);
        self
    }

    /// Adds or replaces a field.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) {
        self.0.insert(field.into(), value.into());
    }

    /// The value written for `field`.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Iterates fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts any serializable struct or map into literal fields.
    ///
    /// # Errors
    /// [`StoreError::InvalidData`] if `value` doesn't serialize to a JSON
    /// object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, FieldValue::Value(v)))
                .collect()),
            other => Err(StoreError::InvalidData(format!(
                "expected an object, got {other}"
            ))),
        }
    }
}

impl FromIterator<(String, FieldValue)> for DocumentData {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for DocumentData {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ---------------------------------------------------------------------------
// SetOptions
// ---------------------------------------------------------------------------

/// Options for `set`. Passed to the database untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Merge into the existing document instead of replacing it.
    pub merge: bool,
}

impl SetOptions {
    /// `{ merge: true }`.
    pub fn merge() -> Self {
        Self { merge: true }
    }
}

// ---------------------------------------------------------------------------
// DocumentSnapshot
// ---------------------------------------------------------------------------

/// The result of a read. `data` is `None` when the document is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    path: DocumentPath,
    data: Option<Map<String, Value>>,
}

impl DocumentSnapshot {
    /// A snapshot of an existing document.
    pub fn found(path: DocumentPath, data: Map<String, Value>) -> Self {
        Self {
            path,
            data: Some(data),
        }
    }

    /// A snapshot of a missing document.
    pub fn missing(path: DocumentPath) -> Self {
        Self { path, data: None }
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    /// All fields, or `None` for a missing document.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }

    /// One field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(field))
    }

    /// Deserializes the whole document. `Ok(None)` when missing.
    pub fn to_object<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        match &self.data {
            Some(map) => Ok(Some(serde_json::from_value(Value::Object(map.clone()))?)),
            None => Ok(None),
        }
    }
}
