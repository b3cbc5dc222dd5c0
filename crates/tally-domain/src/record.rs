//! The typed record abstraction shared by every dataset.
//!
//! Each dataset (projects, subscriptions, budget) implements [`Record`] with
//! its own field enum, so field membership and field/value kinds are checked
//! at the store boundary instead of going through loosely-typed row maps.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Stable record identity.
///
/// Assigned by the remote store on create; until then a locally generated
/// temporary value. Remote stores are inconsistent about whether ids come back
/// as JSON numbers or strings, so deserialization accepts both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// A locally generated placeholder identity for an optimistic create.
    pub fn temporary() -> Self {
        RecordId(format!("tmp-{}", Uuid::new_v4()))
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with("tmp-")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(i64),
            Str(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Num(n) => RecordId(n.to_string()),
            Repr::Str(s) => RecordId(s),
        })
    }
}

/// What a field holds, which drives validation, normalization, and whether an
/// edit triggers a derived-field recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free descriptive text.
    Text,
    /// Status text. Seed data may hold a comma-joined multi-value string;
    /// it is preserved literally.
    Status,
    /// Nonnegative monetary amount; contributes to the derived field.
    Amount,
    /// Computed from the amount fields, never entered directly.
    Derived,
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Amount(f64),
}

impl FieldValue {
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            FieldValue::Amount(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// The string form an edit session seeds its draft with.
    pub fn display_string(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Amount(v) => v.to_string(),
        }
    }
}

/// A field/value kind mismatch, rejected at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field {field} expects a {expected} value")]
pub struct FieldTypeError {
    pub field: String,
    pub expected: &'static str,
}

/// One row of a dataset.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// The dataset's field enum. `Display` renders the wire name.
    type Field: Copy + Eq + fmt::Debug + fmt::Display + 'static;

    /// Route segment on the remote store (`GET /{DATASET}` etc).
    const DATASET: &'static str;

    /// Key the dataset snapshot is mirrored under locally.
    const CACHE_KEY: &'static str;

    /// All editable and derived fields, in column order. Identity and ordinal
    /// are not fields.
    fn fields() -> &'static [Self::Field];

    fn kind(field: Self::Field) -> FieldKind;

    /// The one field computed from the others.
    fn derived_field() -> Self::Field;

    fn id(&self) -> &RecordId;

    fn set_id(&mut self, id: RecordId);

    /// 1-based position in the collection.
    fn ordinal(&self) -> u32;

    fn set_ordinal(&mut self, ordinal: u32);

    fn get(&self, field: Self::Field) -> FieldValue;

    /// Replace one field. The value variant must match the field's kind;
    /// mismatches are rejected without mutating.
    fn set(&mut self, field: Self::Field, value: FieldValue) -> Result<(), FieldTypeError>;

    /// Recompute the derived field from the current inputs. Pure and
    /// idempotent; rounds to cents.
    fn recompute_derived(&mut self);

    /// An empty new row for add-row.
    fn blank() -> Self;
}

/// Shared `set` plumbing for the per-dataset implementations.
pub(crate) fn expect_text(
    field: impl fmt::Display,
    value: FieldValue,
) -> Result<String, FieldTypeError> {
    match value {
        FieldValue::Text(s) => Ok(s),
        FieldValue::Amount(_) => Err(FieldTypeError {
            field: field.to_string(),
            expected: "text",
        }),
    }
}

pub(crate) fn expect_amount(
    field: impl fmt::Display,
    value: FieldValue,
) -> Result<f64, FieldTypeError> {
    match value {
        FieldValue::Amount(v) => Ok(v),
        FieldValue::Text(_) => Err(FieldTypeError {
            field: field.to_string(),
            expected: "amount",
        }),
    }
}
