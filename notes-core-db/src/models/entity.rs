use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::str::FromStr;
use thiserror::Error;

use notes_core_api::EntityType;

use super::identifiable::Identifiable;
use crate::error::StoreError;

/// A typed column value.
///
/// Nullable variants carry the SQL type of the column so that a NULL binds
/// with the right parameter type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Bool(bool),
    Int(Option<i64>),
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
}

/// Column name to new value, ordered by column name.
pub type FieldChanges = BTreeMap<&'static str, FieldValue>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("column {column}: expected {expected}")]
    TypeMismatch { column: String, expected: &'static str },

    #[error("column {column} must not be null")]
    Null { column: String },

    #[error("column {column} exceeds {max} characters")]
    TooLong { column: String, max: usize },

    #[error("unknown column {column}")]
    UnknownColumn { column: String },

    #[error("column {column}: {message}")]
    Invalid { column: String, message: String },
}

impl From<FieldError> for StoreError {
    fn from(err: FieldError) -> Self {
        StoreError::Serialization {
            message: err.to_string(),
        }
    }
}

impl FieldValue {
    pub fn text(&self, column: &str) -> Result<Option<String>, FieldError> {
        match self {
            FieldValue::Text(value) => Ok(value.clone()),
            _ => Err(mismatch(column, "text")),
        }
    }

    pub fn required_text(&self, column: &str) -> Result<String, FieldError> {
        self.text(column)?.ok_or_else(|| null(column))
    }

    pub fn bounded<const N: usize>(&self, column: &str) -> Result<HeaplessString<N>, FieldError> {
        to_bounded(column, &self.required_text(column)?)
    }

    pub fn optional_bounded<const N: usize>(
        &self,
        column: &str,
    ) -> Result<Option<HeaplessString<N>>, FieldError> {
        self.text(column)?
            .map(|value| to_bounded(column, &value))
            .transpose()
    }

    pub fn int(&self, column: &str) -> Result<Option<i64>, FieldError> {
        match self {
            FieldValue::Int(value) => Ok(*value),
            _ => Err(mismatch(column, "integer")),
        }
    }

    pub fn required_int(&self, column: &str) -> Result<i64, FieldError> {
        self.int(column)?.ok_or_else(|| null(column))
    }

    pub fn timestamp(&self, column: &str) -> Result<Option<DateTime<Utc>>, FieldError> {
        match self {
            FieldValue::Timestamp(value) => Ok(*value),
            _ => Err(mismatch(column, "timestamp")),
        }
    }

    pub fn required_timestamp(&self, column: &str) -> Result<DateTime<Utc>, FieldError> {
        self.timestamp(column)?.ok_or_else(|| null(column))
    }

    pub fn bool(&self, column: &str) -> Result<bool, FieldError> {
        match self {
            FieldValue::Bool(value) => Ok(*value),
            _ => Err(mismatch(column, "boolean")),
        }
    }

    /// Text column holding the string form of `T`.
    pub fn parsed<T>(&self, column: &str) -> Result<T, FieldError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.required_text(column)?;
        raw.parse().map_err(|e: T::Err| FieldError::Invalid {
            column: column.to_string(),
            message: e.to_string(),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            FieldValue::Int(None) | FieldValue::Text(None) | FieldValue::Timestamp(None)
        )
    }
}

fn mismatch(column: &str, expected: &'static str) -> FieldError {
    FieldError::TypeMismatch {
        column: column.to_string(),
        expected,
    }
}

fn null(column: &str) -> FieldError {
    FieldError::Null {
        column: column.to_string(),
    }
}

/// Convert text into a fixed-capacity string.
pub fn to_bounded<const N: usize>(column: &str, value: &str) -> Result<HeaplessString<N>, FieldError> {
    HeaplessString::try_from(value).map_err(|_| FieldError::TooLong {
        column: column.to_string(),
        max: N,
    })
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(Some(value))
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        FieldValue::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(Some(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(Some(value))
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Option<&str>> for FieldValue {
    fn from(value: Option<&str>) -> Self {
        FieldValue::Text(value.map(str::to_string))
    }
}

impl<const N: usize> From<&HeaplessString<N>> for FieldValue {
    fn from(value: &HeaplessString<N>) -> Self {
        FieldValue::Text(Some(value.as_str().to_string()))
    }
}

impl<const N: usize> From<Option<&HeaplessString<N>>> for FieldValue {
    fn from(value: Option<&HeaplessString<N>>) -> Self {
        FieldValue::Text(value.map(|v| v.as_str().to_string()))
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(Some(value))
    }
}

impl From<Option<DateTime<Utc>>> for FieldValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<EntityType> for FieldValue {
    fn from(value: EntityType) -> Self {
        FieldValue::Text(Some(value.as_str().to_string()))
    }
}

/// Table-level description of a persisted entity.
///
/// The id column is implicit: it is generated by the store on create and is
/// never part of `COLUMNS`.
pub trait Entity:
    Identifiable + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Table the entity lives in
    const TABLE: &'static str;

    /// Writable columns, excluding `id`
    const COLUMNS: &'static [&'static str];

    /// Type tag used by aliases and taggings, if the entity is addressable
    const ENTITY_TYPE: Option<EntityType> = None;

    fn set_id(&mut self, id: i64);

    /// Current value of a writable column.
    fn column(&self, name: &str) -> Option<FieldValue>;

    /// Apply a set of column changes in place.
    fn apply(&mut self, changes: &FieldChanges) -> Result<(), FieldError>;

    /// Value of any column, `id` included.
    fn value_of(&self, name: &str) -> Option<FieldValue> {
        if name == "id" {
            Some(FieldValue::from(self.get_id()))
        } else {
            self.column(name)
        }
    }

    fn has_column(name: &str) -> bool {
        name == "id" || Self::COLUMNS.contains(&name)
    }
}
