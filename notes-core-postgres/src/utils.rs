use heapless::String as HeaplessString;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};
use std::error::Error;
use std::str::FromStr;

use notes_core_db::{FieldValue, StoreError};

/// SQLSTATE raised by unique constraints.
const UNIQUE_VIOLATION: &str = "23505";

/// A trait for converting a database row into a model.
pub trait TryFromRow<R>: Sized {
    /// Performs the conversion.
    fn try_from_row(row: &R) -> Result<Self, Box<dyn Error + Send + Sync>>;
}

/// Retrieves a required `HeaplessString` from a row.
pub fn get_heapless_string<const N: usize>(
    row: &PgRow,
    col_name: &str,
) -> Result<HeaplessString<N>, Box<dyn Error + Send + Sync>> {
    let s: String = row.try_get(col_name)?;
    HeaplessString::from_str(&s).map_err(|_| {
        format!("Value for column '{col_name}' is too long (max {N} chars)").into()
    })
}

/// Retrieves an optional `HeaplessString` from a row.
pub fn get_optional_heapless_string<const N: usize>(
    row: &PgRow,
    col_name: &str,
) -> Result<Option<HeaplessString<N>>, Box<dyn Error + Send + Sync>> {
    let s: Option<String> = row.try_get(col_name)?;
    s.map(|val| HeaplessString::from_str(&val))
        .transpose()
        .map_err(|_| {
            format!("Value for column '{col_name}' is too long (max {N} chars)").into()
        })
}

/// Retrieves a text column holding the string form of `T`.
pub fn get_parsed<T>(row: &PgRow, col_name: &str) -> Result<T, Box<dyn Error + Send + Sync>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let s: String = row.try_get(col_name)?;
    s.parse()
        .map_err(|e: T::Err| format!("Value for column '{col_name}' is invalid: {e}").into())
}

/// Decode every row, failing on the first one that does not fit.
pub fn decode_rows<T: TryFromRow<PgRow>>(rows: &[PgRow]) -> Result<Vec<T>, StoreError> {
    rows.iter().map(decode_row).collect()
}

pub fn decode_row<T: TryFromRow<PgRow>>(row: &PgRow) -> Result<T, StoreError> {
    T::try_from_row(row).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })
}

/// Bind a column value; NULLs keep the column's SQL type.
pub fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: FieldValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        FieldValue::Bool(value) => query.bind(value),
        FieldValue::Int(value) => query.bind(value),
        FieldValue::Text(value) => query.bind(value),
        FieldValue::Timestamp(value) => query.bind(value),
    }
}

/// Translate a driver error into a store error for `table`.
///
/// Unique violations become conflicts carrying the constraint name; query
/// text and parameters are never copied into the error.
pub fn map_sqlx_error(table: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound {
            table,
            key: "row".to_string(),
        },
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Conflict {
                table,
                message: match db.constraint() {
                    Some(constraint) => format!("unique constraint {constraint} violated"),
                    None => "unique constraint violated".to_string(),
                },
            }
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Connection {
            message: err.to_string(),
        },
        sqlx::Error::ColumnNotFound(_) | sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Serialization {
                message: err.to_string(),
            }
        }
        other => StoreError::Query {
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_sqlx_error() {
        assert!(map_sqlx_error("program", sqlx::Error::RowNotFound).is_not_found());
        assert!(matches!(
            map_sqlx_error("program", sqlx::Error::PoolTimedOut),
            StoreError::Connection { .. }
        ));
        assert!(matches!(
            map_sqlx_error("program", sqlx::Error::ColumnNotFound("name".to_string())),
            StoreError::Serialization { .. }
        ));
        assert!(matches!(
            map_sqlx_error("program", sqlx::Error::Protocol("bad frame".to_string())),
            StoreError::Query { .. }
        ));
    }
}
