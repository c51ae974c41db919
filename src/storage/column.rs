//! Nullable column decoding
//!
//! Every text column of the catalog may be NULL. A NULL decodes to the
//! empty string (or zero); only a value that cannot be read as the expected
//! type fails the row.

use rusqlite::Row;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};

/// A text column that may be NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullString(pub Option<String>);

impl NullString {
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// The value, or the empty string for NULL
    pub fn into_string(self) -> String {
        self.0.unwrap_or_default()
    }
}

impl FromSql for NullString {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(NullString(None)),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => std::str::from_utf8(bytes)
                .map(|s| NullString(Some(s.to_string())))
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            ValueRef::Integer(i) => Ok(NullString(Some(i.to_string()))),
            ValueRef::Real(f) => Ok(NullString(Some(f.to_string()))),
        }
    }
}

/// An integer column that may be NULL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullInt(pub Option<i64>);

impl NullInt {
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// The value, or zero for NULL
    pub fn into_i64(self) -> i64 {
        self.0.unwrap_or_default()
    }
}

impl FromSql for NullInt {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(NullInt(None)),
            ValueRef::Integer(i) => Ok(NullInt(Some(i))),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .map(|i| NullInt(Some(i)))
                .ok_or(FromSqlError::InvalidType),
            ValueRef::Real(_) | ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

/// Read column `idx` as text, NULL -> ""
pub fn text(row: &Row, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, NullString>(idx)?.into_string())
}

/// Read column `idx` as an integer, NULL -> 0
pub fn int(row: &Row, idx: usize) -> rusqlite::Result<i64> {
    Ok(row.get::<_, NullInt>(idx)?.into_i64())
}
