//! Validated mapping from raw result rows to typed records.
//!
//! Fetchers deliver rows as a column-name → [`Value`] map. Records implement
//! [`FromRow`] with the help of [`RowReader`], which checks each column's
//! storage class and reports a [`MappingError`] instead of passing through
//! values of the wrong shape.
//!
//! Optional columns may be absent from the row entirely: deployments that
//! override a query are free to select fewer descriptive columns.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;

/// One result row: column name → value.
pub type Row = BTreeMap<String, Value>;

/// A row could not be turned into a typed record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    /// A required column is absent or NULL.
    #[error("required column '{column}' is missing or NULL")]
    MissingColumn { column: String },

    /// A column holds a value of an unexpected storage class.
    #[error("column '{column}' expected {expected}, found {found}")]
    WrongType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A text column does not parse as a date or timestamp.
    #[error("column '{column}' holds an invalid date '{value}'")]
    InvalidDate { column: String, value: String },
}

/// Build a typed record from a [`Row`].
pub trait FromRow: Sized {
    /// Map `row` into `Self`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError`] if a required column is missing or any
    /// column has the wrong shape.
    fn from_row(row: &Row) -> Result<Self, MappingError>;
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Integer(_) => "integer",
        Value::Real(_) => "real",
        Value::Text(_) => "text",
        Value::Blob(_) => "blob",
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Column accessors over a borrowed [`Row`].
#[derive(Debug, Clone, Copy)]
pub struct RowReader<'a> {
    row: &'a Row,
}

impl<'a> RowReader<'a> {
    #[must_use]
    pub const fn new(row: &'a Row) -> Self {
        Self { row }
    }

    fn value(&self, column: &str) -> Option<&'a Value> {
        match self.row.get(column) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn wrong_type(column: &str, expected: &'static str, value: &Value) -> MappingError {
        MappingError::WrongType {
            column: column.to_string(),
            expected,
            found: type_name(value),
        }
    }

    /// Required identifier: integer or text, rendered as text.
    ///
    /// # Errors
    ///
    /// Missing/NULL column or a non-integer, non-text value.
    pub fn id(&self, column: &str) -> Result<String, MappingError> {
        self.opt_id(column)?.ok_or_else(|| MappingError::MissingColumn {
            column: column.to_string(),
        })
    }

    /// Optional identifier: integer or text, rendered as text.
    ///
    /// # Errors
    ///
    /// A non-integer, non-text value.
    pub fn opt_id(&self, column: &str) -> Result<Option<String>, MappingError> {
        match self.value(column) {
            None => Ok(None),
            Some(Value::Integer(id)) => Ok(Some(id.to_string())),
            Some(Value::Text(id)) => Ok(Some(id.clone())),
            Some(other) => Err(Self::wrong_type(column, "integer or text id", other)),
        }
    }

    /// Required text.
    ///
    /// # Errors
    ///
    /// Missing/NULL column or a non-text value.
    pub fn text(&self, column: &str) -> Result<String, MappingError> {
        self.opt_text(column)?.ok_or_else(|| MappingError::MissingColumn {
            column: column.to_string(),
        })
    }

    /// Optional text.
    ///
    /// # Errors
    ///
    /// A non-text value.
    pub fn opt_text(&self, column: &str) -> Result<Option<String>, MappingError> {
        match self.value(column) {
            None => Ok(None),
            Some(Value::Text(text)) => Ok(Some(text.clone())),
            Some(other) => Err(Self::wrong_type(column, "text", other)),
        }
    }

    /// Optional integer.
    ///
    /// # Errors
    ///
    /// A non-integer value.
    pub fn opt_i64(&self, column: &str) -> Result<Option<i64>, MappingError> {
        match self.value(column) {
            None => Ok(None),
            Some(Value::Integer(n)) => Ok(Some(*n)),
            Some(other) => Err(Self::wrong_type(column, "integer", other)),
        }
    }

    /// Optional number; integers are widened.
    ///
    /// # Errors
    ///
    /// A non-numeric value.
    #[allow(clippy::cast_precision_loss)]
    pub fn opt_f64(&self, column: &str) -> Result<Option<f64>, MappingError> {
        match self.value(column) {
            None => Ok(None),
            Some(Value::Real(n)) => Ok(Some(*n)),
            Some(Value::Integer(n)) => Ok(Some(*n as f64)),
            Some(other) => Err(Self::wrong_type(column, "number", other)),
        }
    }

    /// Required number; integers are widened.
    ///
    /// # Errors
    ///
    /// Missing/NULL column or a non-numeric value.
    pub fn f64(&self, column: &str) -> Result<f64, MappingError> {
        self.opt_f64(column)?.ok_or_else(|| MappingError::MissingColumn {
            column: column.to_string(),
        })
    }

    /// Optional flag stored as `0`/`1`. Absent means `false`.
    ///
    /// # Errors
    ///
    /// A non-integer value.
    pub fn flag(&self, column: &str) -> Result<bool, MappingError> {
        Ok(self.opt_i64(column)?.is_some_and(|n| n != 0))
    }

    /// Optional `YYYY-MM-DD` date. A full timestamp is accepted and
    /// truncated to its date.
    ///
    /// # Errors
    ///
    /// A non-text value or unparsable text.
    pub fn opt_date(&self, column: &str) -> Result<Option<NaiveDate>, MappingError> {
        let Some(text) = self.opt_text(column)? else {
            return Ok(None);
        };
        let trimmed = text.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Ok(Some(date));
        }
        parse_datetime(trimmed)
            .map(|ts| Some(ts.date()))
            .ok_or(MappingError::InvalidDate {
                column: column.to_string(),
                value: text,
            })
    }

    /// Optional timestamp. A bare date is read as midnight.
    ///
    /// # Errors
    ///
    /// A non-text value or unparsable text.
    pub fn opt_datetime(&self, column: &str) -> Result<Option<NaiveDateTime>, MappingError> {
        let Some(text) = self.opt_text(column)? else {
            return Ok(None);
        };
        let trimmed = text.trim();
        if let Some(ts) = parse_datetime(trimmed) {
            return Ok(Some(ts));
        }
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Some)
            .ok_or(MappingError::InvalidDate {
                column: column.to_string(),
                value: text,
            })
    }

    /// Required timestamp.
    ///
    /// # Errors
    ///
    /// Missing/NULL column, a non-text value or unparsable text.
    pub fn datetime(&self, column: &str) -> Result<NaiveDateTime, MappingError> {
        self.opt_datetime(column)?
            .ok_or_else(|| MappingError::MissingColumn {
                column: column.to_string(),
            })
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(columns: &[(&str, Value)]) -> Row {
        columns
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn ids_accept_integer_and_text() {
        let r = row(&[("a", Value::Integer(7)), ("b", Value::Text("x-1".into()))]);
        let reader = RowReader::new(&r);
        assert_eq!(reader.id("a").unwrap(), "7");
        assert_eq!(reader.id("b").unwrap(), "x-1");
    }

    #[test]
    fn null_required_column_is_missing() {
        let r = row(&[("a", Value::Null)]);
        let err = RowReader::new(&r).id("a").unwrap_err();
        assert_eq!(
            err,
            MappingError::MissingColumn {
                column: "a".to_string()
            }
        );
    }

    #[test]
    fn absent_optional_column_is_none() {
        let r = Row::new();
        let reader = RowReader::new(&r);
        assert_eq!(reader.opt_text("notes").unwrap(), None);
        assert_eq!(reader.opt_f64("price").unwrap(), None);
        assert!(!reader.flag("is_hidden").unwrap());
    }

    #[test]
    fn wrong_storage_class_is_reported() {
        let r = row(&[("title", Value::Real(1.5))]);
        let err = RowReader::new(&r).opt_text("title").unwrap_err();
        assert_eq!(
            err,
            MappingError::WrongType {
                column: "title".to_string(),
                expected: "text",
                found: "real",
            }
        );
    }

    #[test]
    fn integers_widen_to_f64() {
        let r = row(&[("price", Value::Integer(1200))]);
        assert_eq!(RowReader::new(&r).f64("price").unwrap(), 1200.0);
    }

    #[test]
    fn dates_parse_and_truncate() {
        let r = row(&[
            ("d", Value::Text("2024-03-01".into())),
            ("ts", Value::Text("2024-03-01 08:30:00".into())),
            ("bad", Value::Text("01/03/2024".into())),
        ]);
        let reader = RowReader::new(&r);
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(reader.opt_date("d").unwrap(), expected);
        assert_eq!(reader.opt_date("ts").unwrap(), expected);
        assert_eq!(
            reader.opt_datetime("d").unwrap(),
            expected.and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert!(matches!(
            reader.opt_date("bad"),
            Err(MappingError::InvalidDate { .. })
        ));
    }
}
