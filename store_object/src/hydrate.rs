//! Row hydration
//!
//! Builds a record from the column descriptors and raw values of one result
//! row, coercing each raw value to its field's declared kind.
//!
//! A hydration moves `Pending -> Populating -> Validated`, or ends in
//! `Failed` on the first error.

use crate::errors::MapperError;
use crate::metadata::{EntityMetadata, FieldMetadata};
use crate::record::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use type_mapping::{ColumnDescriptor, FieldKind, SqlValue, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationState {
    Pending,
    Populating,
    Validated,
    Failed,
}

impl HydrationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, HydrationState::Validated | HydrationState::Failed)
    }
}

pub struct RowHydrator<'m> {
    metadata: &'m EntityMetadata,
    record: Record,
    state: HydrationState,
}

impl<'m> RowHydrator<'m> {
    pub fn new(metadata: &'m EntityMetadata) -> Self {
        Self {
            metadata,
            record: Record::new(),
            state: HydrationState::Pending,
        }
    }

    /// Hydrate one row: apply every column in order, then check that every
    /// declared field was initialized.
    pub fn hydrate(
        metadata: &'m EntityMetadata,
        columns: &[ColumnDescriptor],
        values: Vec<SqlValue>,
    ) -> Result<Record, MapperError> {
        let mut hydrator = Self::new(metadata);
        for (column, raw) in columns.iter().zip(values) {
            hydrator.apply(column, raw)?;
        }
        hydrator.finish()
    }

    pub fn state(&self) -> HydrationState {
        self.state
    }

    /// Coerce one raw column value and assign it to the matching field.
    /// Columns that match no declared field are skipped.
    pub fn apply(&mut self, column: &ColumnDescriptor, raw: SqlValue) -> Result<(), MapperError> {
        if self.state.is_terminal() {
            return Err(MapperError::validation(
                &column.name,
                "Row hydration has already completed",
            ));
        }
        self.state = HydrationState::Populating;

        let Some(field) = self.metadata.resolve_column(&column.name) else {
            tracing::trace!(column = %column.name, "skipping column with no matching field");
            return Ok(());
        };

        match coerce(field, column, raw) {
            Ok(value) => {
                self.record.set(field.name(), value);
                Ok(())
            }
            Err(e) => {
                self.state = HydrationState::Failed;
                Err(e)
            }
        }
    }

    /// Finish the hydration. Fails naming the first field left uninitialized.
    pub fn finish(&mut self) -> Result<Record, MapperError> {
        if self.state == HydrationState::Failed {
            return Err(MapperError::validation(
                self.metadata.short_name(),
                "Row hydration failed",
            ));
        }

        if let Some(missing) = self
            .metadata
            .fields()
            .iter()
            .find(|f| !self.record.is_initialized(f.name()))
        {
            self.state = HydrationState::Failed;
            return Err(MapperError::uninitialized(missing.name()));
        }

        self.state = HydrationState::Validated;
        Ok(std::mem::take(&mut self.record))
    }
}

/// Coerce a raw value to the field's kind
fn coerce(
    field: &FieldMetadata,
    column: &ColumnDescriptor,
    raw: SqlValue,
) -> Result<Value, MapperError> {
    if raw.is_null() {
        return if field.is_nullable() {
            Ok(Value::Null)
        } else {
            Err(MapperError::not_nullable(field.name()))
        };
    }

    match field.kind() {
        FieldKind::DateTime => coerce_datetime(field, raw),
        FieldKind::Structured => match raw {
            SqlValue::Text(text) => serde_json::from_str(&text)
                .map(Value::Structured)
                .map_err(|e| MapperError::decode(field.name(), e.to_string())),
            // numeric JSON documents come back as numbers under NUMERIC affinity
            SqlValue::Integer(i) => Ok(Value::Structured(i.into())),
            SqlValue::Real(f) => serde_json::Number::from_f64(f)
                .map(|n| Value::Structured(n.into()))
                .ok_or_else(|| mismatch(field, &SqlValue::Real(f))),
            other => Err(mismatch(field, &other)),
        },
        FieldKind::Integer => match raw {
            SqlValue::Integer(i) => Ok(Value::Integer(i)),
            SqlValue::Boolean(b) => Ok(Value::Integer(i64::from(b))),
            other => Err(mismatch(field, &other)),
        },
        FieldKind::Real => match raw {
            SqlValue::Real(f) => Ok(Value::Real(f)),
            SqlValue::Integer(i) => Ok(Value::Real(i as f64)),
            other => Err(mismatch(field, &other)),
        },
        FieldKind::Text => match raw {
            SqlValue::Text(s) => Ok(Value::Text(s)),
            SqlValue::Integer(i) => Ok(Value::Text(i.to_string())),
            SqlValue::Real(f) => Ok(Value::Text(f.to_string())),
            other => Err(mismatch(field, &other)),
        },
        FieldKind::Boolean => match raw {
            SqlValue::Boolean(b) => Ok(Value::Boolean(b)),
            SqlValue::Integer(0) => Ok(Value::Boolean(false)),
            SqlValue::Integer(1) => Ok(Value::Boolean(true)),
            other => Err(mismatch(field, &other)),
        },
        FieldKind::Custom(kind) => kind
            .construct(raw, column)
            .map(Value::Custom)
            .map_err(|e| MapperError::decode(field.name(), e)),
    }
}

fn mismatch(field: &FieldMetadata, raw: &SqlValue) -> MapperError {
    MapperError::validation(
        field.name(),
        format!(
            "Unable to convert {} value to {} for property '{}'",
            raw.type_name(),
            field.kind().name(),
            field.name()
        ),
    )
}

fn coerce_datetime(field: &FieldMetadata, raw: SqlValue) -> Result<Value, MapperError> {
    let parsed = match raw {
        SqlValue::Text(text) => parse_datetime(&text).ok_or_else(|| {
            MapperError::decode(
                field.name(),
                format!("Unable to parse '{}' as a datetime", text),
            )
        })?,
        SqlValue::Integer(seconds) => DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
            MapperError::decode(field.name(), format!("Timestamp {} is out of range", seconds))
        })?,
        SqlValue::Real(seconds) => from_fractional_seconds(seconds).ok_or_else(|| {
            MapperError::decode(field.name(), format!("Timestamp {} is out of range", seconds))
        })?,
        other => return Err(mismatch(field, &other)),
    };
    Ok(Value::DateTime(parsed))
}

/// Unix seconds with a fractional part, kept to microsecond precision
fn from_fractional_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let micros = (seconds * 1_000_000.0).round() as i64;
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos)
}

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
];

/// Parse a general datetime string. Strings without an offset are UTC.
fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // an explicit UTC designator reads the same as no offset
    let text = text
        .strip_suffix(" UTC")
        .or_else(|| text.strip_suffix('Z'))
        .unwrap_or(text);

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Constraint, FieldMetadata, MarkerValue};
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn metadata() -> EntityMetadata {
        EntityMetadata::new("Test")
            .with_schema_name("test")
            .field(FieldMetadata::new("id", FieldKind::Integer, true).with(Constraint::PrimaryKey))
            .field(FieldMetadata::new("value", FieldKind::Text, false))
            .field(FieldMetadata::new("isNullable", FieldKind::Text, true))
            .field(FieldMetadata::new("dateTime", FieldKind::DateTime, true))
            .field(FieldMetadata::new("simpleArray", FieldKind::Structured, true))
            .field(
                FieldMetadata::new("hasDefault", FieldKind::Text, false)
                    .with(Constraint::SqlDefault(MarkerValue::literal("bar"))),
            )
    }

    fn columns(names: &[&str]) -> Vec<ColumnDescriptor> {
        names
            .iter()
            .map(|name| ColumnDescriptor::new(*name, None))
            .collect()
    }

    fn coerce_one(name: &str, raw: SqlValue) -> Result<Value, MapperError> {
        let metadata = metadata();
        let field = metadata.find_field(name).unwrap();
        coerce(field, &ColumnDescriptor::new(field.column(), None), raw)
    }

    #[test]
    fn test_hydrate_full_row() {
        let metadata = metadata();
        let record = RowHydrator::hydrate(
            &metadata,
            &columns(&["id", "value", "is_nullable", "date_time", "simple_array", "has_default"]),
            vec![
                SqlValue::Integer(3),
                SqlValue::Text("foo".to_string()),
                SqlValue::Null,
                SqlValue::Text("2025-02-16T15:32:00Z".to_string()),
                SqlValue::Text("[1,2,3]".to_string()),
                SqlValue::Text("bar".to_string()),
            ],
        )
        .unwrap();

        assert_eq!(record.get("id"), Some(&Value::Integer(3)));
        assert_eq!(record.get("value"), Some(&Value::Text("foo".to_string())));
        assert_eq!(record.get("isNullable"), Some(&Value::Null));
        assert_eq!(
            record.get("dateTime").and_then(Value::as_datetime).map(|dt| dt.timestamp()),
            Some(1739719920)
        );
        assert_eq!(record.get("simpleArray"), Some(&Value::Structured(json!([1, 2, 3]))));
        assert_eq!(record.get("hasDefault"), Some(&Value::Text("bar".to_string())));
    }

    #[test]
    fn test_missing_column_fails_naming_field() {
        let metadata = metadata();
        let err = RowHydrator::hydrate(&metadata, &columns(&["id"]), vec![SqlValue::Integer(4)])
            .unwrap_err();
        assert!(matches!(err, MapperError::Validation { .. }));
        assert_eq!(err.field(), Some("value"));
        assert!(err.to_string().contains("'value'"));
    }

    #[test]
    fn test_state_transitions() {
        let metadata = metadata();
        let mut hydrator = RowHydrator::new(&metadata);
        assert_eq!(hydrator.state(), HydrationState::Pending);

        hydrator
            .apply(&ColumnDescriptor::new("id", None), SqlValue::Integer(1))
            .unwrap();
        assert_eq!(hydrator.state(), HydrationState::Populating);

        let err = hydrator
            .apply(&ColumnDescriptor::new("value", None), SqlValue::Null)
            .unwrap_err();
        assert_eq!(err.field(), Some("value"));
        assert_eq!(hydrator.state(), HydrationState::Failed);
        assert!(hydrator.finish().is_err());
        assert!(hydrator
            .apply(&ColumnDescriptor::new("id", None), SqlValue::Integer(2))
            .is_err());
    }

    #[test]
    fn test_validated_state() {
        let metadata = EntityMetadata::new("Pair")
            .field(FieldMetadata::new("id", FieldKind::Integer, false).with(Constraint::PrimaryKey))
            .field(FieldMetadata::new("label", FieldKind::Text, false));
        let mut hydrator = RowHydrator::new(&metadata);
        hydrator
            .apply(&ColumnDescriptor::new("id", None), SqlValue::Integer(1))
            .unwrap();
        hydrator
            .apply(&ColumnDescriptor::new("label", None), SqlValue::Text("x".to_string()))
            .unwrap();
        let record = hydrator.finish().unwrap();
        assert_eq!(hydrator.state(), HydrationState::Validated);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_unknown_columns_are_ignored() {
        let metadata = EntityMetadata::new("Pair")
            .field(FieldMetadata::new("id", FieldKind::Integer, false).with(Constraint::PrimaryKey));
        let record = RowHydrator::hydrate(
            &metadata,
            &columns(&["id", "rowid_extra"]),
            vec![SqlValue::Integer(1), SqlValue::Integer(9)],
        )
        .unwrap();
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_text_from_string_integer_and_real() {
        assert_eq!(
            coerce_one("value", SqlValue::Text("test value".to_string())).unwrap(),
            Value::Text("test value".to_string())
        );
        assert_eq!(
            coerce_one("value", SqlValue::Integer(1)).unwrap(),
            Value::Text("1".to_string())
        );
        assert_eq!(
            coerce_one("value", SqlValue::Real(5.0)).unwrap(),
            Value::Text("5".to_string())
        );
    }

    #[test]
    fn test_null_into_non_nullable_fails() {
        let err = coerce_one("value", SqlValue::Null).unwrap_err();
        assert!(matches!(err, MapperError::Validation { .. }));
        assert!(err.to_string().contains("not nullable"));
        assert_eq!(coerce_one("dateTime", SqlValue::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_datetime_from_string() {
        let value = coerce_one("dateTime", SqlValue::Text("1944-06-04 00:15".to_string())).unwrap();
        assert_eq!(value.as_datetime().unwrap().timestamp(), -807147900);

        let value = coerce_one("dateTime", SqlValue::Text("2024-01-02".to_string())).unwrap();
        let dt = value.as_datetime().unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2024, 1, 2, 0));

        let value =
            coerce_one("dateTime", SqlValue::Text("2025-02-16T17:32:00+02:00".to_string())).unwrap();
        assert_eq!(value.as_datetime().unwrap().timestamp(), 1739719920);

        for text in [
            "2025-02-16T15:32:00Z",
            "2025-02-16T15:32:00.000Z",
            "2025-02-16 15:32:00+00:00",
            "2025-02-16T15:32:00+0000",
            "2025-02-16T17:32:00+0200",
            "2025-02-16 15:32:00+0000",
            "2025-02-16 10:32:00.000-0500",
            "2025-02-16T15:32+0000",
            "2025-02-16 15:32:00 UTC",
            "2025-02-16 15:32:00Z",
            "2025-02-16T15:32:00",
            "2025-02-16 15:32",
            "Sun, 16 Feb 2025 15:32:00 +0000",
            "16 Feb 2025 15:32:00",
            "16 Feb 2025 15:32",
        ] {
            let value = coerce_one("dateTime", SqlValue::Text(text.to_string()))
                .unwrap_or_else(|e| panic!("{}: {}", text, e));
            assert_eq!(value.as_datetime().unwrap().timestamp(), 1739719920, "{}", text);
        }
    }

    #[test]
    fn test_datetime_from_integer_seconds() {
        let value = coerce_one("dateTime", SqlValue::Integer(-14182940)).unwrap();
        let dt = value.as_datetime().unwrap();
        assert_eq!(dt.to_rfc3339(), "1969-07-20T20:17:40+00:00");
    }

    #[test]
    fn test_datetime_from_fractional_seconds() {
        let value = coerce_one("dateTime", SqlValue::Real(1739719920.123456)).unwrap();
        let dt = value.as_datetime().unwrap();
        assert_eq!(dt.timestamp(), 1739719920);
        assert_eq!(dt.timestamp_subsec_micros(), 123456);

        // the fraction counts toward the epoch like the whole seconds do
        let value = coerce_one("dateTime", SqlValue::Real(-14182940.123456)).unwrap();
        let dt = value.as_datetime().unwrap();
        assert_eq!(dt.timestamp_micros(), -14_182_940_123_456);
        assert_eq!(dt.timestamp(), -14182941);
        assert_eq!(dt.timestamp_subsec_micros(), 876544);
        assert_eq!(dt.to_rfc3339(), "1969-07-20T20:17:39.876544+00:00");

        let value = coerce_one("dateTime", SqlValue::Real(-0.5)).unwrap();
        let dt = value.as_datetime().unwrap();
        assert_eq!(dt.timestamp(), -1);
        assert_eq!(dt.timestamp_subsec_micros(), 500000);
    }

    #[test]
    fn test_malformed_datetime_is_decode_error() {
        let err = coerce_one("dateTime", SqlValue::Text("not a date".to_string())).unwrap_err();
        assert!(matches!(err, MapperError::Decode { .. }));
        assert_eq!(err.field(), Some("dateTime"));
    }

    #[test]
    fn test_structured_from_json_object_and_array() {
        let value = coerce_one("simpleArray", SqlValue::Text(r#"{"foo":"bar"}"#.to_string())).unwrap();
        assert_eq!(value.as_structured().unwrap()["foo"], "bar");

        let complex = json!(["foo", 1, {"bar": "baz"}]);
        let value = coerce_one("simpleArray", SqlValue::Text(complex.to_string())).unwrap();
        assert_eq!(value, Value::Structured(complex.clone()));

        // decoding then re-encoding yields an equivalent value
        let reencoded = type_mapping::marshal(&value);
        assert_eq!(reencoded, SqlValue::Text(complex.to_string()));
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let err = coerce_one("simpleArray", SqlValue::Text("[".to_string())).unwrap_err();
        assert!(matches!(err, MapperError::Decode { .. }));
    }

    #[test]
    fn test_structured_from_non_string() {
        assert_eq!(
            coerce_one("simpleArray", SqlValue::Integer(3)).unwrap(),
            Value::Structured(json!(3))
        );
        let err = coerce_one("simpleArray", SqlValue::Blob(vec![1, 2])).unwrap_err();
        assert!(matches!(err, MapperError::Validation { .. }));
    }
}
