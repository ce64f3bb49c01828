//! MySQL row -> JSON conversion.
//! Columns are decoded by their reported type name, falling back to a
//! try-each-type chain for anything unrecognised.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Map, Number, Value};
use sqlx::mysql::MySqlRow;
use sqlx::types::BigDecimal;
use sqlx::{Column, Row, TypeInfo};

/// Convert a row into an ordered JSON object keyed by column name
pub fn row_to_json(row: &MySqlRow) -> Map<String, Value> {
    let mut map = Map::new();
    for (i, column) in row.columns().iter().enumerate() {
        let value = column_value(row, i, column.type_info().name());
        map.insert(column.name().to_string(), value);
    }
    map
}

/// How a column is decoded, chosen from its reported type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Signed,
    Unsigned,
    // YEAR passes no integer compatibility check, so it is decoded unchecked
    Year,
    // FLOAT and DOUBLE both decode straight to f64; widening an f32 adds digits
    Float,
    Decimal,
    Date,
    Time,
    DateTime,
    Timestamp,
    Json,
    Binary,
    Text,
}

fn column_kind(type_name: &str) -> ColumnKind {
    match type_name {
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => ColumnKind::Signed,
        name if name.ends_with("UNSIGNED") => ColumnKind::Unsigned,
        "YEAR" => ColumnKind::Year,
        "FLOAT" | "DOUBLE" => ColumnKind::Float,
        "DECIMAL" => ColumnKind::Decimal,
        "DATE" => ColumnKind::Date,
        "TIME" => ColumnKind::Time,
        "DATETIME" => ColumnKind::DateTime,
        "TIMESTAMP" => ColumnKind::Timestamp,
        "JSON" => ColumnKind::Json,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" | "GEOMETRY" => {
            ColumnKind::Binary
        }
        _ => ColumnKind::Text,
    }
}

fn column_value(row: &MySqlRow, i: usize, type_name: &str) -> Value {
    let decoded = match column_kind(type_name) {
        ColumnKind::Signed => row.try_get::<Option<i64>, _>(i).map(|v| v.map(Value::from)),
        ColumnKind::Unsigned => row.try_get::<Option<u64>, _>(i).map(|v| v.map(Value::from)),
        ColumnKind::Year => row
            .try_get_unchecked::<Option<i64>, _>(i)
            .map(|v| v.map(Value::from)),
        ColumnKind::Float => row
            .try_get::<Option<f64>, _>(i)
            .map(|v| v.map(float_value)),
        ColumnKind::Decimal => row
            .try_get::<Option<BigDecimal>, _>(i)
            .map(|v| v.map(|d| Value::String(d.to_string()))),
        ColumnKind::Date => row
            .try_get::<Option<NaiveDate>, _>(i)
            .map(|v| v.map(|d| Value::String(d.format("%Y-%m-%d").to_string()))),
        ColumnKind::Time => row
            .try_get::<Option<NaiveTime>, _>(i)
            .map(|v| v.map(|t| Value::String(t.format("%H:%M:%S%.f").to_string()))),
        ColumnKind::DateTime => row
            .try_get::<Option<NaiveDateTime>, _>(i)
            .map(|v| v.map(|t| Value::String(t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))),
        ColumnKind::Timestamp => row
            .try_get::<Option<DateTime<Utc>>, _>(i)
            .map(|v| v.map(|t| Value::String(t.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string()))),
        ColumnKind::Json => row.try_get::<Option<Value>, _>(i),
        ColumnKind::Binary => row
            .try_get::<Option<Vec<u8>>, _>(i)
            .map(|v| v.map(|b| Value::String(String::from_utf8_lossy(&b).into_owned()))),
        ColumnKind::Text => row.try_get::<Option<String>, _>(i).map(|v| v.map(Value::String)),
    };

    match decoded {
        Ok(Some(v)) => v,
        Ok(None) => Value::Null,
        Err(e) => {
            tracing::debug!("Falling back for column {} ({}): {}", i, type_name, e);
            fallback_value(row, i)
        }
    }
}

// Try different types if the type-directed decode fails
fn fallback_value(row: &MySqlRow, i: usize) -> Value {
    if let Ok(v) = row.try_get::<i64, _>(i) {
        Value::from(v)
    } else if let Ok(v) = row.try_get::<u64, _>(i) {
        Value::from(v)
    } else if let Ok(v) = row.try_get::<f64, _>(i) {
        float_value(v)
    } else if let Ok(s) = row.try_get::<String, _>(i) {
        Value::String(s)
    } else if let Ok(s) = row.try_get_unchecked::<String, _>(i) {
        // Text-protocol values are raw strings whatever the column type
        Value::String(s)
    } else if let Ok(b) = row.try_get::<Vec<u8>, _>(i) {
        Value::String(String::from_utf8_lossy(&b).into_owned())
    } else {
        Value::Null
    }
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}
