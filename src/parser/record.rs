use anyhow::{bail, Result};
use csv::StringRecord;
use thiserror::Error;

use crate::schema::{Column, ColumnType, TableSchema};

/// A coerced row ready for insertion, values in schema column order
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub values: Vec<SqlValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

/// Why a single record could not be coerced. The loader skips the
/// record and keeps going; every other error aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    #[error("record has no value for column '{column}'")]
    MissingField { column: &'static str },
    #[error("required column '{column}' is empty")]
    EmptyRequired { column: &'static str },
    #[error("invalid integer for column '{column}': {value:?}")]
    InvalidInteger { column: &'static str, value: String },
    #[error("invalid real for column '{column}': {value:?}")]
    InvalidReal { column: &'static str, value: String },
}

/// Maps each schema column to its position in the CSV header
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    positions: Vec<usize>,
}

impl HeaderIndex {
    /// Fails if any schema column is absent from the header.
    pub fn new(headers: &StringRecord, schema: &TableSchema) -> Result<Self> {
        let mut positions = Vec::with_capacity(schema.columns.len());
        let mut missing = Vec::new();

        for col in schema.columns {
            match headers.iter().position(|h| h == col.name) {
                Some(pos) => positions.push(pos),
                None => missing.push(col.name),
            }
        }

        if !missing.is_empty() {
            bail!("CSV header is missing columns: {}", missing.join(", "));
        }

        Ok(Self { positions })
    }
}

/// Coerce one CSV record into a row for the given table schema
pub fn parse_record(
    record: &StringRecord,
    header: &HeaderIndex,
    schema: &TableSchema,
) -> Result<ParsedRow, CoerceError> {
    let mut values = Vec::with_capacity(schema.columns.len());

    for (col, &pos) in schema.columns.iter().zip(&header.positions) {
        let raw = record
            .get(pos)
            .ok_or(CoerceError::MissingField { column: col.name })?;
        values.push(coerce_field(raw, col)?);
    }

    Ok(ParsedRow { values })
}

/// Convert a raw text field into the column's declared type.
///
/// Empty input becomes NULL for nullable columns. Numeric parsing ignores
/// surrounding whitespace, but a whitespace-only value is not empty and
/// fails to parse.
pub fn coerce_field(raw: &str, column: &Column) -> Result<SqlValue, CoerceError> {
    if raw.is_empty() {
        return match (column.nullable, column.col_type) {
            (true, _) => Ok(SqlValue::Null),
            (false, ColumnType::Text) => Ok(SqlValue::Text(String::new())),
            (false, _) => Err(CoerceError::EmptyRequired {
                column: column.name,
            }),
        };
    }

    match column.col_type {
        ColumnType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(SqlValue::Integer)
            .map_err(|_| CoerceError::InvalidInteger {
                column: column.name,
                value: raw.to_string(),
            }),
        ColumnType::Real => raw
            .trim()
            .parse::<f64>()
            .map(SqlValue::Real)
            .map_err(|_| CoerceError::InvalidReal {
                column: column.name,
                value: raw.to_string(),
            }),
        ColumnType::Text => Ok(SqlValue::Text(raw.to_string())),
    }
}

/// Render a raw record as a JSON object keyed by header name, for diagnostics.
/// A repeated header name is keyed `name#<column>` (1-based); fields past the
/// header go under `_extra`.
pub fn describe_record(headers: &StringRecord, record: &StringRecord) -> String {
    use serde_json::Value;

    let mut map = serde_json::Map::new();
    for (i, header) in headers.iter().enumerate() {
        let value = record
            .get(i)
            .map(|s| Value::String(s.to_string()))
            .unwrap_or(Value::Null);
        let key = if map.contains_key(header) {
            format!("{}#{}", header, i + 1)
        } else {
            header.to_string()
        };
        map.insert(key, value);
    }

    let extra: Vec<Value> = record
        .iter()
        .skip(headers.len())
        .map(|s| Value::String(s.to_string()))
        .collect();
    if !extra.is_empty() {
        map.insert("_extra".to_string(), Value::Array(extra));
    }

    Value::Object(map).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AIRPORTS;

    const HEADER: &str = "id,ident,type,name,latitude_deg,longitude_deg,elevation_ft,continent,country_name,iso_country,region_name,iso_region,local_region,municipality,scheduled_service,gps_code,icao_code,iata_code,local_code,home_link,wikipedia_link,keywords,score,last_updated";

    fn record(line: &str) -> StringRecord {
        StringRecord::from(line.split(',').collect::<Vec<_>>())
    }

    fn value<'a>(row: &'a ParsedRow, name: &str) -> &'a SqlValue {
        let idx = AIRPORTS.columns.iter().position(|c| c.name == name).unwrap();
        &row.values[idx]
    }

    #[test]
    fn test_coerce_integer() {
        let col = Column::new("score", ColumnType::Integer);
        assert_eq!(coerce_field("42", &col), Ok(SqlValue::Integer(42)));
        assert_eq!(coerce_field(" -7 ", &col), Ok(SqlValue::Integer(-7)));
        assert_eq!(coerce_field("", &col), Ok(SqlValue::Null));
        assert!(matches!(
            coerce_field("N/A", &col),
            Err(CoerceError::InvalidInteger { column: "score", .. })
        ));
        assert!(coerce_field("12.5", &col).is_err());
        assert!(coerce_field("  ", &col).is_err());
    }

    #[test]
    fn test_coerce_real() {
        let col = Column::new("latitude_deg", ColumnType::Real);
        assert_eq!(coerce_field("51.4706", &col), Ok(SqlValue::Real(51.4706)));
        assert_eq!(coerce_field("-0.461941", &col), Ok(SqlValue::Real(-0.461941)));
        assert_eq!(coerce_field("", &col), Ok(SqlValue::Null));
        assert!(matches!(
            coerce_field("north", &col),
            Err(CoerceError::InvalidReal { .. })
        ));
    }

    #[test]
    fn test_coerce_text() {
        let optional = Column::new("iata_code", ColumnType::Text);
        let required = Column::required("name", ColumnType::Text);
        assert_eq!(coerce_field("", &optional), Ok(SqlValue::Null));
        assert_eq!(coerce_field("", &required), Ok(SqlValue::Text(String::new())));
        assert_eq!(
            coerce_field(" LHR ", &optional),
            Ok(SqlValue::Text(" LHR ".to_string()))
        );
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let id = Column::required("id", ColumnType::Integer);
        assert_eq!(
            coerce_field("", &id),
            Err(CoerceError::EmptyRequired { column: "id" })
        );
    }

    #[test]
    fn test_header_index_missing_columns() {
        let headers = record("id,ident,type,name");
        let err = HeaderIndex::new(&headers, &AIRPORTS).unwrap_err();
        assert!(err.to_string().contains("latitude_deg"));
        assert!(err.to_string().contains("last_updated"));
    }

    #[test]
    fn test_parse_record_any_column_order() {
        let mut names: Vec<&str> = HEADER.split(',').collect();
        names.reverse();
        let headers = StringRecord::from(names.clone());
        let index = HeaderIndex::new(&headers, &AIRPORTS).unwrap();

        let fields: Vec<String> = names
            .iter()
            .map(|n| match *n {
                "id" => "2434".to_string(),
                "ident" => "EGLL".to_string(),
                "type" => "large_airport".to_string(),
                "elevation_ft" => "83".to_string(),
                "iso_country" => "GB".to_string(),
                _ => String::new(),
            })
            .collect();
        let row = parse_record(&StringRecord::from(fields), &index, &AIRPORTS).unwrap();

        assert_eq!(row.values.len(), 24);
        assert_eq!(value(&row, "id"), &SqlValue::Integer(2434));
        assert_eq!(value(&row, "ident"), &SqlValue::Text("EGLL".into()));
        assert_eq!(value(&row, "elevation_ft"), &SqlValue::Integer(83));
        assert_eq!(value(&row, "iso_country"), &SqlValue::Text("GB".into()));
        assert_eq!(value(&row, "name"), &SqlValue::Text(String::new()));
        assert_eq!(value(&row, "last_updated"), &SqlValue::Text(String::new()));
        assert_eq!(value(&row, "municipality"), &SqlValue::Null);
        assert_eq!(value(&row, "latitude_deg"), &SqlValue::Null);
    }

    #[test]
    fn test_parse_record_short_row() {
        let headers = record(HEADER);
        let index = HeaderIndex::new(&headers, &AIRPORTS).unwrap();
        let err = parse_record(&record("1,X,small_airport"), &index, &AIRPORTS).unwrap_err();
        assert_eq!(err, CoerceError::MissingField { column: "name" });
    }

    #[test]
    fn test_describe_record() {
        let headers = record("id,name,score");
        let text = describe_record(&headers, &record("abc,Heathrow"));
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["name"], "Heathrow");
        assert!(json["score"].is_null());
        assert!(json.get("_extra").is_none());
    }

    #[test]
    fn test_describe_record_keeps_every_field() {
        let headers = record("id,name,name");
        let text = describe_record(&headers, &record("1,Heathrow,LHR,extra1,extra2"));
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["name"], "Heathrow");
        assert_eq!(json["name#3"], "LHR");
        assert_eq!(json["_extra"], serde_json::json!(["extra1", "extra2"]));
    }
}
