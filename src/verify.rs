//! Post-load sanity queries over a freshly built airports database

use anyhow::{Context, Result};
use rusqlite::types::Value;
use std::path::Path;

use crate::query::open_read_only;

/// The fixed verification battery: (title, SQL)
pub const VERIFICATION_QUERIES: &[(&str, &str)] = &[
    (
        "Sample airports by country",
        "SELECT name, municipality, icao_code, iata_code FROM airports \
         WHERE iso_country = 'GB' AND type = 'large_airport' LIMIT 5",
    ),
    (
        "Airports by type count",
        "SELECT type, COUNT(*) as count FROM airports GROUP BY type ORDER BY count DESC",
    ),
    (
        "Top 5 highest airports",
        "SELECT name, municipality, country_name, elevation_ft FROM airports \
         WHERE elevation_ft IS NOT NULL ORDER BY elevation_ft DESC LIMIT 5",
    ),
    (
        "Countries with most airports",
        "SELECT country_name, COUNT(*) as airport_count FROM airports \
         GROUP BY country_name ORDER BY airport_count DESC LIMIT 10",
    ),
];

/// Full result set of one verification query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub title: &'static str,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl std::fmt::Display for QueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}:", self.title)?;
        write!(f, "{}", "-".repeat(self.title.len()))?;
        for row in &self.rows {
            write!(f, "\n  {}", format_row(row))?;
        }
        Ok(())
    }
}

/// Run every verification query against the database at `db_path`
/// through a new read-only connection.
pub fn verify_database(db_path: &Path) -> Result<Vec<QueryResult>> {
    let conn = open_read_only(db_path)?;

    let mut results = Vec::with_capacity(VERIFICATION_QUERIES.len());
    for &(title, sql) in VERIFICATION_QUERIES {
        let mut stmt = conn
            .prepare(sql)
            .with_context(|| format!("Failed to prepare query: {}", title))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("Failed to run query: {}", title))?;

        results.push(QueryResult {
            title,
            columns,
            rows,
        });
    }

    Ok(results)
}

/// Render a row as a tuple: `('Heathrow', 'London', 83, None)`
pub fn format_row(row: &[Value]) -> String {
    let cells: Vec<String> = row.iter().map(format_value).collect();
    if cells.len() == 1 {
        format!("({},)", cells[0])
    } else {
        format!("({})", cells.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => format!("{:?}", r),
        Value::Text(s) => quote_text(s),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Quote like a Python string literal: single quotes unless the text
/// holds a single quote and no double quote.
fn quote_text(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
