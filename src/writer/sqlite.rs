use anyhow::{Context, Result};
use csv::StringRecord;
use rusqlite::Connection;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::schema_gen::{generate_create_table, generate_indexes, generate_insert};
use crate::parser::{describe_record, parse_record, CsvSource, ParsedRow};
use crate::schema::{TableSchema, AIRPORTS};
use crate::ui::{Phase, Ui};

const BATCH_SIZE: usize = 1000;

/// Sidecar files SQLite may leave next to a database
const SIDECAR_SUFFIXES: &[&str] = &["-wal", "-shm", "-journal"];

/// Record counts from a single import
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImportStats {
    pub inserted: u64,
    pub skipped: u64,
}

/// Statistics displayed after a load. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub db_path: PathBuf,
    pub total_records: u64,
    pub skipped_records: u64,
    pub unique_countries: u64,
    pub large_airports: u64,
    pub scheduled_airports: u64,
    pub elapsed: Duration,
}

impl std::fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Database Creation Complete ===")?;
        writeln!(f, "Database file: {}", self.db_path.display())?;
        writeln!(f, "Total records imported: {}", self.total_records)?;
        writeln!(f, "Records skipped: {}", self.skipped_records)?;
        writeln!(f, "Unique countries: {}", self.unique_countries)?;
        writeln!(f, "Large airports: {}", self.large_airports)?;
        writeln!(f, "Airports with scheduled service: {}", self.scheduled_airports)?;
        write!(f, "Elapsed: {:.1}s", self.elapsed.as_secs_f64())
    }
}

pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    pub fn new(db_path: &Path, ui: &mut impl Ui) -> Result<Self> {
        // Remove existing database if present
        if db_path.exists() {
            std::fs::remove_file(db_path).context("Failed to remove existing database")?;
            ui.log(format!("Removed existing database: {}", db_path.display()));
        }
        for suffix in SIDECAR_SUFFIXES {
            let sidecar = sidecar_path(db_path, suffix);
            if sidecar.exists() {
                std::fs::remove_file(&sidecar)
                    .with_context(|| format!("Failed to remove stale {:?}", sidecar))?;
            }
        }

        let conn = Connection::open(db_path).context("Failed to create database")?;

        // Larger page cache for bulk insert; journal and sync stay at their
        // defaults so a committed load survives power loss
        conn.execute_batch("PRAGMA cache_size = -64000;")?;

        Ok(Self { conn })
    }

    pub fn create_table(&self, schema: &TableSchema, ui: &mut impl Ui) -> Result<()> {
        let sql = generate_create_table(schema);
        self.conn
            .execute(&sql, [])
            .with_context(|| format!("Failed to create table: {}", schema.name))?;
        ui.log(format!("Created {} table", schema.name));
        Ok(())
    }

    /// Import every record of `source`, then build the schema's indexes.
    /// Inserts and index creation commit as one transaction.
    pub fn import_csv(
        &mut self,
        schema: &TableSchema,
        mut source: CsvSource,
        ui: &mut impl Ui,
    ) -> Result<ImportStats> {
        let insert_sql = generate_insert(schema);

        ui.set_phase(Phase::Loading);
        ui.log(format!("Reading {}", source.path().display()));

        let tx = self.conn.transaction()?;
        let mut stats = ImportStats::default();
        let mut batch: Vec<ParsedRow> = Vec::with_capacity(BATCH_SIZE);
        let mut record = StringRecord::new();
        let mut ordinal: u64 = 0;

        loop {
            ordinal += 1;
            if !source.next_record(&mut record, ordinal)? {
                break;
            }

            match parse_record(&record, source.index(), schema) {
                Ok(row) => batch.push(row),
                Err(err) => {
                    stats.skipped += 1;
                    let raw = describe_record(source.headers(), &record);
                    ui.record_skipped(ordinal, &err, &raw);
                    continue;
                }
            }

            if batch.len() >= BATCH_SIZE {
                insert_batch(&tx, &insert_sql, &batch)?;
                stats.inserted += batch.len() as u64;
                ui.set_progress(stats.inserted);
                batch.clear();
            }
        }

        // Insert remaining batch
        if !batch.is_empty() {
            insert_batch(&tx, &insert_sql, &batch)?;
            stats.inserted += batch.len() as u64;
        }

        ui.set_phase(Phase::Indexing);
        let indexes = generate_indexes(schema);
        for index_sql in &indexes {
            tx.execute(index_sql, [])
                .with_context(|| format!("Failed to create index for: {}", schema.name))?;
        }
        ui.log(format!("Created {} indexes for optimized queries", indexes.len()));

        tx.commit().context("Failed to commit import")?;

        Ok(stats)
    }

    /// Compute the post-load statistics for the airports table
    pub fn summarize(&self, stats: ImportStats, db_path: &Path, start: Instant) -> Result<LoadSummary> {
        let table = AIRPORTS.name;
        let count = |sql: String| -> Result<u64> {
            let n: i64 = self
                .conn
                .query_row(&sql, [], |row| row.get(0))
                .with_context(|| format!("Failed to run summary query: {}", sql))?;
            Ok(n as u64)
        };

        Ok(LoadSummary {
            db_path: db_path.to_path_buf(),
            total_records: count(format!("SELECT COUNT(*) FROM {}", table))?,
            skipped_records: stats.skipped,
            unique_countries: count(format!("SELECT COUNT(DISTINCT country_name) FROM {}", table))?,
            large_airports: count(format!(
                "SELECT COUNT(*) FROM {} WHERE type = 'large_airport'",
                table
            ))?,
            scheduled_airports: count(format!(
                "SELECT COUNT(*) FROM {} WHERE scheduled_service = 1",
                table
            ))?,
            elapsed: start.elapsed(),
        })
    }

    /// Finalize and close the database
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close database")?;
        Ok(())
    }
}

fn sidecar_path(db_path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(db_path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Insert a batch of rows into the database
fn insert_batch(tx: &rusqlite::Transaction, sql: &str, batch: &[ParsedRow]) -> Result<()> {
    let mut stmt = tx.prepare_cached(sql)?;

    for row in batch {
        for (idx, value) in row.values.iter().enumerate() {
            value.bind_to(idx + 1, &mut stmt)?;
        }
        stmt.raw_execute().context("Failed to insert row")?;
    }

    Ok(())
}

/// Convert the airports CSV at `input` into a fresh SQLite database at `output_db`
pub fn convert_to_sqlite(input: &Path, output_db: &Path, ui: &mut impl Ui) -> Result<LoadSummary> {
    let start = Instant::now();

    // Open and check the input before touching any existing database
    let source = CsvSource::open(input, &AIRPORTS)?;

    let mut writer = SqliteWriter::new(output_db, ui)?;
    writer.create_table(&AIRPORTS, ui)?;

    let stats = writer.import_csv(&AIRPORTS, source, ui)?;
    let summary = writer.summarize(stats, output_db, start)?;

    writer.finalize()?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SilentUi;

    #[test]
    fn test_sidecar_path() {
        let path = Path::new("/tmp/eu-airports.db");
        assert_eq!(
            sidecar_path(path, "-wal"),
            PathBuf::from("/tmp/eu-airports.db-wal")
        );
    }

    #[test]
    fn test_writer_keeps_durable_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let writer = SqliteWriter::new(&dir.path().join("out.db"), &mut SilentUi::new()).unwrap();

        let synchronous: i64 = writer
            .conn
            .pragma_query_value(None, "synchronous", |row| row.get(0))
            .unwrap();
        let journal_mode: String = writer
            .conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        let cache_size: i64 = writer
            .conn
            .pragma_query_value(None, "cache_size", |row| row.get(0))
            .unwrap();

        // FULL
        assert_eq!(synchronous, 2);
        assert_eq!(journal_mode, "delete");
        assert_eq!(cache_size, -64000);
    }

    #[test]
    fn test_summary_display() {
        let summary = LoadSummary {
            db_path: PathBuf::from("eu-airports.db"),
            total_records: 2,
            skipped_records: 1,
            unique_countries: 1,
            large_airports: 1,
            scheduled_airports: 0,
            elapsed: Duration::from_millis(1500),
        };
        let text = summary.to_string();
        assert!(text.starts_with("=== Database Creation Complete ==="));
        assert!(text.contains("Total records imported: 2"));
        assert!(text.contains("Records skipped: 1"));
        assert!(text.ends_with("Elapsed: 1.5s"));
    }
}
