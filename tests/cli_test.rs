//! Tests that run the compiled binary and check its exit status and
//! console output.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use airports_to_sqlite::schema::AIRPORTS;

fn binary() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_airports-to-sqlite"));
    command.env("RUST_LOG", "off");
    command
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    binary()
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to run binary")
}

/// Two-airport CSV with every schema column
fn write_csv(path: &Path) {
    let header = AIRPORTS.column_names();
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV");
    writer.write_record(&header).unwrap();
    for (id, ident, name) in [("2434", "EGLL", "London Heathrow Airport"), ("2212", "EDDM", "Munich Airport")] {
        let row: Vec<&str> = header
            .iter()
            .map(|col| match *col {
                "id" => id,
                "ident" | "icao_code" => ident,
                "type" => "large_airport",
                "name" => name,
                "scheduled_service" => "1",
                "last_updated" => "2024-01-01T00:00:00+00:00",
                _ => "",
            })
            .collect();
        writer.write_record(&row).unwrap();
    }
    writer.flush().unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_missing_input_reports_one_error_line() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["-i", "missing.csv", "-o", "out.db"]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let stderr = stderr(&output);
    let lines: Vec<&str> = stderr.lines().collect();
    assert_eq!(lines.len(), 1, "stderr: {}", stderr);
    assert!(lines[0].starts_with("❌ Error:"), "stderr: {}", stderr);
    assert!(lines[0].contains("missing.csv"));

    assert!(!stdout(&output).contains("✅"));
    assert!(!dir.path().join("out.db").exists());
}

#[test]
fn test_bare_invocation_converts_default_paths() {
    let dir = TempDir::new().unwrap();
    write_csv(&dir.path().join("eu-airports.csv"));

    let output = run_in(dir.path(), &[]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout.contains("=== Database Creation Complete ==="));
    assert!(stdout.contains("=== Testing Database ==="));
    assert!(stdout
        .lines()
        .any(|l| l == "✅ Successfully converted CSV to SQLite database: eu-airports.db"));
    assert!(dir.path().join("eu-airports.db").exists());
}

#[test]
fn test_top_level_options_and_lookup() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("in.csv");
    let db: PathBuf = dir.path().join("out.db");
    write_csv(&csv);

    let output = run_in(
        dir.path(),
        &["-i", "in.csv", "-o", "out.db", "--skip-verify"],
    );
    let text = stdout(&output);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!text.contains("=== Testing Database ==="));
    assert!(text.contains("✅ Successfully converted CSV to SQLite database: out.db"));
    assert!(db.exists());

    let lookup = run_in(dir.path(), &["lookup", "egll", "--db", "out.db", "--json"]);
    assert!(lookup.status.success());
    let json: serde_json::Value = serde_json::from_slice(&lookup.stdout).unwrap();
    assert_eq!(json[0]["name"], "London Heathrow Airport");

    let suggest = run_in(dir.path(), &["suggest", "ED", "--db", "out.db"]);
    assert!(suggest.status.success());
    assert_eq!(stdout(&suggest).trim(), "EDDM");
}

#[test]
fn test_query_on_missing_database_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_in(dir.path(), &["stats", "--db", "missing.db"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("❌ Error:"));
}
