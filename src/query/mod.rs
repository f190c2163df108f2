pub mod airport;
pub mod fuzzy;
pub mod lookup;

pub use airport::*;
pub use fuzzy::FuzzyMatch;
pub use lookup::*;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Open an existing database without write access
pub fn open_read_only(db_path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open database: {:?}", db_path))
}
