//! Caller-side SQLite bootstrap for the parcel store.
//!
//! # Responsibility
//! - Open SQLite connections that are ready for `SqliteParcelStore`.
//! - Create the `parcel` table when it is missing.
//!
//! # Invariants
//! - Bootstrap is idempotent; reopening an existing file leaves rows intact.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening a database or running a statement on it.
#[derive(Debug)]
pub enum DbError {
    /// The database file or in-memory handle could not be opened.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// The `parcel` schema could not be created.
    Schema(rusqlite::Error),
    /// Statement-level failure (I/O, constraint, locked database, ...).
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => write!(f, "cannot open {target}: {source}"),
            Self::Schema(err) => write!(f, "cannot create parcel schema: {err}"),
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Schema(err) | Self::Sqlite(err) => Some(err),
        }
    }
}
