//! SQLite storage bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for staffdb.
//! - Verify storage is reachable before any schema work starts.
//! - Provide the savepoint helper used for atomic bulk writes.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Callers must run `schema::initialize_schema` before touching relations.

use log::warn;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Storage could not be opened or did not answer the liveness probe.
    Connect {
        mode: &'static str,
        source: rusqlite::Error,
    },
    Sqlite(rusqlite::Error),
}

impl DbError {
    /// Returns true when this error means storage was never reachable.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect { mode, .. } => {
                write!(f, "database unreachable (mode={mode})")
            }
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connect { source, .. } => Some(source),
            Self::Sqlite(err) => err.source(),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Runs `body` inside a named savepoint.
///
/// Works both at top level (the savepoint opens a transaction) and nested
/// inside an outer savepoint. On `Err` every write made by `body` is rolled
/// back before the error is returned.
pub fn with_savepoint<T, E, F>(conn: &Connection, name: &str, body: F) -> Result<T, E>
where
    E: From<rusqlite::Error>,
    F: FnOnce() -> Result<T, E>,
{
    conn.execute_batch(&format!("SAVEPOINT {name};"))?;

    match body() {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE {name};"))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) =
                conn.execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name};"))
            {
                warn!(
                    "event=savepoint_rollback module=db status=error savepoint={} error={}",
                    name, rollback_err
                );
            }
            Err(err)
        }
    }
}
