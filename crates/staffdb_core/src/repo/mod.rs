//! Repository layer: per-relation data access over SQLite.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for lookups and users.
//! - Isolate SQL text, binding and row parsing from services.
//! - Classify SQLite constraint failures into `RepoError::Constraint`.
//!
//! # Invariants
//! - Write paths validate records before any SQL mutation.
//! - Bulk inserts are all-or-nothing.
//! - Update/delete matching zero rows is not an error (count `0`).

use crate::db::DbError;
use crate::model::lookup::LookupKind;
use crate::model::ValidationError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod lookup_repo;
pub mod predicate;
pub mod relations;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    /// UNIQUE, NOT NULL, CHECK or FOREIGN KEY failure reported by SQLite.
    Constraint { message: String },
    /// Connection has not been through `initialize_schema`.
    SchemaNotInitialized { found: u32, expected: u32 },
    /// Users carry no reference column for this relation.
    NoReference(LookupKind),
    Db(DbError),
    InvalidData(String),
}

impl RepoError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Constraint { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Constraint { message } => write!(f, "constraint violation: {message}"),
            Self::SchemaNotInitialized { found, expected } => write!(
                f,
                "schema version {found} found, expected {expected}; run initialize_schema first"
            ),
            Self::NoReference(kind) => {
                write!(f, "users do not reference `{}`", kind.table())
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => err.source(),
            Self::Db(err) => err.source(),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(ffi_err, message)
                if ffi_err.code == ErrorCode::ConstraintViolation =>
            {
                Self::Constraint {
                    message: message.unwrap_or_else(|| ffi_err.to_string()),
                }
            }
            other => Self::Db(DbError::Sqlite(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RepoError;
    use crate::db::open_db_in_memory;

    #[test]
    fn unique_failure_maps_to_constraint() {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE);")
            .unwrap();
        conn.execute("INSERT INTO t (name) VALUES ('a');", [])
            .unwrap();

        let err: RepoError = conn
            .execute("INSERT INTO t (name) VALUES ('a');", [])
            .unwrap_err()
            .into();
        assert!(err.is_constraint_violation(), "unexpected error: {err}");
    }

    #[test]
    fn syntax_error_is_not_a_constraint() {
        let conn = open_db_in_memory().unwrap();
        let err: RepoError = conn.execute_batch("SELEC 1;").unwrap_err().into();
        assert!(matches!(err, RepoError::Db(_)));
    }
}
