//! Explicit handle set over the five relations of one connection.
//!
//! Built once per connection after `initialize_schema` and passed to the
//! seed loader and query runner.

use crate::db::schema::{current_version, schema_version};
use crate::model::lookup::LookupKind;
use crate::repo::lookup_repo::SqliteLookupRepository;
use crate::repo::user_repo::SqliteUserRepository;
use crate::repo::{RepoError, RepoResult};
use rusqlite::Connection;

pub struct Relations<'conn> {
    conn: &'conn Connection,
    pub positions: SqliteLookupRepository<'conn>,
    pub roles: SqliteLookupRepository<'conn>,
    pub departments: SqliteLookupRepository<'conn>,
    pub projects: SqliteLookupRepository<'conn>,
    pub users: SqliteUserRepository<'conn>,
}

impl<'conn> Relations<'conn> {
    /// Binds repositories to a connection whose schema is current.
    ///
    /// # Errors
    /// - `RepoError::SchemaNotInitialized` when `initialize_schema` has not
    ///   run on this connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let found = current_version(conn)?;
        let expected = schema_version();
        if found != expected {
            return Err(RepoError::SchemaNotInitialized { found, expected });
        }

        Ok(Self {
            conn,
            positions: SqliteLookupRepository::new(conn, LookupKind::Position),
            roles: SqliteLookupRepository::new(conn, LookupKind::Role),
            departments: SqliteLookupRepository::new(conn, LookupKind::Department),
            projects: SqliteLookupRepository::new(conn, LookupKind::Project),
            users: SqliteUserRepository::new(conn),
        })
    }

    pub fn lookup(&self, kind: LookupKind) -> &SqliteLookupRepository<'conn> {
        match kind {
            LookupKind::Position => &self.positions,
            LookupKind::Role => &self.roles,
            LookupKind::Department => &self.departments,
            LookupKind::Project => &self.projects,
        }
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }
}
