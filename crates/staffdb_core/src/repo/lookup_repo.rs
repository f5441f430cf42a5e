//! Lookup repository contracts and SQLite implementation.
//!
//! One implementation serves positions, roles, departments and projects;
//! the bound `LookupKind` selects the table.

use crate::db::with_savepoint;
use crate::model::lookup::{validate_lookup_name, LookupId, LookupKind, LookupRecord};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

/// Repository interface for one lookup relation.
pub trait LookupRepository {
    /// Inserts all names atomically and returns assigned ids in input order.
    fn insert_names<S: AsRef<str>>(&self, names: &[S]) -> RepoResult<Vec<LookupId>>;
    fn get(&self, id: LookupId) -> RepoResult<Option<LookupRecord>>;
    /// Lists every row ordered by `id ASC`.
    fn list(&self) -> RepoResult<Vec<LookupRecord>>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed lookup repository.
pub struct SqliteLookupRepository<'conn> {
    conn: &'conn Connection,
    kind: LookupKind,
}

impl<'conn> SqliteLookupRepository<'conn> {
    pub fn new(conn: &'conn Connection, kind: LookupKind) -> Self {
        Self { conn, kind }
    }
}

impl LookupRepository for SqliteLookupRepository<'_> {
    fn insert_names<S: AsRef<str>>(&self, names: &[S]) -> RepoResult<Vec<LookupId>> {
        for name in names {
            validate_lookup_name(name.as_ref())?;
        }

        let table = self.kind.table();
        with_savepoint(self.conn, "lookup_insert", || -> RepoResult<Vec<LookupId>> {
            let mut stmt = self
                .conn
                .prepare(&format!("INSERT INTO {table} (name) VALUES (?1);"))?;
            let mut ids = Vec::with_capacity(names.len());
            for name in names {
                stmt.execute(params![name.as_ref()])?;
                ids.push(self.conn.last_insert_rowid());
            }
            Ok(ids)
        })
    }

    fn get(&self, id: LookupId) -> RepoResult<Option<LookupRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name FROM {} WHERE id = ?1;",
            self.kind.table()
        ))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_lookup_row(row)?));
        }

        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<LookupRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name FROM {} ORDER BY id ASC;",
            self.kind.table()
        ))?;

        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_lookup_row(row)?);
        }

        Ok(records)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", self.kind.table()),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn parse_lookup_row(row: &Row<'_>) -> RepoResult<LookupRecord> {
    Ok(LookupRecord {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}
