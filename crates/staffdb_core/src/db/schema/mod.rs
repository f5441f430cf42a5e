//! Schema registry: relation DDL and the drop-and-recreate entry point.
//!
//! # Responsibility
//! - Own the DDL for `positions`, `roles`, `departments`, `projects`, `users`.
//! - Reset storage to an empty, current schema on every start.
//!
//! # Invariants
//! - `initialize_schema` is destructive: prior rows never survive it.
//! - Tables are dropped dependents-first and created parents-first.
//! - `PRAGMA user_version` equals `schema_version()` after success.

use crate::db::{with_savepoint, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct SchemaFile {
    version: u32,
    sql: &'static str,
}

const SCHEMA_FILES: &[SchemaFile] = &[SchemaFile {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Relations in creation order. Drop order is the reverse.
const TABLES: &[&str] = &["positions", "roles", "departments", "projects", "users"];

/// Returns the schema version compiled into this binary.
pub fn schema_version() -> u32 {
    SCHEMA_FILES.last().map_or(0, |file| file.version)
}

/// Returns managed relation names in creation order.
pub fn table_names() -> &'static [&'static str] {
    TABLES
}

/// Drops every managed relation and recreates it empty.
///
/// # Side effects
/// - Destroys all rows in the five relations.
/// - Emits `schema_init` logging events.
pub fn initialize_schema(conn: &Connection) -> DbResult<()> {
    let started_at = Instant::now();
    info!("event=schema_init module=db status=start");

    let result = with_savepoint(conn, "schema_init", || -> DbResult<()> {
        for table in TABLES.iter().rev() {
            conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
        }
        for file in SCHEMA_FILES {
            conn.execute_batch(file.sql)?;
        }
        conn.execute_batch(&format!("PRAGMA user_version = {};", schema_version()))?;
        Ok(())
    });

    match &result {
        Ok(()) => info!(
            "event=schema_init module=db status=ok version={} tables={} duration_ms={}",
            schema_version(),
            TABLES.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=schema_init module=db status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }

    result
}

/// Reads `PRAGMA user_version` from the connection.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
