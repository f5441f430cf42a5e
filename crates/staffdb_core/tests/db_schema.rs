use staffdb_core::db::schema::{current_version, schema_version, table_names};
use staffdb_core::db::{open_db, open_db_in_memory, DbError};
use staffdb_core::{initialize_schema, seed, RepoError, Relations};
use rusqlite::Connection;

#[test]
fn initialize_schema_creates_all_relations() {
    let conn = open_db_in_memory().unwrap();
    initialize_schema(&conn).unwrap();

    assert_eq!(current_version(&conn).unwrap(), schema_version());
    for table in ["positions", "roles", "departments", "projects", "users"] {
        assert_table_exists(&conn, table);
    }
    assert_eq!(table_names().len(), 5);
}

#[test]
fn initialize_schema_destroys_previous_rows() {
    let conn = open_db_in_memory().unwrap();
    initialize_schema(&conn).unwrap();
    {
        let relations = Relations::try_new(&conn).unwrap();
        seed(&relations).unwrap();
    }
    assert_eq!(row_count(&conn, "users"), 5);

    initialize_schema(&conn).unwrap();
    for table in table_names() {
        assert_eq!(row_count(&conn, table), 0, "{table} should be empty");
    }
}

#[test]
fn ids_restart_from_one_after_reset() {
    let conn = open_db_in_memory().unwrap();
    initialize_schema(&conn).unwrap();
    {
        let relations = Relations::try_new(&conn).unwrap();
        seed(&relations).unwrap();
    }

    initialize_schema(&conn).unwrap();
    conn.execute("INSERT INTO roles (name) VALUES ('x');", [])
        .unwrap();
    assert_eq!(conn.last_insert_rowid(), 1);
}

#[test]
fn file_database_is_reset_on_every_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staffdb.sqlite");

    let conn_first = open_db(&path).unwrap();
    initialize_schema(&conn_first).unwrap();
    {
        let relations = Relations::try_new(&conn_first).unwrap();
        seed(&relations).unwrap();
    }
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(row_count(&conn_second, "users"), 5);
    initialize_schema(&conn_second).unwrap();
    assert_eq!(row_count(&conn_second, "users"), 0);
}

#[test]
fn relations_require_initialized_schema() {
    let conn = open_db_in_memory().unwrap();

    let err = Relations::try_new(&conn).err().unwrap();
    match err {
        RepoError::SchemaNotInitialized { found, expected } => {
            assert_eq!(found, 0);
            assert_eq!(expected, schema_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unreachable_storage_is_a_connect_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("db.sqlite");

    let err = open_db(&path).unwrap_err();
    assert!(err.is_connectivity(), "unexpected error: {err}");
    assert!(matches!(err, DbError::Connect { mode: "file", .. }));
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
