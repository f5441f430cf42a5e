//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Bulk insert, predicate reads, predicate updates and deletes on `users`.
//! - Explicit `LEFT JOIN` read model resolving role/position/department names.
//!
//! # Invariants
//! - Bulk insert validates every payload before the first SQL write.
//! - Update/delete return the affected row count; zero is not an error.
//! - Unresolved or absent references surface as `None` names, never errors.

use crate::db::with_savepoint;
use crate::model::lookup::{LookupId, LookupKind};
use crate::model::user::{NewUser, User, UserId, UserPatch};
use crate::repo::predicate::{Predicate, UserColumn, UserQuery};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::Serialize;

const USER_COLUMNS_SQL: &str = "id, name, email, role_id, position_id, department_id";

const USER_DETAILS_SELECT_SQL: &str = "SELECT
    u.id AS id,
    u.name AS name,
    u.email AS email,
    u.role_id AS role_id,
    u.position_id AS position_id,
    u.department_id AS department_id,
    r.name AS role_name,
    p.name AS position_name,
    d.name AS department_name
FROM users AS u
LEFT JOIN roles AS r ON r.id = u.role_id
LEFT JOIN positions AS p ON p.id = u.position_id
LEFT JOIN departments AS d ON d.id = u.department_id";

/// User row joined with the names of its referenced lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub role_name: Option<String>,
    pub position_name: Option<String>,
    pub department_name: Option<String>,
}

/// Repository interface for user operations.
pub trait UserRepository {
    /// Inserts all users atomically and returns assigned ids in input order.
    fn insert_users(&self, users: &[NewUser]) -> RepoResult<Vec<UserId>>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_users(&self, query: &UserQuery) -> RepoResult<Vec<User>>;
    fn find_user_details(&self, query: &UserQuery) -> RepoResult<Vec<UserDetails>>;
    /// Users referencing lookup row `id` of relation `kind`, by `id ASC`.
    fn find_by_reference(&self, kind: LookupKind, id: LookupId) -> RepoResult<Vec<User>>;
    /// Applies `patch` to every row matching `filter`; returns affected rows.
    fn update_users(&self, patch: &UserPatch, filter: &Predicate) -> RepoResult<usize>;
    /// Deletes every row matching `filter`; returns deleted rows.
    fn delete_users(&self, filter: &Predicate) -> RepoResult<usize>;
    fn count_users(&self) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_users(&self, users: &[NewUser]) -> RepoResult<Vec<UserId>> {
        for user in users {
            user.validate()?;
        }

        with_savepoint(self.conn, "user_insert", || -> RepoResult<Vec<UserId>> {
            let mut stmt = self.conn.prepare(
                "INSERT INTO users (
                    name,
                    email,
                    role_id,
                    position_id,
                    department_id
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            let mut ids = Vec::with_capacity(users.len());
            for user in users {
                stmt.execute(params![
                    user.name.as_str(),
                    user.email.as_str(),
                    user.role_id,
                    user.position_id,
                    user.department_id,
                ])?;
                ids.push(self.conn.last_insert_rowid());
            }
            Ok(ids)
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS_SQL} FROM users WHERE id = ?1;"
        ))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn find_users(&self, query: &UserQuery) -> RepoResult<Vec<User>> {
        let mut binds = Vec::new();
        let sql = format!(
            "SELECT {USER_COLUMNS_SQL} FROM users{}{};",
            query.where_clause("", &mut binds),
            query.order_clause("")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn find_user_details(&self, query: &UserQuery) -> RepoResult<Vec<UserDetails>> {
        let mut binds = Vec::new();
        let sql = format!(
            "{USER_DETAILS_SELECT_SQL}{}{};",
            query.where_clause("u.", &mut binds),
            query.order_clause("u.")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut details = Vec::new();
        while let Some(row) = rows.next()? {
            details.push(UserDetails {
                user: parse_user_row(row)?,
                role_name: row.get("role_name")?,
                position_name: row.get("position_name")?,
                department_name: row.get("department_name")?,
            });
        }

        Ok(details)
    }

    fn find_by_reference(&self, kind: LookupKind, id: LookupId) -> RepoResult<Vec<User>> {
        let column = UserColumn::reference_to(kind).ok_or(RepoError::NoReference(kind))?;
        self.find_users(&UserQuery::filtered(Predicate::eq(column, id)))
    }

    fn update_users(&self, patch: &UserPatch, filter: &Predicate) -> RepoResult<usize> {
        patch.validate()?;
        if patch.is_empty() {
            return Ok(0);
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut binds: Vec<Value> = Vec::new();
        if let Some(name) = &patch.name {
            assignments.push("name = ?");
            binds.push(Value::Text(name.clone()));
        }
        if let Some(email) = &patch.email {
            assignments.push("email = ?");
            binds.push(Value::Text(email.clone()));
        }
        if let Some(role_id) = patch.role_id {
            assignments.push("role_id = ?");
            binds.push(optional_id(role_id));
        }
        if let Some(position_id) = patch.position_id {
            assignments.push("position_id = ?");
            binds.push(optional_id(position_id));
        }
        if let Some(department_id) = patch.department_id {
            assignments.push("department_id = ?");
            binds.push(optional_id(department_id));
        }

        let mut sql = format!("UPDATE users SET {} WHERE ", assignments.join(", "));
        filter.render("", &mut sql, &mut binds);
        sql.push(';');

        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        Ok(changed)
    }

    fn delete_users(&self, filter: &Predicate) -> RepoResult<usize> {
        let mut binds = Vec::new();
        let mut sql = String::from("DELETE FROM users WHERE ");
        filter.render("", &mut sql, &mut binds);
        sql.push(';');

        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        Ok(changed)
    }

    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        role_id: row.get("role_id")?,
        position_id: row.get("position_id")?,
        department_id: row.get("department_id")?,
    })
}

fn optional_id(value: Option<LookupId>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}
