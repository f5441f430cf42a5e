//! Predicate and ordering builder for user reads, updates and deletes.
//!
//! # Responsibility
//! - Express equality, set-membership, inclusive range, substring match and
//!   AND/OR composition over `users` columns.
//! - Render predicates into parameterized SQL with positional binds.
//!
//! # Invariants
//! - Values are always bound, never spliced into SQL text.
//! - Substring needles are matched literally (`%`, `_` and `\` escaped).
//! - An empty `In`/`Or` matches nothing; an empty `And` matches everything.

use crate::model::lookup::LookupKind;
use rusqlite::types::Value;

/// Filterable/sortable `users` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    Id,
    Name,
    Email,
    RoleId,
    PositionId,
    DepartmentId,
}

impl UserColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::RoleId => "role_id",
            Self::PositionId => "position_id",
            Self::DepartmentId => "department_id",
        }
    }

    /// Reference column pointing at `kind`, if users carry one.
    pub fn reference_to(kind: LookupKind) -> Option<Self> {
        match kind {
            LookupKind::Role => Some(Self::RoleId),
            LookupKind::Position => Some(Self::PositionId),
            LookupKind::Department => Some(Self::DepartmentId),
            LookupKind::Project => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Row selection condition over `users`.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(UserColumn, Value),
    In(UserColumn, Vec<Value>),
    /// Inclusive on both ends.
    Between(UserColumn, Value, Value),
    Contains(UserColumn, String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: UserColumn, value: impl Into<Value>) -> Self {
        Self::Eq(column, value.into())
    }

    pub fn in_set<I, V>(column: UserColumn, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In(column, values.into_iter().map(Into::into).collect())
    }

    pub fn between(column: UserColumn, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::Between(column, low.into(), high.into())
    }

    pub fn contains(column: UserColumn, needle: impl Into<String>) -> Self {
        Self::Contains(column, needle.into())
    }

    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::And(predicates.into_iter().collect())
    }

    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Or(predicates.into_iter().collect())
    }

    /// Appends this predicate as SQL to `sql`, pushing binds in order.
    ///
    /// `qualifier` prefixes every column (e.g. `"u."`), or `""` for none.
    pub fn render(&self, qualifier: &str, sql: &mut String, binds: &mut Vec<Value>) {
        match self {
            Self::Eq(column, Value::Null) => {
                sql.push_str(&format!("{qualifier}{} IS NULL", column.as_sql()));
            }
            Self::Eq(column, value) => {
                sql.push_str(&format!("{qualifier}{} = ?", column.as_sql()));
                binds.push(value.clone());
            }
            Self::In(_, values) if values.is_empty() => sql.push_str("0 = 1"),
            Self::In(column, values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                sql.push_str(&format!(
                    "{qualifier}{} IN ({placeholders})",
                    column.as_sql()
                ));
                binds.extend(values.iter().cloned());
            }
            Self::Between(column, low, high) => {
                sql.push_str(&format!("{qualifier}{} BETWEEN ? AND ?", column.as_sql()));
                binds.push(low.clone());
                binds.push(high.clone());
            }
            Self::Contains(column, needle) => {
                sql.push_str(&format!("{qualifier}{} LIKE ? ESCAPE '\\'", column.as_sql()));
                binds.push(Value::Text(format!("%{}%", escape_like(needle))));
            }
            Self::And(parts) => render_group(parts, " AND ", "1 = 1", qualifier, sql, binds),
            Self::Or(parts) => render_group(parts, " OR ", "0 = 1", qualifier, sql, binds),
        }
    }
}

fn render_group(
    parts: &[Predicate],
    joiner: &str,
    empty: &str,
    qualifier: &str,
    sql: &mut String,
    binds: &mut Vec<Value>,
) {
    if parts.is_empty() {
        sql.push_str(empty);
        return;
    }

    sql.push('(');
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            sql.push_str(joiner);
        }
        part.render(qualifier, sql, binds);
    }
    sql.push(')');
}

/// Escapes LIKE wildcards so `needle` matches literally under `ESCAPE '\'`.
pub(crate) fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Filter plus ordering for user reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserQuery {
    pub filter: Option<Predicate>,
    /// Applied in order. Falls back to `id ASC` when empty.
    pub order_by: Vec<(UserColumn, SortDirection)>,
}

impl UserQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(predicate: Predicate) -> Self {
        Self {
            filter: Some(predicate),
            order_by: Vec::new(),
        }
    }

    pub fn order_by(mut self, column: UserColumn, direction: SortDirection) -> Self {
        self.order_by.push((column, direction));
        self
    }

    pub(crate) fn where_clause(&self, qualifier: &str, binds: &mut Vec<Value>) -> String {
        match &self.filter {
            Some(predicate) => {
                let mut sql = String::from(" WHERE ");
                predicate.render(qualifier, &mut sql, binds);
                sql
            }
            None => String::new(),
        }
    }

    pub(crate) fn order_clause(&self, qualifier: &str) -> String {
        if self.order_by.is_empty() {
            return format!(" ORDER BY {qualifier}id ASC");
        }

        let terms: Vec<String> = self
            .order_by
            .iter()
            .map(|(column, direction)| {
                format!("{qualifier}{} {}", column.as_sql(), direction.as_sql())
            })
            .collect();
        format!(" ORDER BY {}", terms.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_like, Predicate, SortDirection, UserColumn, UserQuery};
    use rusqlite::types::Value;

    fn render(predicate: &Predicate) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut binds = Vec::new();
        predicate.render("", &mut sql, &mut binds);
        (sql, binds)
    }

    #[test]
    fn conjunction_renders_with_ordered_binds() {
        let predicate = Predicate::and([
            Predicate::eq(UserColumn::RoleId, 3),
            Predicate::eq(UserColumn::DepartmentId, 4),
        ]);
        let (sql, binds) = render(&predicate);
        assert_eq!(sql, "(role_id = ? AND department_id = ?)");
        assert_eq!(binds, vec![Value::Integer(3), Value::Integer(4)]);
    }

    #[test]
    fn nested_groups_keep_parentheses() {
        let predicate = Predicate::or([
            Predicate::eq(UserColumn::DepartmentId, 1),
            Predicate::and([
                Predicate::between(UserColumn::Id, 1, 3),
                Predicate::in_set(UserColumn::RoleId, [2, 5]),
            ]),
        ]);
        let (sql, binds) = render(&predicate);
        assert_eq!(
            sql,
            "(department_id = ? OR (id BETWEEN ? AND ? AND role_id IN (?, ?)))"
        );
        assert_eq!(binds.len(), 5);
    }

    #[test]
    fn empty_sets_and_groups_have_fixed_truth_values() {
        assert_eq!(render(&Predicate::in_set(UserColumn::Id, Vec::<i64>::new())).0, "0 = 1");
        assert_eq!(render(&Predicate::and([])).0, "1 = 1");
        assert_eq!(render(&Predicate::or([])).0, "0 = 1");
    }

    #[test]
    fn null_equality_uses_is_null() {
        let (sql, binds) = render(&Predicate::eq(UserColumn::RoleId, Value::Null));
        assert_eq!(sql, "role_id IS NULL");
        assert!(binds.is_empty());
    }

    #[test]
    fn contains_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");

        let (sql, binds) = render(&Predicate::contains(UserColumn::Email, "company"));
        assert_eq!(sql, "email LIKE ? ESCAPE '\\'");
        assert_eq!(binds, vec![Value::Text("%company%".to_string())]);
    }

    #[test]
    fn order_clause_defaults_to_id() {
        assert_eq!(UserQuery::all().order_clause("u."), " ORDER BY u.id ASC");
        let query = UserQuery::all().order_by(UserColumn::Name, SortDirection::Desc);
        assert_eq!(query.order_clause(""), " ORDER BY name DESC");
    }
}
