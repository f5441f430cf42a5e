//! Seed loader: fills the five relations with the fixed sample data.
//!
//! # Responsibility
//! - Insert lookups first, then users referencing them by 1-based ordinal.
//! - Keep the whole seed all-or-nothing.
//!
//! # Invariants
//! - A failed seed leaves every relation exactly as it was before the call.
//! - Nothing outside the five relations is written.

use crate::db::with_savepoint;
use crate::model::lookup::LookupKind;
use crate::model::user::NewUser;
use crate::repo::lookup_repo::LookupRepository;
use crate::repo::relations::Relations;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type SeedResult<T> = Result<T, SeedError>;

#[derive(Debug)]
pub enum SeedError {
    /// A bulk insert into `table` failed.
    Relation {
        table: &'static str,
        source: RepoError,
    },
    /// Savepoint bookkeeping failed.
    Storage(RepoError),
}

impl SeedError {
    pub fn repo_error(&self) -> &RepoError {
        match self {
            Self::Relation { source, .. } => source,
            Self::Storage(err) => err,
        }
    }
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relation { table, .. } => write!(f, "seeding `{table}` failed"),
            Self::Storage(_) => write!(f, "seed transaction failed"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.repo_error())
    }
}

impl From<rusqlite::Error> for SeedError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(value.into())
    }
}

/// Rows to load; users reference lookups by 1-based ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedData {
    pub positions: Vec<String>,
    pub roles: Vec<String>,
    pub departments: Vec<String>,
    pub projects: Vec<String>,
    pub users: Vec<NewUser>,
}

impl SeedData {
    /// The fixed sample organisation.
    pub fn fixture() -> Self {
        Self {
            positions: owned(&[
                "Разработчик",
                "Тестировщик",
                "Аналитик",
                "Менеджер проекта",
                "Дизайнер",
            ]),
            roles: owned(&[
                "Администратор",
                "Модератор",
                "Пользователь",
                "Гость",
                "Редактор",
            ]),
            departments: owned(&[
                "IT отдел",
                "Отдел разработки",
                "Отдел тестирования",
                "Отдел аналитики",
                "Отдел дизайна",
            ]),
            projects: owned(&[
                "Веб-сайт компании",
                "Мобильное приложение",
                "Внутренняя система учета",
                "Облачное хранилище",
                "Система аналитики",
            ]),
            users: vec![
                NewUser::new("Иван Петров", "ivan.petrov@company.com").with_refs(1, 1, 1),
                NewUser::new("Мария Сидорова", "maria.sidorova@company.com").with_refs(2, 2, 3),
                NewUser::new("Алексей Козлов", "alexey.kozlov@company.com").with_refs(3, 3, 4),
                NewUser::new("Елена Волкова", "elena.volkova@company.com").with_refs(4, 4, 2),
                NewUser::new("Дмитрий Орлов", "dmitry.orlov@company.com").with_refs(5, 5, 5),
            ],
        }
    }

    fn lookup_names(&self, kind: LookupKind) -> &[String] {
        match kind {
            LookupKind::Position => &self.positions,
            LookupKind::Role => &self.roles,
            LookupKind::Department => &self.departments,
            LookupKind::Project => &self.projects,
        }
    }
}

/// Inserted row counts per relation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub positions: usize,
    pub roles: usize,
    pub departments: usize,
    pub projects: usize,
    pub users: usize,
}

impl SeedSummary {
    fn set_lookup(&mut self, kind: LookupKind, count: usize) {
        match kind {
            LookupKind::Position => self.positions = count,
            LookupKind::Role => self.roles = count,
            LookupKind::Department => self.departments = count,
            LookupKind::Project => self.projects = count,
        }
    }
}

/// Loads `SeedData::fixture()`.
pub fn seed(relations: &Relations<'_>) -> SeedResult<SeedSummary> {
    seed_with(relations, &SeedData::fixture())
}

/// Loads `data` into empty or populated relations, all-or-nothing.
///
/// # Side effects
/// - Emits `seed` logging events with per-relation counts.
pub fn seed_with(relations: &Relations<'_>, data: &SeedData) -> SeedResult<SeedSummary> {
    let started_at = Instant::now();
    info!("event=seed module=service status=start");

    let result = with_savepoint(relations.connection(), "seed", || -> SeedResult<SeedSummary> {
        let mut summary = SeedSummary::default();

        for kind in LookupKind::ALL {
            let ids = relations
                .lookup(kind)
                .insert_names(data.lookup_names(kind))
                .map_err(|source| SeedError::Relation {
                    table: kind.table(),
                    source,
                })?;
            summary.set_lookup(kind, ids.len());
        }

        let user_ids =
            relations
                .users
                .insert_users(&data.users)
                .map_err(|source| SeedError::Relation {
                    table: "users",
                    source,
                })?;
        summary.users = user_ids.len();

        Ok(summary)
    });

    match &result {
        Ok(summary) => info!(
            "event=seed module=service status=ok positions={} roles={} departments={} projects={} users={} duration_ms={}",
            summary.positions,
            summary.roles,
            summary.departments,
            summary.projects,
            summary.users,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=seed module=service status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }

    result
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}
