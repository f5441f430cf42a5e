//! Query runner: the fixed ten-step read/update/delete sequence.
//!
//! # Responsibility
//! - Run filter, sort, update and delete steps against seeded relations.
//! - Produce one structured `StepReport` per step.
//!
//! # Invariants
//! - Steps run strictly in `QueryStep::ALL` order; each sees prior mutations.
//! - The first failing step halts the sequence.
//! - Zero-row updates/deletes are reported as count `0`, not as errors.

use crate::model::lookup::LookupId;
use crate::model::user::{User, UserId, UserPatch};
use crate::repo::predicate::{Predicate, SortDirection, UserColumn, UserQuery};
use crate::repo::relations::Relations;
use crate::repo::user_repo::{UserDetails, UserRepository};
use crate::repo::{RepoError, RepoResult};
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const ROLE_FILTER_ID: LookupId = 3;
const DEPARTMENT_FILTER_IDS: [LookupId; 2] = [1, 2];
const ANALYTICS_DEPARTMENT_ID: LookupId = 4;
const UPDATED_USER_ID: UserId = 1;
pub const UPDATED_EMAIL: &str = "ivan.new@company.com";
const MOVED_USER_IDS: [UserId; 2] = [2, 3];
const MOVE_TARGET_DEPARTMENT_ID: LookupId = 1;
pub const DELETED_USER_ID: UserId = 5;
const EMAIL_NEEDLE: &str = "company";
const ID_RANGE: (UserId, UserId) = (1, 3);

/// One step of the fixed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStep {
    FilterByRole,
    FilterByDepartments,
    FilterByRoleAndDepartment,
    SortByName,
    UpdateOne,
    UpdateMany,
    DeleteOne,
    FilterByEmailSubstring,
    FilterByIdRange,
    ListAllWithReferences,
}

impl QueryStep {
    pub const ALL: [QueryStep; 10] = [
        QueryStep::FilterByRole,
        QueryStep::FilterByDepartments,
        QueryStep::FilterByRoleAndDepartment,
        QueryStep::SortByName,
        QueryStep::UpdateOne,
        QueryStep::UpdateMany,
        QueryStep::DeleteOne,
        QueryStep::FilterByEmailSubstring,
        QueryStep::FilterByIdRange,
        QueryStep::ListAllWithReferences,
    ];

    /// 1-based position in the sequence.
    pub fn number(self) -> u8 {
        match self {
            Self::FilterByRole => 1,
            Self::FilterByDepartments => 2,
            Self::FilterByRoleAndDepartment => 3,
            Self::SortByName => 4,
            Self::UpdateOne => 5,
            Self::UpdateMany => 6,
            Self::DeleteOne => 7,
            Self::FilterByEmailSubstring => 8,
            Self::FilterByIdRange => 9,
            Self::ListAllWithReferences => 10,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::FilterByRole => "Users with the \"Пользователь\" role",
            Self::FilterByDepartments => "Users from the IT or development department",
            Self::FilterByRoleAndDepartment => "Users with role 3 from the analytics department",
            Self::SortByName => "Users sorted by name",
            Self::UpdateOne => "Update a single record",
            Self::UpdateMany => "Update several records",
            Self::DeleteOne => "Delete a record",
            Self::FilterByEmailSubstring => "Users whose email contains \"company\"",
            Self::FilterByIdRange => "Users with id from 1 to 3",
            Self::ListAllWithReferences => "All users after the changes",
        }
    }
}

impl Display for QueryStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

/// Projected user fields; unselected fields stay `None` and are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserRow {
    pub id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<LookupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<LookupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<LookupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl UserRow {
    fn named(id: UserId, name: &str) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// `id, name, email`.
    fn contact(user: &User) -> Self {
        Self {
            email: Some(user.email.clone()),
            ..Self::named(user.id, &user.name)
        }
    }

    /// Every base column.
    fn full(user: &User) -> Self {
        Self {
            role_id: user.role_id,
            position_id: user.position_id,
            department_id: user.department_id,
            ..Self::contact(user)
        }
    }
}

/// Result set of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutput {
    Rows { rows: Vec<UserRow> },
    Updated { count: usize, rows: Vec<UserRow> },
    Deleted { count: usize },
}

impl StepOutput {
    /// Rows carried by this output; empty for deletes.
    pub fn rows(&self) -> &[UserRow] {
        match self {
            Self::Rows { rows } | Self::Updated { rows, .. } => rows,
            Self::Deleted { .. } => &[],
        }
    }

    /// Affected-row count for updates and deletes.
    pub fn affected(&self) -> Option<usize> {
        match self {
            Self::Rows { .. } => None,
            Self::Updated { count, .. } | Self::Deleted { count } => Some(*count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: u8,
    pub name: QueryStep,
    pub title: &'static str,
    pub output: StepOutput,
}

pub type RunnerResult<T> = Result<T, RunnerError>;

/// A step failed; later steps did not run.
#[derive(Debug)]
pub struct RunnerError {
    pub step: QueryStep,
    pub source: RepoError,
}

impl Display for RunnerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed", self.step)
    }
}

impl Error for RunnerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Runs steps against one set of relations.
pub struct QueryRunner<'a, 'conn> {
    relations: &'a Relations<'conn>,
}

impl<'a, 'conn> QueryRunner<'a, 'conn> {
    pub fn new(relations: &'a Relations<'conn>) -> Self {
        Self { relations }
    }

    /// Runs every step in order, stopping at the first failure.
    pub fn run_all(&self) -> RunnerResult<Vec<StepReport>> {
        QueryStep::ALL.iter().map(|step| self.run(*step)).collect()
    }

    /// Runs one step with its fixed arguments.
    ///
    /// # Side effects
    /// - Emits `query_step` logging events.
    /// - `UpdateOne`, `UpdateMany` and `DeleteOne` mutate `users`.
    pub fn run(&self, step: QueryStep) -> RunnerResult<StepReport> {
        let started_at = Instant::now();
        info!(
            "event=query_step module=service status=start step={}",
            step.number()
        );

        let output = match step {
            QueryStep::FilterByRole => self.users_with_role(ROLE_FILTER_ID),
            QueryStep::FilterByDepartments => self.users_in_departments(&DEPARTMENT_FILTER_IDS),
            QueryStep::FilterByRoleAndDepartment => {
                self.users_with_role_in_department(ROLE_FILTER_ID, ANALYTICS_DEPARTMENT_ID)
            }
            QueryStep::SortByName => self.users_sorted_by_name(),
            QueryStep::UpdateOne => self.update_email(UPDATED_USER_ID, UPDATED_EMAIL),
            QueryStep::UpdateMany => {
                self.move_to_department(&MOVED_USER_IDS, MOVE_TARGET_DEPARTMENT_ID)
            }
            QueryStep::DeleteOne => self.delete_user(DELETED_USER_ID),
            QueryStep::FilterByEmailSubstring => self.users_with_email_containing(EMAIL_NEEDLE),
            QueryStep::FilterByIdRange => self.users_with_id_between(ID_RANGE.0, ID_RANGE.1),
            QueryStep::ListAllWithReferences => self.all_users_with_references(),
        };

        match output {
            Ok(output) => {
                info!(
                    "event=query_step module=service status=ok step={} rows={} affected={} duration_ms={}",
                    step.number(),
                    output.rows().len(),
                    output.affected().map_or_else(|| "-".to_string(), |n| n.to_string()),
                    started_at.elapsed().as_millis()
                );
                Ok(StepReport {
                    step: step.number(),
                    name: step,
                    title: step.title(),
                    output,
                })
            }
            Err(source) => {
                error!(
                    "event=query_step module=service status=error step={} duration_ms={} error={}",
                    step.number(),
                    started_at.elapsed().as_millis(),
                    source
                );
                Err(RunnerError { step, source })
            }
        }
    }

    /// Users with `role_id = role_id`, with role name.
    pub fn users_with_role(&self, role_id: LookupId) -> RepoResult<StepOutput> {
        let details = self.details(UserQuery::filtered(Predicate::eq(
            UserColumn::RoleId,
            role_id,
        )))?;
        Ok(rows(details.iter().map(|detail| UserRow {
            role: detail.role_name.clone(),
            ..UserRow::named(detail.user.id, &detail.user.name)
        })))
    }

    /// Users in any of `department_ids`, with department name.
    pub fn users_in_departments(&self, department_ids: &[LookupId]) -> RepoResult<StepOutput> {
        let predicate = Predicate::or(
            department_ids
                .iter()
                .map(|id| Predicate::eq(UserColumn::DepartmentId, *id)),
        );
        let details = self.details(UserQuery::filtered(predicate))?;
        Ok(rows(details.iter().map(|detail| UserRow {
            department: detail.department_name.clone(),
            ..UserRow::named(detail.user.id, &detail.user.name)
        })))
    }

    /// Users with both `role_id` and `department_id`, with both names.
    pub fn users_with_role_in_department(
        &self,
        role_id: LookupId,
        department_id: LookupId,
    ) -> RepoResult<StepOutput> {
        let predicate = Predicate::and([
            Predicate::eq(UserColumn::RoleId, role_id),
            Predicate::eq(UserColumn::DepartmentId, department_id),
        ]);
        let details = self.details(UserQuery::filtered(predicate))?;
        Ok(rows(details.iter().map(|detail| UserRow {
            role: detail.role_name.clone(),
            department: detail.department_name.clone(),
            ..UserRow::named(detail.user.id, &detail.user.name)
        })))
    }

    /// Every user by `name ASC`, projecting `id, name, email`.
    pub fn users_sorted_by_name(&self) -> RepoResult<StepOutput> {
        let query = UserQuery::all().order_by(UserColumn::Name, SortDirection::Asc);
        let users = self.relations.users.find_users(&query)?;
        Ok(rows(users.iter().map(UserRow::contact)))
    }

    /// Sets `email` of user `id`, then re-reads it.
    pub fn update_email(&self, id: UserId, email: &str) -> RepoResult<StepOutput> {
        let count = self
            .relations
            .users
            .update_users(&UserPatch::email(email), &Predicate::eq(UserColumn::Id, id))?;
        let rows = self
            .relations
            .users
            .get_user(id)?
            .iter()
            .map(UserRow::full)
            .collect();
        Ok(StepOutput::Updated { count, rows })
    }

    /// Moves users `ids` to `department_id`, then re-reads them.
    pub fn move_to_department(
        &self,
        ids: &[UserId],
        department_id: LookupId,
    ) -> RepoResult<StepOutput> {
        let filter = Predicate::in_set(UserColumn::Id, ids.iter().copied());
        let count = self
            .relations
            .users
            .update_users(&UserPatch::department(department_id), &filter)?;
        let rows = self
            .relations
            .users
            .find_users(&UserQuery::filtered(filter))?
            .iter()
            .map(|user| UserRow {
                department_id: user.department_id,
                ..UserRow::named(user.id, &user.name)
            })
            .collect();
        Ok(StepOutput::Updated { count, rows })
    }

    pub fn delete_user(&self, id: UserId) -> RepoResult<StepOutput> {
        let count = self
            .relations
            .users
            .delete_users(&Predicate::eq(UserColumn::Id, id))?;
        Ok(StepOutput::Deleted { count })
    }

    /// Users whose email contains `needle` literally.
    pub fn users_with_email_containing(&self, needle: &str) -> RepoResult<StepOutput> {
        let query = UserQuery::filtered(Predicate::contains(UserColumn::Email, needle));
        let users = self.relations.users.find_users(&query)?;
        Ok(rows(users.iter().map(UserRow::contact)))
    }

    /// Users with `low <= id <= high`.
    pub fn users_with_id_between(&self, low: UserId, high: UserId) -> RepoResult<StepOutput> {
        let query = UserQuery::filtered(Predicate::between(UserColumn::Id, low, high));
        let users = self.relations.users.find_users(&query)?;
        Ok(rows(users.iter().map(UserRow::contact)))
    }

    /// Every user by `id ASC` with role, position and department names.
    pub fn all_users_with_references(&self) -> RepoResult<StepOutput> {
        let query = UserQuery::all().order_by(UserColumn::Id, SortDirection::Asc);
        let details = self.details(query)?;
        Ok(rows(details.iter().map(|detail| UserRow {
            role: detail.role_name.clone(),
            position: detail.position_name.clone(),
            department: detail.department_name.clone(),
            ..UserRow::contact(&detail.user)
        })))
    }

    fn details(&self, query: UserQuery) -> RepoResult<Vec<UserDetails>> {
        self.relations.users.find_user_details(&query)
    }
}

fn rows(rows: impl Iterator<Item = UserRow>) -> StepOutput {
    StepOutput::Rows {
        rows: rows.collect(),
    }
}
