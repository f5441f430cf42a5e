//! User record, insert payload and partial-update patch.
//!
//! # Invariants
//! - `email` is globally unique (enforced by storage).
//! - `role_id`, `position_id` and `department_id` are optional references.
//! - `id` is stable once assigned.

use super::lookup::LookupId;
use super::{check_len, ValidationError};
use serde::{Deserialize, Serialize};

pub const USER_NAME_MAX_CHARS: usize = 100;
pub const USER_EMAIL_MAX_CHARS: usize = 100;

pub type UserId = i64;

/// Persisted user row (base columns only, no joins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role_id: Option<LookupId>,
    pub position_id: Option<LookupId>,
    pub department_id: Option<LookupId>,
}

/// Insert payload; `id` is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role_id: Option<LookupId>,
    pub position_id: Option<LookupId>,
    pub department_id: Option<LookupId>,
}

impl NewUser {
    /// Creates a payload without any references.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role_id: None,
            position_id: None,
            department_id: None,
        }
    }

    /// Sets role/position/department references in one go.
    pub fn with_refs(
        mut self,
        role_id: LookupId,
        position_id: LookupId,
        department_id: LookupId,
    ) -> Self {
        self.role_id = Some(role_id);
        self.position_id = Some(position_id);
        self.department_id = Some(department_id);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_len("name", &self.name, USER_NAME_MAX_CHARS)?;
        check_len("email", &self.email, USER_EMAIL_MAX_CHARS)
    }
}

/// Column assignments for an update-by-predicate.
///
/// `None` leaves a column untouched. For reference columns the inner
/// `Option` is the new value, so `Some(None)` clears the reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<Option<LookupId>>,
    pub position_id: Option<Option<LookupId>>,
    pub department_id: Option<Option<LookupId>>,
}

impl UserPatch {
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn department(department_id: LookupId) -> Self {
        Self {
            department_id: Some(Some(department_id)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.role_id.is_none()
            && self.position_id.is_none()
            && self.department_id.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            check_len("name", name, USER_NAME_MAX_CHARS)?;
        }
        if let Some(email) = &self.email {
            check_len("email", email, USER_EMAIL_MAX_CHARS)?;
        }
        Ok(())
    }
}
