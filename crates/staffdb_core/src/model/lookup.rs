//! Lookup relations: positions, roles, departments and projects.
//!
//! All four share one shape (`id`, unique `name`), so one record type and a
//! kind tag cover them.

use super::{check_len, ValidationError};
use serde::{Deserialize, Serialize};

/// Max chars of a lookup `name`.
pub const LOOKUP_NAME_MAX_CHARS: usize = 50;

/// Identifier of a lookup row.
pub type LookupId = i64;

/// Which lookup relation a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Position,
    Role,
    Department,
    /// Seeded but never referenced by users.
    Project,
}

impl LookupKind {
    /// Every kind, in seeding order.
    pub const ALL: [LookupKind; 4] = [
        LookupKind::Position,
        LookupKind::Role,
        LookupKind::Department,
        LookupKind::Project,
    ];

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Position => "positions",
            Self::Role => "roles",
            Self::Department => "departments",
            Self::Project => "projects",
        }
    }
}

/// Persisted lookup row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRecord {
    pub id: LookupId,
    pub name: String,
}

/// Validates a lookup name before insert.
pub fn validate_lookup_name(name: &str) -> Result<(), ValidationError> {
    check_len("name", name, LOOKUP_NAME_MAX_CHARS)
}
