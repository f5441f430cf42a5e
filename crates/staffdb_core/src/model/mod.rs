//! Typed record definitions for the five staffdb relations.
//!
//! # Responsibility
//! - Define the lookup records (position/role/department/project) and users.
//! - Validate field limits before anything reaches SQL.
//!
//! # Invariants
//! - Every record is identified by an auto-assigned, monotonically
//!   increasing integer id.
//! - Length limits mirror the `CHECK` constraints in the schema DDL.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod lookup;
pub mod user;

/// Field-level validation failure raised before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "`{field}` is {actual_chars} chars long; at most {max_chars} allowed"
            ),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn check_len(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ValidationError::TooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_len, ValidationError};

    #[test]
    fn check_len_counts_chars_not_bytes() {
        // 50 Cyrillic chars are 100 bytes.
        let name = "Ж".repeat(50);
        assert!(check_len("name", &name, 50).is_ok());

        let err = check_len("name", &format!("{name}Ж"), 50).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                field: "name",
                max_chars: 50,
                actual_chars: 51,
            }
        );
    }
}
