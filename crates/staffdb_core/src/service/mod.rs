//! Core use-case services.
//!
//! # Responsibility
//! - Seed the relations with fixed sample data.
//! - Run the fixed query/update/delete sequence over seeded data.

pub mod query_runner;
pub mod seed;
