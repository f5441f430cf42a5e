//! Core of staffdb: a small relational seeding and query harness.
//!
//! Storage bootstrap, typed records, repositories, the seed loader and the
//! fixed query sequence all live here; the CLI crate only orchestrates.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::schema::initialize_schema;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::lookup::{LookupId, LookupKind, LookupRecord};
pub use model::user::{NewUser, User, UserId, UserPatch};
pub use model::ValidationError;
pub use repo::lookup_repo::{LookupRepository, SqliteLookupRepository};
pub use repo::predicate::{Predicate, SortDirection, UserColumn, UserQuery};
pub use repo::relations::Relations;
pub use repo::user_repo::{SqliteUserRepository, UserDetails, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::query_runner::{
    QueryRunner, QueryStep, RunnerError, RunnerResult, StepOutput, StepReport, UserRow,
};
pub use service::seed::{seed, seed_with, SeedData, SeedError, SeedResult, SeedSummary};
