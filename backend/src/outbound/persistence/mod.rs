//! PostgreSQL repositories for accounts, modules, quizzes, attempts and
//! discussions.
//!
//! Row structs (`models`) and the generated `schema` stay private; every
//! repository returns domain types and maps Diesel failures onto its port's
//! `*RepositoryError` enum. Connections come from a
//! `bb8` pool driven by `diesel-async`, and the embedded migrations run once
//! at startup through [`run_migrations`].
//!
//! ```ignore
//! let pool = DbPool::new(PoolConfig::new(database_url)).await?;
//! let modules = DieselModuleRepository::new(pool.clone());
//! ```

mod diesel_attempt_repository;
mod diesel_discussion_repository;
mod diesel_error_mapping;
pub(crate) mod diesel_helpers;
mod diesel_module_repository;
mod diesel_quiz_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_attempt_repository::DieselAttemptRepository;
pub use diesel_discussion_repository::DieselDiscussionRepository;
pub use diesel_module_repository::DieselModuleRepository;
pub use diesel_quiz_repository::DieselQuizRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, MigrationError, PoolConfig, PoolError, run_migrations};
