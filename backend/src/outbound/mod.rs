//! Storage adapters behind the repository ports.
//!
//! [`persistence`] talks to PostgreSQL through Diesel; [`memory`] keeps the
//! same tables in process and backs the server when `DATABASE_URL` is unset,
//! as well as the behaviour tests. Both only translate rows to domain values:
//! permissions, grading and slug rules live in the domain services.

pub mod memory;
pub mod persistence;
