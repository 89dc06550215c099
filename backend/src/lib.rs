//! Backend library for the civic learning platform.
//!
//! The binary in `main.rs` wires these modules into an Actix server; the
//! integration tests under `tests/` drive the same HTTP surface over the
//! in-memory adapters.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
