//! PostgreSQL connection pool and embedded migrations.
//!
//! Repositories share one `bb8` pool of `diesel-async` connections.
//! Migrations under `backend/migrations` are compiled in and applied over a
//! plain synchronous connection on a blocking thread.

use std::time::Duration;

use diesel::{Connection, PgConnection};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
const IDLE_CONNECTIONS: u32 = 2;
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pool construction or checkout failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("could not check out a database connection: {message}")]
    Checkout { message: String },
    #[error("could not build the database pool: {message}")]
    Build { message: String },
}

/// A migration could not be applied.
#[derive(Debug, thiserror::Error)]
#[error("database migration failed: {0}")]
pub struct MigrationError(String);

impl MigrationError {
    fn from_display(err: impl std::fmt::Display) -> Self {
        Self(err.to_string())
    }
}

/// Where to connect and how many connections to hold.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
}

impl PoolConfig {
    /// Ten connections to `database_url`.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
        }
    }

    #[must_use]
    pub fn with_max_size(self, max_size: u32) -> Self {
        Self { max_size, ..self }
    }
}

/// Shared handle to the connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool. Idle connections are opened eagerly, so an
    /// unreachable database fails here rather than on the first request.
    ///
    /// # Errors
    /// [`PoolError::Build`] when the manager cannot connect.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(IDLE_CONNECTIONS.min(config.max_size)))
            .connection_timeout(CHECKOUT_TIMEOUT)
            .build(manager)
            .await
            .map_err(|err| PoolError::Build {
                message: err.to_string(),
            })?;
        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    /// [`PoolError::Checkout`] when none frees up within thirty seconds.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner.get().await.map_err(|err| PoolError::Checkout {
            message: err.to_string(),
        })
    }
}

/// Apply every pending embedded migration.
///
/// # Errors
/// [`MigrationError`] when connecting or migrating fails.
pub async fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || {
        let mut connection = PgConnection::establish(&url).map_err(MigrationError::from_display)?;
        connection
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(MigrationError::from_display)
    })
    .await
    .map_err(MigrationError::from_display)??;
    info!(applied, "database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_holds_ten_connections_by_default() {
        let config = PoolConfig::new("postgres://localhost/learning");
        assert_eq!(config.max_size, 10);
        assert_eq!(config.database_url, "postgres://localhost/learning");
    }

    #[rstest]
    fn pool_size_can_be_overridden() {
        let config = PoolConfig::new("postgres://localhost/learning").with_max_size(4);
        assert_eq!(config.max_size, 4);
    }

    #[rstest]
    fn errors_carry_the_driver_message() {
        let checkout = PoolError::Checkout {
            message: "refused".to_owned(),
        };
        assert!(checkout.to_string().contains("refused"));
        assert!(MigrationError::from_display("bad sql").to_string().contains("bad sql"));
    }
}
