//! Shared Diesel error mapping for every repository adapter.
//!
//! All driven-port errors expose the same three failure kinds, so pool and
//! Diesel failures are translated once here and each repository only names
//! its error type.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::ports::{
    AttemptRepositoryError, DiscussionRepositoryError, ModuleRepositoryError, QuizRepositoryError,
    UserRepositoryError,
};

use super::pool::PoolError;

/// Repository error types constructible from the three persistence failure
/// kinds.
pub(crate) trait RepositoryFailure: Sized {
    fn from_connection(message: String) -> Self;
    fn from_query(message: String) -> Self;
    fn from_conflict(message: String) -> Self;
}

macro_rules! impl_repository_failure {
    ($($error:ty),+ $(,)?) => {
        $(
            impl RepositoryFailure for $error {
                fn from_connection(message: String) -> Self {
                    Self::connection(message)
                }

                fn from_query(message: String) -> Self {
                    Self::query(message)
                }

                fn from_conflict(message: String) -> Self {
                    Self::conflict(message)
                }
            }
        )+
    };
}

impl_repository_failure!(
    UserRepositoryError,
    ModuleRepositoryError,
    QuizRepositoryError,
    AttemptRepositoryError,
    DiscussionRepositoryError,
);

/// Map pool errors into the repository's connection failure.
pub(crate) fn map_pool_error<E: RepositoryFailure>(error: PoolError) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    E::from_connection(message)
}

/// Human readable message for a violated unique constraint.
fn unique_violation_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("users_username_key") => "that username is already taken".to_owned(),
        Some("users_email_key") => "that email is already registered".to_owned(),
        Some("learning_modules_title_key") => {
            "a module with that title already exists".to_owned()
        }
        Some("learning_modules_slug_key") => "a module with that slug already exists".to_owned(),
        Some("quiz_attempts_one_open_idx") => {
            "an attempt at this quiz is already in progress".to_owned()
        }
        Some(other) => format!("duplicate value violates {other}"),
        None => "duplicate value".to_owned(),
    }
}

fn log_database_error(kind: &DatabaseErrorKind, info: &dyn DatabaseErrorInformation) {
    debug!(
        ?kind,
        message = info.message(),
        constraint = info.constraint_name(),
        "diesel operation failed"
    );
}

/// Map Diesel errors into the repository's failure kinds.
///
/// Unique and foreign key violations become conflicts; closed connections
/// become connection failures; everything else is a query failure.
pub(crate) fn map_diesel_error<E: RepositoryFailure>(error: DieselError) -> E {
    match error {
        DieselError::NotFound => E::from_query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::from_query("database query error".to_owned()),
        DieselError::DatabaseError(kind, info) => {
            log_database_error(&kind, info.as_ref());
            match kind {
                DatabaseErrorKind::UniqueViolation => {
                    E::from_conflict(unique_violation_message(info.constraint_name()))
                }
                DatabaseErrorKind::ForeignKeyViolation => {
                    warn!(
                        constraint = info.constraint_name(),
                        "foreign key violation reached the repository"
                    );
                    E::from_conflict("a referenced record does not exist".to_owned())
                }
                DatabaseErrorKind::ClosedConnection => {
                    E::from_connection("database connection error".to_owned())
                }
                _ => E::from_query("database error".to_owned()),
            }
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            E::from_query("database error".to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for failure classification.

    use rstest::rstest;

    use super::*;

    struct Info(Option<&'static str>);

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "violation"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.0
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info(constraint)))
    }

    #[rstest]
    fn pool_errors_are_connection_failures() {
        let error: UserRepositoryError = map_pool_error(PoolError::Checkout {
            message: "refused".to_owned(),
        });
        assert!(matches!(error, UserRepositoryError::Connection { .. }));
        assert!(error.to_string().contains("refused"));
    }

    #[rstest]
    #[case(Some("users_username_key"), "username is already taken")]
    #[case(Some("quiz_attempts_one_open_idx"), "already in progress")]
    #[case(Some("comments_pkey"), "comments_pkey")]
    fn unique_violations_are_conflicts(
        #[case] constraint: Option<&'static str>,
        #[case] fragment: &str,
    ) {
        let error: AttemptRepositoryError =
            map_diesel_error(database_error(DatabaseErrorKind::UniqueViolation, constraint));
        let AttemptRepositoryError::Conflict { message } = error else {
            panic!("expected a conflict");
        };
        assert!(message.contains(fragment), "{message}");
    }

    #[rstest]
    fn closed_connections_are_connection_failures() {
        let error: QuizRepositoryError =
            map_diesel_error(database_error(DatabaseErrorKind::ClosedConnection, None));
        assert!(matches!(error, QuizRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        let error: DiscussionRepositoryError = map_diesel_error(DieselError::NotFound);
        assert!(matches!(error, DiscussionRepositoryError::Query { .. }));
    }
}
