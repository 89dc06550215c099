//! Error type generator for the repository ports.

/// Declare `<Prefix>RepositoryError` with the three failure kinds every
/// storage adapter reports, `&str`-friendly constructors, and the mapping
/// onto the domain [`Error`](crate::domain::Error):
///
/// | Variant | Domain code |
/// |---|---|
/// | `Connection` | `service_unavailable` |
/// | `Query` | `internal_error` |
/// | `Conflict` | `conflict`, message passed through |
macro_rules! repository_error {
    ($(#[$conflict_doc:meta])* $prefix:ident, $label:literal) => {
        ::paste::paste! {
            #[doc = concat!("Failure reported by a ", $label, " repository adapter.")]
            #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
            pub enum [<$prefix RepositoryError>] {
                /// The store could not be reached.
                #[error("{label} repository connection failed: {message}", label = $label)]
                Connection { message: String },
                /// A statement failed while executing.
                #[error("{label} repository query failed: {message}", label = $label)]
                Query { message: String },
                $(#[$conflict_doc])*
                #[error("{message}")]
                Conflict { message: String },
            }

            impl [<$prefix RepositoryError>] {
                pub fn connection(message: impl Into<String>) -> Self {
                    Self::Connection { message: message.into() }
                }

                pub fn query(message: impl Into<String>) -> Self {
                    Self::Query { message: message.into() }
                }

                pub fn conflict(message: impl Into<String>) -> Self {
                    Self::Conflict { message: message.into() }
                }
            }

            impl From<[<$prefix RepositoryError>]> for $crate::domain::Error {
                fn from(error: [<$prefix RepositoryError>]) -> Self {
                    match error {
                        [<$prefix RepositoryError>]::Connection { message } => {
                            Self::service_unavailable(format!("{} store unavailable: {message}", $label))
                        }
                        [<$prefix RepositoryError>]::Query { message } => {
                            Self::internal(format!("{} store error: {message}", $label))
                        }
                        [<$prefix RepositoryError>]::Conflict { message } => Self::conflict(message),
                    }
                }
            }
        }
    };
}

pub(crate) use repository_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::domain::{Error, ErrorCode};

    repository_error!(
        /// Two grades for one learner.
        Gradebook,
        "gradebook"
    );

    #[rstest]
    fn constructors_accept_str() {
        let err = GradebookRepositoryError::query("syntax error");
        assert_eq!(err.to_string(), "gradebook repository query failed: syntax error");
    }

    #[rstest]
    #[case(GradebookRepositoryError::connection("pool"), ErrorCode::ServiceUnavailable)]
    #[case(GradebookRepositoryError::query("sql"), ErrorCode::InternalError)]
    #[case(GradebookRepositoryError::conflict("slug taken"), ErrorCode::Conflict)]
    fn failures_map_onto_domain_codes(#[case] error: GradebookRepositoryError, #[case] code: ErrorCode) {
        let mapped: Error = error.into();
        assert_eq!(mapped.code(), code);
    }

    #[rstest]
    fn conflict_message_is_passed_through() {
        let mapped: Error = GradebookRepositoryError::conflict("slug taken").into();
        assert_eq!(mapped.message(), "slug taken");
    }
}
