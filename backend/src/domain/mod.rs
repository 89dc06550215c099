//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities for accounts, learning modules,
//! quizzes, attempts and discussions, the validation that guards them, and
//! the services implementing the driving ports in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Role: identity and authorisation predicates.
//! - LearningModule, Quiz, Question, QuizAttempt, DiscussionThread, Comment:
//!   the stored aggregates.
//! - `grade`: the quiz grading rule.

pub mod attempt;
pub mod auth;
pub mod discussion;
pub mod error;
pub mod learning_module;
pub mod password;
pub mod ports;
pub mod quiz;
pub mod slug;
pub mod trace_id;
pub mod user;

mod account_service;
mod attempt_service;
mod dashboard_service;
mod discussion_service;
mod module_service;
mod quiz_service;

pub use self::account_service::AccountService;
pub use self::attempt::{
    AttemptOutcome, QuestionAnswer, QuizAttempt, grade, meets_threshold, percentage, total_points,
};
pub use self::attempt_service::AttemptService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, ProfileUpdate, ProfileUpdateForm, Registration,
    RegistrationForm, normalise_optional, password_error,
};
pub use self::dashboard_service::DashboardService;
pub use self::discussion::{
    COMMENT_MAX, Comment, CommentContent, CommentNode, DiscussionThread, LikeToggle, ThreadFields,
    ThreadForm, ThreadModeration, ThreadStatus, ThreadSummary, build_comment_tree, sort_threads,
};
pub use self::discussion_service::DiscussionService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::learning_module::{
    DifficultyLevel, LearningModule, ModuleFields, ModuleFilter, ModuleForm, ModuleStatus,
    TITLE_MAX, validate_title,
};
pub use self::module_service::ModuleService;
pub use self::password::{NewPassword, PASSWORD_MIN, PasswordError, PasswordHash};
pub use self::quiz::{
    Choice, ChoiceForm, POINTS_MAX, Question, QuestionForm, QuestionType, Quiz, QuizDifficulty,
    QuizFields, QuizForm, QuizSettings,
};
pub use self::quiz_service::QuizService;
pub use self::slug::{Slug, SlugError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, ProfileFields, Role, User, UserId, UserValidationError, Username, validate_name,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use learning_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
