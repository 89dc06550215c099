//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by outbound adapters. Driving
//! ports (`Accounts`, `Modules`, ...) are implemented by domain services and
//! consumed by inbound adapters.

mod macros;
pub(crate) use macros::repository_error;

mod accounts;
mod attempt_repository;
mod attempts;
mod dashboards;
mod discussion_repository;
mod discussions;
mod module_repository;
mod modules;
mod quiz_repository;
mod quizzes;
mod user_repository;

#[cfg(test)]
pub use accounts::MockAccounts;
pub use accounts::{Accounts, ProfileStats, ProfileView, USERS_PAGE_SIZE};
#[cfg(test)]
pub use attempt_repository::MockAttemptRepository;
pub use attempt_repository::{
    AttemptRepository, AttemptRepositoryError, AuthorAttemptStats, LearnerStats,
};
#[cfg(test)]
pub use attempts::MockAttempts;
pub use attempts::{AnswerReview, AttemptResult, AttemptSheet, Attempts};
#[cfg(test)]
pub use dashboards::MockDashboards;
pub use dashboards::{
    AdminDashboard, CitizenDashboard, Dashboard, Dashboards, EducatorDashboard, HomeSummary,
};
#[cfg(test)]
pub use discussion_repository::MockDiscussionRepository;
pub use discussion_repository::{DiscussionRepository, DiscussionRepositoryError};
#[cfg(test)]
pub use discussions::MockDiscussions;
pub use discussions::{Discussions, THREADS_PAGE_SIZE, ThreadDetail};
#[cfg(test)]
pub use module_repository::MockModuleRepository;
pub use module_repository::{ModuleRepository, ModuleRepositoryError};
#[cfg(test)]
pub use modules::MockModules;
pub use modules::{MODULES_PAGE_SIZE, ModuleDetail, Modules};
#[cfg(test)]
pub use quiz_repository::MockQuizRepository;
pub use quiz_repository::{QuizRepository, QuizRepositoryError};
#[cfg(test)]
pub use quizzes::MockQuizzes;
pub use quizzes::{QUIZZES_PAGE_SIZE, QuizDetail, Quizzes, ViewerProgress};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserFilter, UserRepositoryError, UserRepository};
