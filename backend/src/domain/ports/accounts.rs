//! Driving port for registration, authentication and profiles.
//!
//! Inbound adapters call this port with the session user already resolved,
//! so the domain never touches cookies.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Error, LoginCredentials, ProfileUpdateForm, RegistrationForm, Role, User, UserId,
};

use super::UserFilter;

/// Number of users per admin listing page.
pub const USERS_PAGE_SIZE: u32 = 20;

/// Role-dependent profile statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStats {
    Educator {
        modules_created: u64,
        quizzes_created: u64,
    },
    Citizen {
        quizzes_attempted: u64,
        quizzes_passed: u64,
    },
    Admin,
}

/// A profile as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub user: User,
    pub stats: ProfileStats,
    pub is_own_profile: bool,
}

/// Domain use-case port for accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Validate and create a citizen or educator account.
    async fn register(&self, form: RegistrationForm) -> Result<User, Error>;

    /// Verify credentials and return the authenticated user.
    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error>;

    /// Resolve the user a session points at; missing users are unauthorised.
    async fn current_user(&self, id: &UserId) -> Result<User, Error>;

    /// The viewer's own profile, or another user's when `subject` is set.
    async fn profile(&self, viewer: &User, subject: Option<UserId>) -> Result<ProfileView, Error>;

    /// Update the viewer's editable profile fields.
    async fn update_profile(&self, actor: &User, form: ProfileUpdateForm) -> Result<User, Error>;

    /// Admin listing of users.
    async fn list_users(
        &self,
        actor: &User,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, Error>;

    /// Admin role assignment.
    async fn change_role(&self, actor: &User, user_id: UserId, role: Role) -> Result<User, Error>;
}
