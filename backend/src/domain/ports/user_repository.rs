//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Email, PasswordHash, Role, User, UserId, Username};

use super::repository_error;

repository_error!(
    /// A unique username or email collided.
    User,
    "user"
);

/// A user together with their stored password hash.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}

/// Admin listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<Role>,
    /// Case-insensitive substring matched against username, email and names.
    pub search: Option<String>,
}

impl UserFilter {
    /// Whether `user` satisfies the filter.
    pub fn matches(&self, user: &User) -> bool {
        let role_ok = self.role.is_none_or(|role| user.role == role);
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            let needle = needle.to_lowercase();
            [
                user.username.as_ref(),
                user.email.as_ref(),
                user.profile.first_name.as_str(),
                user.profile.last_name.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
        });
        role_ok && search_ok
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user with their password hash.
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserRepositoryError>;

    /// Persist changes to an existing user's profile and role.
    async fn update(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user and their password hash by username.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    /// Whether `username` is already registered.
    async fn username_taken(&self, username: &Username) -> Result<bool, UserRepositoryError>;

    /// Whether `email` belongs to a user other than `excluding`.
    async fn email_taken(
        &self,
        email: &Email,
        excluding: Option<UserId>,
    ) -> Result<bool, UserRepositoryError>;

    /// Page through users in username order.
    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError>;

    /// Total number of users.
    async fn count(&self) -> Result<u64, UserRepositoryError>;

    /// Most recently registered users.
    async fn recent(&self, limit: u32) -> Result<Vec<User>, UserRepositoryError>;
}
