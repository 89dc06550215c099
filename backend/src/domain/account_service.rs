//! Account domain service.
//!
//! Implements the [`Accounts`] driving port: registration with Argon2
//! hashing, credential checks, profiles with role-dependent statistics and
//! admin user management.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{
    Accounts, AttemptRepository, ModuleRepository, ProfileStats, ProfileView, QuizRepository,
    StoredCredentials, UserFilter, UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, NewPassword, PasswordError, PasswordHash, ProfileUpdate,
    ProfileUpdateForm, Registration, RegistrationForm, Role, User, UserId, password_error,
};

fn duplicate(field: &str, code: &str, message: &str) -> Error {
    Error::conflict(message).with_details(json!({ "field": field, "code": code }))
}

/// Well-formed Argon2id hash with default parameters that no password
/// matches. Unknown usernames are verified against it.
const UNKNOWN_USER_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn len_to_count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

async fn hash_password(password: NewPassword) -> Result<PasswordHash, Error> {
    tokio::task::spawn_blocking(move || password.hash())
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
        .map_err(password_error)
}

async fn verify_password(hash: PasswordHash, candidate: Zeroizing<String>) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || hash.verify(&candidate))
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))?
        .map_err(|err: PasswordError| Error::internal(err.to_string()))
}

/// Account service over user, module, quiz and attempt repositories.
#[derive(Clone)]
pub struct AccountService<U, M, Q, A> {
    users: Arc<U>,
    modules: Arc<M>,
    quizzes: Arc<Q>,
    attempts: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<U, M, Q, A> AccountService<U, M, Q, A> {
    /// Create the service.
    pub fn new(
        users: Arc<U>,
        modules: Arc<M>,
        quizzes: Arc<Q>,
        attempts: Arc<A>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            modules,
            quizzes,
            attempts,
            clock,
        }
    }
}

impl<U, M, Q, A> AccountService<U, M, Q, A>
where
    U: UserRepository,
    M: ModuleRepository,
    Q: QuizRepository,
    A: AttemptRepository,
{
    async fn stats_for(&self, user: &User) -> Result<ProfileStats, Error> {
        Ok(match user.role {
            Role::Educator => ProfileStats::Educator {
                modules_created: len_to_count(self.modules.list_by_author(&user.id).await?.len()),
                quizzes_created: len_to_count(self.quizzes.list_by_author(&user.id).await?.len()),
            },
            Role::Citizen => {
                let stats = self.attempts.learner_stats(&user.id).await?;
                ProfileStats::Citizen {
                    quizzes_attempted: stats.quizzes_attempted,
                    quizzes_passed: stats.quizzes_passed,
                }
            }
            Role::Admin => ProfileStats::Admin,
        })
    }
}

#[async_trait]
impl<U, M, Q, A> Accounts for AccountService<U, M, Q, A>
where
    U: UserRepository,
    M: ModuleRepository,
    Q: QuizRepository,
    A: AttemptRepository,
{
    async fn register(&self, form: RegistrationForm) -> Result<User, Error> {
        let Registration {
            username,
            email,
            role,
            profile,
            password,
        } = Registration::try_from(form)?;

        if self.users.username_taken(&username).await? {
            return Err(duplicate(
                "username",
                "username_taken",
                "a user with that username already exists",
            ));
        }
        if self.users.email_taken(&email, None).await? {
            return Err(duplicate(
                "email",
                "email_taken",
                "a user with that email already exists",
            ));
        }

        let password_hash = hash_password(password).await?;
        let now = self.clock.utc();
        let user = User {
            id: UserId::random(),
            username,
            email,
            role,
            profile,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(&user, &password_hash).await?;
        info!(user_id = %user.id, role = %user.role, "registered user");
        Ok(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error> {
        let candidate = Zeroizing::new(credentials.password().to_owned());
        let Some(StoredCredentials {
            user,
            password_hash,
        }) = self.users.find_credentials(credentials.username()).await?
        else {
            // Same Argon2 work as a known user; the outcome is irrelevant.
            let _ = verify_password(PasswordHash::from_stored(UNKNOWN_USER_HASH), candidate).await;
            return Err(invalid_credentials());
        };
        if verify_password(password_hash, candidate).await? {
            info!(user_id = %user.id, "user logged in");
            Ok(user)
        } else {
            Err(invalid_credentials())
        }
    }

    async fn current_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    async fn profile(&self, viewer: &User, subject: Option<UserId>) -> Result<ProfileView, Error> {
        let user = match subject {
            Some(id) if id != viewer.id => self
                .users
                .find_by_id(&id)
                .await?
                .ok_or_else(|| Error::not_found(format!("user {id} not found")))?,
            _ => viewer.clone(),
        };
        let stats = self.stats_for(&user).await?;
        Ok(ProfileView {
            is_own_profile: user.id == viewer.id,
            user,
            stats,
        })
    }

    async fn update_profile(&self, actor: &User, form: ProfileUpdateForm) -> Result<User, Error> {
        let ProfileUpdate { email, profile } = ProfileUpdate::try_from(form)?;
        if self.users.email_taken(&email, Some(actor.id)).await? {
            return Err(duplicate(
                "email",
                "email_taken",
                "a user with that email already exists",
            ));
        }
        let mut user = self.current_user(&actor.id).await?;
        user.email = email;
        user.profile = profile;
        user.updated_at = self.clock.utc();
        self.users.update(&user).await?;
        Ok(user)
    }

    async fn list_users(
        &self,
        actor: &User,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, Error> {
        actor.require_admin()?;
        Ok(self.users.list(&filter, page).await?)
    }

    async fn change_role(&self, actor: &User, user_id: UserId, role: Role) -> Result<User, Error> {
        actor.require_admin()?;
        let mut user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        if user.role != role {
            let previous = user.role;
            user.role = role;
            user.updated_at = self.clock.utc();
            self.users.update(&user).await?;
            info!(
                user_id = %user.id,
                admin_id = %actor.id,
                from = %previous,
                to = %role,
                "changed user role"
            );
        }
        Ok(user)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
