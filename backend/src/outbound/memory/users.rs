//! In-memory `UserRepository`.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{StoredCredentials, UserFilter, UserRepositoryError, UserRepository};
use crate::domain::{Email, PasswordHash, User, UserId, Username};

use super::{MemoryStore, to_count};

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserRepositoryError> {
        let mut tables = self.lock(UserRepositoryError::connection)?;
        if tables.users.iter().any(|(row, _)| row.username == user.username) {
            return Err(UserRepositoryError::conflict("that username is already taken"));
        }
        if tables.users.iter().any(|(row, _)| row.email == user.email) {
            return Err(UserRepositoryError::conflict("that email is already registered"));
        }
        tables.users.push((user.clone(), password_hash.clone()));
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut tables = self.lock(UserRepositoryError::connection)?;
        if tables
            .users
            .iter()
            .any(|(row, _)| row.id != user.id && row.email == user.email)
        {
            return Err(UserRepositoryError::conflict("that email is already registered"));
        }
        if let Some((row, _)) = tables.users.iter_mut().find(|(row, _)| row.id == user.id) {
            // Usernames and creation time are immutable.
            let (username, created_at) = (row.username.clone(), row.created_at);
            *row = User {
                username,
                created_at,
                ..user.clone()
            };
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.lock(UserRepositoryError::connection)?;
        Ok(tables
            .users
            .iter()
            .find(|(row, _)| row.id == *id)
            .map(|(row, _)| row.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let tables = self.lock(UserRepositoryError::connection)?;
        Ok(tables
            .users
            .iter()
            .find(|(row, _)| row.username.as_ref() == username)
            .map(|(user, hash)| StoredCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn username_taken(&self, username: &Username) -> Result<bool, UserRepositoryError> {
        let tables = self.lock(UserRepositoryError::connection)?;
        Ok(tables.users.iter().any(|(row, _)| row.username == *username))
    }

    async fn email_taken(
        &self,
        email: &Email,
        excluding: Option<UserId>,
    ) -> Result<bool, UserRepositoryError> {
        let tables = self.lock(UserRepositoryError::connection)?;
        Ok(tables
            .users
            .iter()
            .any(|(row, _)| row.email == *email && Some(row.id) != excluding))
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError> {
        let tables = self.lock(UserRepositoryError::connection)?;
        let mut matching: Vec<User> = tables
            .users
            .iter()
            .map(|(row, _)| row)
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.username
                .as_ref()
                .cmp(b.username.as_ref())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(Page::new(page.slice(&matching), page, to_count(matching.len())))
    }

    async fn count(&self) -> Result<u64, UserRepositoryError> {
        let tables = self.lock(UserRepositoryError::connection)?;
        Ok(to_count(tables.users.len()))
    }

    async fn recent(&self, limit: u32) -> Result<Vec<User>, UserRepositoryError> {
        let tables = self.lock(UserRepositoryError::connection)?;
        let mut users: Vec<User> = tables.users.iter().map(|(row, _)| row.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        users.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(users)
    }
}
