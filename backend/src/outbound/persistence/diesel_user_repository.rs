//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{StoredCredentials, UserFilter, UserRepositoryError, UserRepository};
use crate::domain::{Email, PasswordHash, ProfileFields, Role, User, UserId, Username};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_helpers::{contains_pattern, count_to_u64, page_window, parse_stored};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Convert a row into a validated user and its hash.
fn row_to_credentials(row: UserRow) -> Result<StoredCredentials, UserRepositoryError> {
    let UserRow {
        id,
        username,
        email,
        password_hash,
        first_name,
        last_name,
        role,
        bio,
        profile_image_url,
        is_email_verified,
        created_at,
        updated_at,
    } = row;

    let invalid = |err: crate::domain::UserValidationError| UserRepositoryError::query(err.to_string());
    let user = User {
        id: UserId::from_uuid(id),
        username: Username::new(username).map_err(invalid)?,
        email: Email::new(email).map_err(invalid)?,
        role: parse_stored::<Role, _>("role", &role)?,
        profile: ProfileFields {
            first_name,
            last_name,
            bio,
            profile_image_url,
        },
        is_email_verified,
        created_at,
        updated_at,
    };
    Ok(StoredCredentials {
        user,
        password_hash: PasswordHash::from_stored(password_hash),
    })
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    row_to_credentials(row).map(|stored| stored.user)
}

fn filtered(filter: &UserFilter) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table.into_boxed();
    if let Some(role) = filter.role {
        query = query.filter(users::role.eq(role.as_str()));
    }
    if let Some(needle) = filter.search.as_deref() {
        let pattern = contains_pattern(needle);
        query = query.filter(
            users::username
                .ilike(pattern.clone())
                .or(users::email.ilike(pattern.clone()))
                .or(users::first_name.ilike(pattern.clone()))
                .or(users::last_name.ilike(pattern)),
        );
    }
    query
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: password_hash.as_str(),
            first_name: &user.profile.first_name,
            last_name: &user.profile.last_name,
            role: user.role.as_str(),
            bio: user.profile.bio.as_deref(),
            profile_image_url: user.profile.profile_image_url.as_deref(),
            is_email_verified: user.is_email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserUpdate {
            email: user.email.as_ref(),
            first_name: &user.profile.first_name,
            last_name: &user.profile.last_name,
            role: user.role.as_str(),
            bio: user.profile.bio.as_deref(),
            profile_image_url: user.profile.profile_image_url.as_deref(),
            is_email_verified: user.is_email_verified,
            updated_at: user.updated_at,
        };
        diesel::update(users::table.find(user.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_credentials).transpose()
    }

    async fn username_taken(&self, username: &Username) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::username.eq(username.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn email_taken(
        &self,
        email: &Email,
        excluding: Option<UserId>,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = users::table
            .filter(users::email.eq(email.as_ref().to_owned()))
            .into_boxed();
        if let Some(id) = excluding {
            query = query.filter(users::id.ne(*id.as_uuid()));
        }
        query
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (offset, limit) = page_window(page)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = filtered(filter)
            .order((users::username.asc(), users::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = rows
            .into_iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, count_to_u64(total)?))
    }

    async fn count(&self) -> Result<u64, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        count_to_u64(total)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::created_at.desc())
            .limit(i64::from(limit))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn valid_row() -> UserRow {
        let now = Utc::now();
        UserRow {
            id: Uuid::new_v4(),
            username: "ada".to_owned(),
            email: "ada@example.org".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: String::new(),
            role: "educator".to_owned(),
            bio: None,
            profile_image_url: None,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn rows_convert_to_users(valid_row: UserRow) {
        let stored = row_to_credentials(valid_row).expect("valid row");
        assert_eq!(stored.user.role, Role::Educator);
        assert_eq!(stored.user.username.as_ref(), "ada");
        assert_eq!(stored.password_hash.as_str(), "$argon2id$stub");
    }

    #[rstest]
    #[case::role(|row: &mut UserRow| row.role = "owner".to_owned())]
    #[case::username(|row: &mut UserRow| row.username = "bad name".to_owned())]
    #[case::email(|row: &mut UserRow| row.email = "nobody".to_owned())]
    fn corrupt_rows_are_query_failures(mut valid_row: UserRow, #[case] corrupt: fn(&mut UserRow)) {
        corrupt(&mut valid_row);
        let error = row_to_user(valid_row).expect_err("corrupt row");
        assert!(matches!(error, UserRepositoryError::Query { .. }));
    }
}
