//! PostgreSQL-backed `ModuleRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{ModuleRepository, ModuleRepositoryError};
use crate::domain::{LearningModule, ModuleFilter, ModuleStatus, Slug, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_helpers::{contains_pattern, count_to_u64, page_window, parse_stored};
use super::models::ModuleRow;
use super::pool::DbPool;
use super::schema::learning_modules;

const PUBLISHED: &str = ModuleStatus::Published.as_str();

/// Diesel-backed implementation of the module repository port.
#[derive(Clone)]
pub struct DieselModuleRepository {
    pool: DbPool,
}

impl DieselModuleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load(
        &self,
        query: learning_modules::BoxedQuery<'static, Pg>,
    ) -> Result<Vec<LearningModule>, ModuleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ModuleRow> = query
            .select(ModuleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_module).collect()
    }

    async fn exists(
        &self,
        query: learning_modules::BoxedQuery<'static, Pg>,
    ) -> Result<bool, ModuleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        query
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_diesel_error)
    }

    async fn count_where(
        &self,
        query: learning_modules::BoxedQuery<'static, Pg>,
    ) -> Result<u64, ModuleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        count_to_u64(total)
    }
}

fn module_to_row(module: &LearningModule) -> ModuleRow {
    ModuleRow {
        id: module.id,
        title: module.title.clone(),
        slug: module.slug.as_ref().to_owned(),
        description: module.description.clone(),
        content: module.content.clone(),
        created_by: module.created_by.map(|id| *id.as_uuid()),
        status: module.status.as_str().to_owned(),
        sort_order: module.order,
        image_url: module.image_url.clone(),
        attachment_url: module.attachment_url.clone(),
        difficulty_level: module.difficulty_level.as_str().to_owned(),
        estimated_minutes: module.estimated_minutes,
        created_at: module.created_at,
        updated_at: module.updated_at,
        published_at: module.published_at,
    }
}

fn row_to_module(row: ModuleRow) -> Result<LearningModule, ModuleRepositoryError> {
    Ok(LearningModule {
        id: row.id,
        slug: Slug::new(row.slug).map_err(|err| ModuleRepositoryError::query(err.to_string()))?,
        status: parse_stored("status", &row.status)?,
        difficulty_level: parse_stored("difficulty_level", &row.difficulty_level)?,
        title: row.title,
        description: row.description,
        content: row.content,
        created_by: row.created_by.map(UserId::from_uuid),
        order: row.sort_order,
        image_url: row.image_url,
        attachment_url: row.attachment_url,
        estimated_minutes: row.estimated_minutes,
        created_at: row.created_at,
        updated_at: row.updated_at,
        published_at: row.published_at,
    })
}

fn published_matching(filter: &ModuleFilter) -> learning_modules::BoxedQuery<'static, Pg> {
    let mut query = learning_modules::table
        .filter(learning_modules::status.eq(PUBLISHED))
        .into_boxed();
    if let Some(level) = filter.difficulty {
        query = query.filter(learning_modules::difficulty_level.eq(level.as_str()));
    }
    if let Some(needle) = filter.search.as_deref() {
        let pattern = contains_pattern(needle);
        query = query.filter(
            learning_modules::title
                .ilike(pattern.clone())
                .or(learning_modules::description.ilike(pattern)),
        );
    }
    query
}

fn excluding(
    mut query: learning_modules::BoxedQuery<'static, Pg>,
    id: Option<Uuid>,
) -> learning_modules::BoxedQuery<'static, Pg> {
    if let Some(id) = id {
        query = query.filter(learning_modules::id.ne(id));
    }
    query
}

#[async_trait]
impl ModuleRepository for DieselModuleRepository {
    async fn insert(&self, module: &LearningModule) -> Result<(), ModuleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(learning_modules::table)
            .values(&module_to_row(module))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, module: &LearningModule) -> Result<(), ModuleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(learning_modules::table.find(module.id))
            .set(&module_to_row(module))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<LearningModule>, ModuleRepositoryError> {
        let rows = self
            .load(learning_modules::table.find(*id).into_boxed())
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn find_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<LearningModule>, ModuleRepositoryError> {
        let rows = self
            .load(
                learning_modules::table
                    .filter(learning_modules::slug.eq(slug.as_ref().to_owned()))
                    .into_boxed(),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn title_taken(
        &self,
        title: &str,
        excluding_id: Option<Uuid>,
    ) -> Result<bool, ModuleRepositoryError> {
        let query = learning_modules::table
            .filter(learning_modules::title.eq(title.to_owned()))
            .into_boxed();
        self.exists(excluding(query, excluding_id)).await
    }

    async fn slug_taken(
        &self,
        slug: &Slug,
        excluding_id: Option<Uuid>,
    ) -> Result<bool, ModuleRepositoryError> {
        let query = learning_modules::table
            .filter(learning_modules::slug.eq(slug.as_ref().to_owned()))
            .into_boxed();
        self.exists(excluding(query, excluding_id)).await
    }

    async fn list_published(
        &self,
        filter: &ModuleFilter,
        page: PageRequest,
    ) -> Result<Page<LearningModule>, ModuleRepositoryError> {
        let (offset, limit) = page_window(page)?;
        let total = self.count_where(published_matching(filter)).await?;
        let items = self
            .load(
                published_matching(filter)
                    .order((
                        learning_modules::sort_order.asc(),
                        learning_modules::created_at.desc(),
                    ))
                    .offset(offset)
                    .limit(limit),
            )
            .await?;
        Ok(Page::new(items, page, total))
    }

    async fn recent_published(
        &self,
        limit: u32,
    ) -> Result<Vec<LearningModule>, ModuleRepositoryError> {
        self.load(
            learning_modules::table
                .filter(learning_modules::status.eq(PUBLISHED))
                .order((
                    learning_modules::published_at.desc(),
                    learning_modules::created_at.desc(),
                ))
                .limit(i64::from(limit))
                .into_boxed(),
        )
        .await
    }

    async fn recent(&self, limit: u32) -> Result<Vec<LearningModule>, ModuleRepositoryError> {
        self.load(
            learning_modules::table
                .order(learning_modules::created_at.desc())
                .limit(i64::from(limit))
                .into_boxed(),
        )
        .await
    }

    async fn list_by_author(
        &self,
        author: &UserId,
    ) -> Result<Vec<LearningModule>, ModuleRepositoryError> {
        self.load(
            learning_modules::table
                .filter(learning_modules::created_by.eq(*author.as_uuid()))
                .order((
                    learning_modules::sort_order.asc(),
                    learning_modules::created_at.desc(),
                ))
                .into_boxed(),
        )
        .await
    }

    async fn count_published(&self) -> Result<u64, ModuleRepositoryError> {
        self.count_where(
            learning_modules::table
                .filter(learning_modules::status.eq(PUBLISHED))
                .into_boxed(),
        )
        .await
    }

    async fn count(&self) -> Result<u64, ModuleRepositoryError> {
        self.count_where(learning_modules::table.into_boxed()).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::{DifficultyLevel, ModuleFields, ModuleForm};

    fn module() -> LearningModule {
        let fields = ModuleFields::try_from(ModuleForm {
            title: "Voting Rights".to_owned(),
            description: "Who may vote".to_owned(),
            content: "Body".to_owned(),
            status: Some(ModuleStatus::Published),
            difficulty_level: Some(DifficultyLevel::Advanced),
            ..ModuleForm::default()
        })
        .expect("valid module");
        LearningModule::create(fields, UserId::random(), Utc::now())
    }

    #[rstest]
    fn rows_round_trip_through_the_domain() {
        let original = module();
        let restored = row_to_module(module_to_row(&original)).expect("valid row");
        assert_eq!(restored, original);
    }

    #[rstest]
    fn unknown_status_labels_are_rejected() {
        let mut row = module_to_row(&module());
        row.status = "hidden".to_owned();
        let error = row_to_module(row).expect_err("corrupt status");
        assert!(matches!(error, ModuleRepositoryError::Query { .. }));
    }
}
