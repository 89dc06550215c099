//! Port for learning module persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{LearningModule, ModuleFilter, Slug, UserId};

use super::repository_error;

repository_error!(
    /// A unique title or slug collided.
    Module,
    "module"
);

/// Port for reading and writing learning modules.
///
/// Listings follow the catalogue order: `order` ascending, then newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// Insert a new module.
    async fn insert(&self, module: &LearningModule) -> Result<(), ModuleRepositoryError>;

    /// Persist changes to an existing module.
    async fn update(&self, module: &LearningModule) -> Result<(), ModuleRepositoryError>;

    /// Fetch a module by id.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<LearningModule>, ModuleRepositoryError>;

    /// Fetch a module by slug.
    async fn find_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<LearningModule>, ModuleRepositoryError>;

    /// Whether another module (not `excluding`) already uses `title`.
    async fn title_taken(
        &self,
        title: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, ModuleRepositoryError>;

    /// Whether another module (not `excluding`) already uses `slug`.
    async fn slug_taken(
        &self,
        slug: &Slug,
        excluding: Option<Uuid>,
    ) -> Result<bool, ModuleRepositoryError>;

    /// Page through published modules matching `filter`.
    async fn list_published(
        &self,
        filter: &ModuleFilter,
        page: PageRequest,
    ) -> Result<Page<LearningModule>, ModuleRepositoryError>;

    /// Most recently published modules.
    async fn recent_published(
        &self,
        limit: u32,
    ) -> Result<Vec<LearningModule>, ModuleRepositoryError>;

    /// Most recently created modules in any state.
    async fn recent(&self, limit: u32) -> Result<Vec<LearningModule>, ModuleRepositoryError>;

    /// Modules authored by `author`, in catalogue order.
    async fn list_by_author(
        &self,
        author: &UserId,
    ) -> Result<Vec<LearningModule>, ModuleRepositoryError>;

    /// Number of published modules.
    async fn count_published(&self) -> Result<u64, ModuleRepositoryError>;

    /// Number of modules in any state.
    async fn count(&self) -> Result<u64, ModuleRepositoryError>;
}
