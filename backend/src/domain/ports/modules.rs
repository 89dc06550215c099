//! Driving port for the learning module catalogue.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, LearningModule, ModuleFilter, ModuleForm, Quiz, ThreadSummary, User};

/// Number of modules per catalogue page.
pub const MODULES_PAGE_SIZE: u32 = 12;

/// A module with its published quizzes and discussion threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDetail {
    pub module: LearningModule,
    pub quizzes: Vec<Quiz>,
    pub threads: Vec<ThreadSummary>,
}

/// Domain use-case port for modules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Modules: Send + Sync {
    /// Page through published modules.
    async fn list_published(
        &self,
        filter: ModuleFilter,
        page: PageRequest,
    ) -> Result<Page<LearningModule>, Error>;

    /// Look a module up by slug. Unpublished modules are only visible to
    /// their author and admins.
    async fn get_by_slug(&self, viewer: Option<User>, slug: String) -> Result<ModuleDetail, Error>;

    /// Create a module authored by the acting educator.
    async fn create(&self, actor: &User, form: ModuleForm) -> Result<LearningModule, Error>;

    /// Edit a module as its author or an admin.
    async fn update(
        &self,
        actor: &User,
        slug: String,
        form: ModuleForm,
    ) -> Result<LearningModule, Error>;
}
