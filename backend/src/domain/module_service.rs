//! Learning module domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    DiscussionRepository, ModuleDetail, ModuleRepository, Modules, QuizRepository,
};
use crate::domain::{
    Error, LearningModule, ModuleFields, ModuleFilter, ModuleForm, Role, Slug, User,
};

fn module_not_found(slug: &str) -> Error {
    Error::not_found(format!("module {slug} not found"))
}

/// Module service over module, quiz and discussion repositories.
#[derive(Clone)]
pub struct ModuleService<M, Q, D> {
    modules: Arc<M>,
    quizzes: Arc<Q>,
    discussions: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<M, Q, D> ModuleService<M, Q, D> {
    /// Create the service.
    pub fn new(
        modules: Arc<M>,
        quizzes: Arc<Q>,
        discussions: Arc<D>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            modules,
            quizzes,
            discussions,
            clock,
        }
    }
}

impl<M, Q, D> ModuleService<M, Q, D>
where
    M: ModuleRepository,
{
    async fn find_by_slug(&self, raw: &str) -> Result<LearningModule, Error> {
        let slug = Slug::new(raw).map_err(|_| module_not_found(raw))?;
        self.modules
            .find_by_slug(&slug)
            .await?
            .ok_or_else(|| module_not_found(raw))
    }

    async fn ensure_unique(&self, fields: &ModuleFields, excluding: Option<uuid::Uuid>) -> Result<(), Error> {
        if self.modules.title_taken(&fields.title, excluding).await? {
            return Err(Error::conflict("a module with that title already exists")
                .with_details(json!({ "field": "title", "code": "title_taken" })));
        }
        if self.modules.slug_taken(&fields.slug, excluding).await? {
            return Err(Error::conflict("a module with that slug already exists")
                .with_details(json!({ "field": "slug", "code": "slug_taken" })));
        }
        Ok(())
    }
}

#[async_trait]
impl<M, Q, D> Modules for ModuleService<M, Q, D>
where
    M: ModuleRepository,
    Q: QuizRepository,
    D: DiscussionRepository,
{
    async fn list_published(
        &self,
        filter: ModuleFilter,
        page: PageRequest,
    ) -> Result<Page<LearningModule>, Error> {
        Ok(self.modules.list_published(&filter, page).await?)
    }

    async fn get_by_slug(&self, viewer: Option<User>, slug: String) -> Result<ModuleDetail, Error> {
        let module = self.find_by_slug(&slug).await?;
        if !module.visible_to(viewer.as_ref()) {
            return Err(module_not_found(&slug));
        }
        let quizzes = self.quizzes.published_for_module(&module.id).await?;
        let threads = self.discussions.threads_for_module(&module.id).await?;
        Ok(ModuleDetail {
            module,
            quizzes,
            threads,
        })
    }

    async fn create(&self, actor: &User, form: ModuleForm) -> Result<LearningModule, Error> {
        actor.require_role(Role::Educator, "create modules")?;
        let fields = ModuleFields::try_from(form)?;
        self.ensure_unique(&fields, None).await?;
        let module = LearningModule::create(fields, actor.id, self.clock.utc());
        self.modules.insert(&module).await?;
        info!(module_id = %module.id, slug = %module.slug, author = %actor.id, "created module");
        Ok(module)
    }

    async fn update(
        &self,
        actor: &User,
        slug: String,
        form: ModuleForm,
    ) -> Result<LearningModule, Error> {
        let mut module = self.find_by_slug(&slug).await?;
        if !actor.can_manage(module.created_by.as_ref()) {
            return Err(Error::forbidden("only the module author or an admin may edit it"));
        }
        let fields = ModuleFields::try_from(form)?;
        self.ensure_unique(&fields, Some(module.id)).await?;
        module.apply(fields, self.clock.utc());
        self.modules.update(&module).await?;
        info!(module_id = %module.id, status = %module.status, "updated module");
        Ok(module)
    }
}
