//! In-memory `ModuleRepository`.

use std::cmp::Reverse;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{ModuleRepository, ModuleRepositoryError};
use crate::domain::{LearningModule, ModuleFilter, ModuleStatus, Slug, UserId};

use super::{MemoryStore, Tables, to_count};

fn catalogue_order(modules: &mut [LearningModule]) {
    modules.sort_by_key(|module| (module.order, Reverse(module.created_at)));
}

fn clash(tables: &Tables, module: &LearningModule) -> Option<ModuleRepositoryError> {
    let others = tables.modules.iter().filter(|row| row.id != module.id);
    for row in others {
        if row.title == module.title {
            return Some(ModuleRepositoryError::conflict(
                "a module with that title already exists",
            ));
        }
        if row.slug == module.slug {
            return Some(ModuleRepositoryError::conflict(
                "a module with that slug already exists",
            ));
        }
    }
    None
}

fn limited(mut modules: Vec<LearningModule>, limit: u32) -> Vec<LearningModule> {
    modules.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    modules
}

#[async_trait]
impl ModuleRepository for MemoryStore {
    async fn insert(&self, module: &LearningModule) -> Result<(), ModuleRepositoryError> {
        let mut tables = self.lock(ModuleRepositoryError::connection)?;
        if let Some(error) = clash(&tables, module) {
            return Err(error);
        }
        tables.modules.push(module.clone());
        Ok(())
    }

    async fn update(&self, module: &LearningModule) -> Result<(), ModuleRepositoryError> {
        let mut tables = self.lock(ModuleRepositoryError::connection)?;
        if let Some(error) = clash(&tables, module) {
            return Err(error);
        }
        if let Some(row) = tables.modules.iter_mut().find(|row| row.id == module.id) {
            *row = module.clone();
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<LearningModule>, ModuleRepositoryError> {
        let tables = self.lock(ModuleRepositoryError::connection)?;
        Ok(tables.modules.iter().find(|row| row.id == *id).cloned())
    }

    async fn find_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<LearningModule>, ModuleRepositoryError> {
        let tables = self.lock(ModuleRepositoryError::connection)?;
        Ok(tables.modules.iter().find(|row| row.slug == *slug).cloned())
    }

    async fn title_taken(
        &self,
        title: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, ModuleRepositoryError> {
        let tables = self.lock(ModuleRepositoryError::connection)?;
        Ok(tables
            .modules
            .iter()
            .any(|row| row.title == title && Some(row.id) != excluding))
    }

    async fn slug_taken(
        &self,
        slug: &Slug,
        excluding: Option<Uuid>,
    ) -> Result<bool, ModuleRepositoryError> {
        let tables = self.lock(ModuleRepositoryError::connection)?;
        Ok(tables
            .modules
            .iter()
            .any(|row| row.slug == *slug && Some(row.id) != excluding))
    }

    async fn list_published(
        &self,
        filter: &ModuleFilter,
        page: PageRequest,
    ) -> Result<Page<LearningModule>, ModuleRepositoryError> {
        let tables = self.lock(ModuleRepositoryError::connection)?;
        let mut matching: Vec<LearningModule> = tables
            .modules
            .iter()
            .filter(|row| row.status == ModuleStatus::Published && filter.matches(row))
            .cloned()
            .collect();
        catalogue_order(&mut matching);
        Ok(Page::new(page.slice(&matching), page, to_count(matching.len())))
    }

    async fn recent_published(
        &self,
        limit: u32,
    ) -> Result<Vec<LearningModule>, ModuleRepositoryError> {
        let tables = self.lock(ModuleRepositoryError::connection)?;
        let mut published: Vec<LearningModule> = tables
            .modules
            .iter()
            .filter(|row| row.status == ModuleStatus::Published)
            .cloned()
            .collect();
        published.sort_by_key(|row| (Reverse(row.published_at), Reverse(row.created_at)));
        Ok(limited(published, limit))
    }

    async fn recent(&self, limit: u32) -> Result<Vec<LearningModule>, ModuleRepositoryError> {
        let tables = self.lock(ModuleRepositoryError::connection)?;
        let mut modules = tables.modules.clone();
        modules.sort_by_key(|row| Reverse(row.created_at));
        Ok(limited(modules, limit))
    }

    async fn list_by_author(
        &self,
        author: &UserId,
    ) -> Result<Vec<LearningModule>, ModuleRepositoryError> {
        let tables = self.lock(ModuleRepositoryError::connection)?;
        let mut authored: Vec<LearningModule> = tables
            .modules
            .iter()
            .filter(|row| row.created_by.as_ref() == Some(author))
            .cloned()
            .collect();
        catalogue_order(&mut authored);
        Ok(authored)
    }

    async fn count_published(&self) -> Result<u64, ModuleRepositoryError> {
        let tables = self.lock(ModuleRepositoryError::connection)?;
        Ok(to_count(
            tables
                .modules
                .iter()
                .filter(|row| row.status == ModuleStatus::Published)
                .count(),
        ))
    }

    async fn count(&self) -> Result<u64, ModuleRepositoryError> {
        let tables = self.lock(ModuleRepositoryError::connection)?;
        Ok(to_count(tables.modules.len()))
    }
}
