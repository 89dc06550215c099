//! In-memory `DiscussionRepository`.

use std::collections::HashSet;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{DiscussionRepository, DiscussionRepositoryError};
use crate::domain::{
    Comment, DiscussionThread, LikeToggle, ThreadSummary, UserId, sort_threads,
};

use super::{MemoryStore, Tables, to_count};

fn summaries(tables: &Tables, mut threads: Vec<DiscussionThread>) -> Vec<ThreadSummary> {
    sort_threads(&mut threads);
    threads
        .into_iter()
        .map(|thread| {
            let comment_count = tables
                .comments
                .iter()
                .filter(|comment| comment.thread_id == thread.id)
                .count();
            ThreadSummary {
                thread,
                comment_count: to_count(comment_count),
            }
        })
        .collect()
}

/// Ids of `root` and every reply beneath it.
fn subtree(comments: &[Comment], root: Uuid) -> HashSet<Uuid> {
    let mut doomed = HashSet::from([root]);
    loop {
        let before = doomed.len();
        for comment in comments {
            if comment.parent_id.is_some_and(|parent| doomed.contains(&parent)) {
                doomed.insert(comment.id);
            }
        }
        if doomed.len() == before {
            return doomed;
        }
    }
}

#[async_trait]
impl DiscussionRepository for MemoryStore {
    async fn insert_thread(&self, thread: &DiscussionThread) -> Result<(), DiscussionRepositoryError> {
        let mut tables = self.lock(DiscussionRepositoryError::connection)?;
        tables.threads.push(thread.clone());
        Ok(())
    }

    async fn update_thread(&self, thread: &DiscussionThread) -> Result<(), DiscussionRepositoryError> {
        let mut tables = self.lock(DiscussionRepositoryError::connection)?;
        if let Some(row) = tables.threads.iter_mut().find(|row| row.id == thread.id) {
            let views_count = row.views_count;
            *row = DiscussionThread {
                views_count,
                ..thread.clone()
            };
        }
        Ok(())
    }

    async fn find_thread(
        &self,
        id: &Uuid,
    ) -> Result<Option<DiscussionThread>, DiscussionRepositoryError> {
        let tables = self.lock(DiscussionRepositoryError::connection)?;
        Ok(tables.threads.iter().find(|row| row.id == *id).cloned())
    }

    async fn record_view(&self, id: &Uuid) -> Result<(), DiscussionRepositoryError> {
        let mut tables = self.lock(DiscussionRepositoryError::connection)?;
        if let Some(row) = tables.threads.iter_mut().find(|row| row.id == *id) {
            row.views_count += 1;
        }
        Ok(())
    }

    async fn list_threads(
        &self,
        page: PageRequest,
    ) -> Result<Page<ThreadSummary>, DiscussionRepositoryError> {
        let tables = self.lock(DiscussionRepositoryError::connection)?;
        let all = summaries(&tables, tables.threads.clone());
        Ok(Page::new(page.slice(&all), page, to_count(all.len())))
    }

    async fn threads_for_module(
        &self,
        module_id: &Uuid,
    ) -> Result<Vec<ThreadSummary>, DiscussionRepositoryError> {
        let tables = self.lock(DiscussionRepositoryError::connection)?;
        let linked = tables
            .threads
            .iter()
            .filter(|row| row.module_id == Some(*module_id))
            .cloned()
            .collect();
        Ok(summaries(&tables, linked))
    }

    async fn comments(&self, thread_id: &Uuid) -> Result<Vec<Comment>, DiscussionRepositoryError> {
        let tables = self.lock(DiscussionRepositoryError::connection)?;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|row| row.thread_id == *thread_id)
            .cloned()
            .collect();
        comments.sort_by_key(|row| (row.created_at, row.id));
        Ok(comments)
    }

    async fn find_comment(&self, id: &Uuid) -> Result<Option<Comment>, DiscussionRepositoryError> {
        let tables = self.lock(DiscussionRepositoryError::connection)?;
        Ok(tables.comments.iter().find(|row| row.id == *id).cloned())
    }

    async fn add_comment(&self, comment: &Comment) -> Result<(), DiscussionRepositoryError> {
        let mut tables = self.lock(DiscussionRepositoryError::connection)?;
        let Some(thread) = tables
            .threads
            .iter_mut()
            .find(|row| row.id == comment.thread_id)
        else {
            return Err(DiscussionRepositoryError::conflict(
                "referenced thread does not exist",
            ));
        };
        thread.updated_at = comment.created_at;
        tables.comments.push(comment.clone());
        Ok(())
    }

    async fn update_comment(&self, comment: &Comment) -> Result<(), DiscussionRepositoryError> {
        let mut tables = self.lock(DiscussionRepositoryError::connection)?;
        if let Some(row) = tables.comments.iter_mut().find(|row| row.id == comment.id) {
            row.content.clone_from(&comment.content);
            row.is_edited = comment.is_edited;
            row.updated_at = comment.updated_at;
        }
        Ok(())
    }

    async fn delete_comment(&self, id: &Uuid) -> Result<bool, DiscussionRepositoryError> {
        let mut tables = self.lock(DiscussionRepositoryError::connection)?;
        if !tables.comments.iter().any(|row| row.id == *id) {
            return Ok(false);
        }
        let doomed = subtree(&tables.comments, *id);
        tables.comments.retain(|row| !doomed.contains(&row.id));
        tables
            .likes
            .retain(|(comment_id, _)| !doomed.contains(comment_id));
        Ok(true)
    }

    async fn toggle_like(
        &self,
        comment_id: &Uuid,
        user_id: &UserId,
    ) -> Result<LikeToggle, DiscussionRepositoryError> {
        let mut tables = self.lock(DiscussionRepositoryError::connection)?;
        if !tables.comments.iter().any(|row| row.id == *comment_id) {
            return Err(DiscussionRepositoryError::conflict(
                "referenced comment does not exist",
            ));
        }
        let key = (*comment_id, *user_id.as_uuid());
        let liked = !tables.likes.remove(&key);
        if liked {
            tables.likes.insert(key);
        }
        let mut likes_count = 0;
        if let Some(comment) = tables.comments.iter_mut().find(|row| row.id == *comment_id) {
            comment.likes_count = if liked {
                comment.likes_count + 1
            } else {
                (comment.likes_count - 1).max(0)
            };
            likes_count = comment.likes_count;
        }
        Ok(LikeToggle { liked, likes_count })
    }
}
