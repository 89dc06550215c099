//! Discussion forum service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{DiscussionRepository, Discussions, ModuleRepository, ThreadDetail};
use crate::domain::{
    Comment, CommentContent, DiscussionThread, Error, LikeToggle, ThreadFields, ThreadForm,
    ThreadModeration, ThreadSummary, User, build_comment_tree,
};

fn thread_not_found(thread_id: &Uuid) -> Error {
    Error::not_found(format!("thread {thread_id} not found"))
}

fn comment_not_found(comment_id: &Uuid) -> Error {
    Error::not_found(format!("comment {comment_id} not found"))
}

/// Discussion service over discussion and module repositories.
#[derive(Clone)]
pub struct DiscussionService<D, M> {
    discussions: Arc<D>,
    modules: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<D, M> DiscussionService<D, M> {
    /// Create the service.
    pub fn new(discussions: Arc<D>, modules: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            discussions,
            modules,
            clock,
        }
    }
}

impl<D, M> DiscussionService<D, M>
where
    D: DiscussionRepository,
    M: ModuleRepository,
{
    async fn validated_fields(&self, form: ThreadForm) -> Result<ThreadFields, Error> {
        let fields = ThreadFields::try_from(form)?;
        if let Some(module_id) = fields.module_id
            && self.modules.find_by_id(&module_id).await?.is_none()
        {
            return Err(Error::invalid_field(
                "moduleId",
                "unknown_module",
                format!("module {module_id} does not exist"),
            ));
        }
        Ok(fields)
    }

    async fn thread(&self, thread_id: &Uuid) -> Result<DiscussionThread, Error> {
        self.discussions
            .find_thread(thread_id)
            .await?
            .ok_or_else(|| thread_not_found(thread_id))
    }

    async fn comment(&self, comment_id: &Uuid) -> Result<Comment, Error> {
        self.discussions
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| comment_not_found(comment_id))
    }
}

#[async_trait]
impl<D, M> Discussions for DiscussionService<D, M>
where
    D: DiscussionRepository,
    M: ModuleRepository,
{
    async fn list_threads(&self, page: PageRequest) -> Result<Page<ThreadSummary>, Error> {
        Ok(self.discussions.list_threads(page).await?)
    }

    async fn get_thread(&self, thread_id: Uuid) -> Result<ThreadDetail, Error> {
        let mut thread = self.thread(&thread_id).await?;
        self.discussions.record_view(&thread.id).await?;
        thread.views_count += 1;
        let comments = build_comment_tree(self.discussions.comments(&thread.id).await?);
        Ok(ThreadDetail { thread, comments })
    }

    async fn create_thread(
        &self,
        actor: &User,
        form: ThreadForm,
    ) -> Result<DiscussionThread, Error> {
        let fields = self.validated_fields(form).await?;
        let thread = DiscussionThread::create(fields, actor.id, self.clock.utc());
        self.discussions.insert_thread(&thread).await?;
        info!(thread_id = %thread.id, author = %actor.id, "opened thread");
        Ok(thread)
    }

    async fn update_thread(
        &self,
        actor: &User,
        thread_id: Uuid,
        form: ThreadForm,
    ) -> Result<DiscussionThread, Error> {
        let mut thread = self.thread(&thread_id).await?;
        if thread.author_id != actor.id {
            return Err(Error::forbidden("only the thread author may edit it"));
        }
        let fields = self.validated_fields(form).await?;
        thread.title = fields.title;
        thread.content = fields.content;
        thread.module_id = fields.module_id;
        thread.updated_at = self.clock.utc();
        self.discussions.update_thread(&thread).await?;
        Ok(thread)
    }

    async fn add_comment(
        &self,
        actor: &User,
        thread_id: Uuid,
        content: String,
        parent_id: Option<Uuid>,
    ) -> Result<Comment, Error> {
        let content = CommentContent::new(&content)?;
        let thread = self.thread(&thread_id).await?;
        if !thread.accepts_comments() {
            return Err(Error::forbidden("this thread is closed for comments"));
        }
        if let Some(parent_id) = parent_id {
            let parent = self.discussions.find_comment(&parent_id).await?;
            if parent.is_none_or(|parent| parent.thread_id != thread.id) {
                return Err(Error::invalid_field(
                    "parentId",
                    "parent_not_in_thread",
                    "replies must target a comment in the same thread",
                ));
            }
        }
        let comment = Comment::create(thread.id, actor.id, content, parent_id, self.clock.utc());
        self.discussions.add_comment(&comment).await?;
        info!(comment_id = %comment.id, thread_id = %thread.id, "added comment");
        Ok(comment)
    }

    async fn edit_comment(
        &self,
        actor: &User,
        comment_id: Uuid,
        content: String,
    ) -> Result<Comment, Error> {
        let mut comment = self.comment(&comment_id).await?;
        if comment.author_id != actor.id {
            return Err(Error::forbidden("only the comment author may edit it"));
        }
        comment.edit(CommentContent::new(&content)?, self.clock.utc());
        self.discussions.update_comment(&comment).await?;
        Ok(comment)
    }

    async fn toggle_like(&self, actor: &User, comment_id: Uuid) -> Result<LikeToggle, Error> {
        let comment = self.comment(&comment_id).await?;
        Ok(self.discussions.toggle_like(&comment.id, &actor.id).await?)
    }

    async fn moderate_thread(
        &self,
        actor: &User,
        thread_id: Uuid,
        moderation: ThreadModeration,
    ) -> Result<DiscussionThread, Error> {
        actor.require_admin()?;
        let mut thread = self.thread(&thread_id).await?;
        if let Some(status) = moderation.status {
            thread.status = status;
        }
        if let Some(is_pinned) = moderation.is_pinned {
            thread.is_pinned = is_pinned;
        }
        self.discussions.update_thread(&thread).await?;
        info!(
            thread_id = %thread.id,
            status = %thread.status,
            pinned = thread.is_pinned,
            admin_id = %actor.id,
            "moderated thread"
        );
        Ok(thread)
    }

    async fn delete_comment(&self, actor: &User, comment_id: Uuid) -> Result<(), Error> {
        actor.require_admin()?;
        if self.discussions.delete_comment(&comment_id).await? {
            info!(%comment_id, admin_id = %actor.id, "deleted comment");
            Ok(())
        } else {
            Err(comment_not_found(&comment_id))
        }
    }
}

#[cfg(test)]
#[path = "discussion_service_tests.rs"]
mod tests;
