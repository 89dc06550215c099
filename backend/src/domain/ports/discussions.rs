//! Driving port for the discussion forum.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{
    Comment, CommentNode, DiscussionThread, Error, LikeToggle, ThreadForm, ThreadModeration,
    ThreadSummary, User,
};

/// Number of threads per listing page.
pub const THREADS_PAGE_SIZE: u32 = 15;

/// A thread with its comment tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadDetail {
    pub thread: DiscussionThread,
    pub comments: Vec<CommentNode>,
}

/// Domain use-case port for discussions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Discussions: Send + Sync {
    /// Page through threads.
    async fn list_threads(&self, page: PageRequest) -> Result<Page<ThreadSummary>, Error>;

    /// Fetch a thread with its comments and count the view.
    async fn get_thread(&self, thread_id: Uuid) -> Result<ThreadDetail, Error>;

    /// Open a thread, optionally attached to a module.
    async fn create_thread(&self, actor: &User, form: ThreadForm)
    -> Result<DiscussionThread, Error>;

    /// Edit a thread as its author.
    async fn update_thread(
        &self,
        actor: &User,
        thread_id: Uuid,
        form: ThreadForm,
    ) -> Result<DiscussionThread, Error>;

    /// Comment on a thread or reply to a comment in it.
    async fn add_comment(
        &self,
        actor: &User,
        thread_id: Uuid,
        content: String,
        parent_id: Option<Uuid>,
    ) -> Result<Comment, Error>;

    /// Edit a comment as its author.
    async fn edit_comment(
        &self,
        actor: &User,
        comment_id: Uuid,
        content: String,
    ) -> Result<Comment, Error>;

    /// Like or unlike a comment.
    async fn toggle_like(&self, actor: &User, comment_id: Uuid) -> Result<LikeToggle, Error>;

    /// Admin status and pin changes.
    async fn moderate_thread(
        &self,
        actor: &User,
        thread_id: Uuid,
        moderation: ThreadModeration,
    ) -> Result<DiscussionThread, Error>;

    /// Admin comment removal.
    async fn delete_comment(&self, actor: &User, comment_id: Uuid) -> Result<(), Error>;
}
