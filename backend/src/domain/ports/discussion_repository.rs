//! Port for discussion threads, comments and likes.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Comment, DiscussionThread, LikeToggle, ThreadSummary, UserId};

use super::repository_error;

repository_error!(
    /// A referenced row is missing or a unique key collided.
    Discussion,
    "discussion"
);

/// Port for forum persistence.
///
/// Thread listings put pinned threads first, then the most recently updated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscussionRepository: Send + Sync {
    /// Insert a new thread.
    async fn insert_thread(&self, thread: &DiscussionThread)
    -> Result<(), DiscussionRepositoryError>;

    /// Persist changes to a thread.
    async fn update_thread(&self, thread: &DiscussionThread)
    -> Result<(), DiscussionRepositoryError>;

    /// Fetch a thread by id.
    async fn find_thread(
        &self,
        id: &Uuid,
    ) -> Result<Option<DiscussionThread>, DiscussionRepositoryError>;

    /// Atomically increment a thread's view counter.
    async fn record_view(&self, id: &Uuid) -> Result<(), DiscussionRepositoryError>;

    /// Page through threads with their comment counts.
    async fn list_threads(
        &self,
        page: PageRequest,
    ) -> Result<Page<ThreadSummary>, DiscussionRepositoryError>;

    /// Threads attached to a module with their comment counts.
    async fn threads_for_module(
        &self,
        module_id: &Uuid,
    ) -> Result<Vec<ThreadSummary>, DiscussionRepositoryError>;

    /// All comments of a thread in creation order.
    async fn comments(&self, thread_id: &Uuid) -> Result<Vec<Comment>, DiscussionRepositoryError>;

    /// Fetch a comment by id.
    async fn find_comment(&self, id: &Uuid) -> Result<Option<Comment>, DiscussionRepositoryError>;

    /// Insert a comment and bump the thread's `updated_at` to its creation time.
    async fn add_comment(&self, comment: &Comment) -> Result<(), DiscussionRepositoryError>;

    /// Persist an edited comment.
    async fn update_comment(&self, comment: &Comment) -> Result<(), DiscussionRepositoryError>;

    /// Delete a comment with its replies and likes; `false` when absent.
    async fn delete_comment(&self, id: &Uuid) -> Result<bool, DiscussionRepositoryError>;

    /// Add the user's like when absent, remove it otherwise.
    async fn toggle_like(
        &self,
        comment_id: &Uuid,
        user_id: &UserId,
    ) -> Result<LikeToggle, DiscussionRepositoryError>;
}
