//! PostgreSQL-backed `DiscussionRepository` implementation using Diesel ORM.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{DiscussionRepository, DiscussionRepositoryError};
use crate::domain::{Comment, DiscussionThread, LikeToggle, ThreadStatus, ThreadSummary, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_helpers::{count_to_u64, page_window, parse_stored};
use super::models::{CommentRow, NewCommentLikeRow, ThreadRow};
use super::pool::DbPool;
use super::schema::{comment_likes, comments, discussion_threads};

const PINNED: &str = ThreadStatus::Pinned.as_str();

/// Diesel-backed implementation of the discussion repository port.
#[derive(Clone)]
pub struct DieselDiscussionRepository {
    pool: DbPool,
}

impl DieselDiscussionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn thread_to_row(thread: &DiscussionThread) -> ThreadRow {
    ThreadRow {
        id: thread.id,
        title: thread.title.clone(),
        content: thread.content.clone(),
        author_id: *thread.author_id.as_uuid(),
        module_id: thread.module_id,
        status: thread.status.as_str().to_owned(),
        is_pinned: thread.is_pinned,
        views_count: thread.views_count,
        created_at: thread.created_at,
        updated_at: thread.updated_at,
    }
}

fn row_to_thread(row: ThreadRow) -> Result<DiscussionThread, DiscussionRepositoryError> {
    Ok(DiscussionThread {
        id: row.id,
        status: parse_stored("status", &row.status)?,
        title: row.title,
        content: row.content,
        author_id: UserId::from_uuid(row.author_id),
        module_id: row.module_id,
        is_pinned: row.is_pinned,
        views_count: row.views_count,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn comment_to_row(comment: &Comment) -> CommentRow {
    CommentRow {
        id: comment.id,
        thread_id: comment.thread_id,
        author_id: *comment.author_id.as_uuid(),
        content: comment.content.clone(),
        parent_id: comment.parent_id,
        is_edited: comment.is_edited,
        likes_count: comment.likes_count,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

fn row_to_comment(row: CommentRow) -> Comment {
    Comment {
        id: row.id,
        thread_id: row.thread_id,
        author_id: UserId::from_uuid(row.author_id),
        content: row.content,
        parent_id: row.parent_id,
        is_edited: row.is_edited,
        likes_count: row.likes_count,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Attach comment counts to threads loaded in display order.
async fn summarise(
    conn: &mut AsyncPgConnection,
    rows: Vec<ThreadRow>,
) -> Result<Vec<ThreadSummary>, DiscussionRepositoryError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let counts: HashMap<Uuid, i64> = comments::table
        .filter(comments::thread_id.eq_any(ids))
        .group_by(comments::thread_id)
        .select((comments::thread_id, count_star()))
        .load::<(Uuid, i64)>(conn)
        .await
        .map_err(map_diesel_error)?
        .into_iter()
        .collect();
    rows.into_iter()
        .map(|row| {
            let comment_count = count_to_u64(counts.get(&row.id).copied().unwrap_or(0))?;
            Ok(ThreadSummary {
                thread: row_to_thread(row)?,
                comment_count,
            })
        })
        .collect()
}

#[async_trait]
impl DiscussionRepository for DieselDiscussionRepository {
    async fn insert_thread(&self, thread: &DiscussionThread) -> Result<(), DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(discussion_threads::table)
            .values(&thread_to_row(thread))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_thread(&self, thread: &DiscussionThread) -> Result<(), DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = thread_to_row(thread);
        // Views are only ever incremented in place.
        diesel::update(discussion_threads::table.find(thread.id))
            .set((
                discussion_threads::title.eq(row.title),
                discussion_threads::content.eq(row.content),
                discussion_threads::module_id.eq(row.module_id),
                discussion_threads::status.eq(row.status),
                discussion_threads::is_pinned.eq(row.is_pinned),
                discussion_threads::updated_at.eq(row.updated_at),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_thread(
        &self,
        id: &Uuid,
    ) -> Result<Option<DiscussionThread>, DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = discussion_threads::table
            .find(id)
            .select(ThreadRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_thread).transpose()
    }

    async fn record_view(&self, id: &Uuid) -> Result<(), DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(discussion_threads::table.find(id))
            .set(discussion_threads::views_count.eq(discussion_threads::views_count + 1))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_threads(
        &self,
        page: PageRequest,
    ) -> Result<Page<ThreadSummary>, DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (offset, limit) = page_window(page)?;
        let total: i64 = discussion_threads::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ThreadRow> = discussion_threads::table
            .order((
                discussion_threads::is_pinned
                    .or(discussion_threads::status.eq(PINNED))
                    .desc(),
                discussion_threads::updated_at.desc(),
                discussion_threads::id.asc(),
            ))
            .offset(offset)
            .limit(limit)
            .select(ThreadRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = summarise(&mut conn, rows).await?;
        Ok(Page::new(items, page, count_to_u64(total)?))
    }

    async fn threads_for_module(
        &self,
        module_id: &Uuid,
    ) -> Result<Vec<ThreadSummary>, DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ThreadRow> = discussion_threads::table
            .filter(discussion_threads::module_id.eq(module_id))
            .order((
                discussion_threads::is_pinned
                    .or(discussion_threads::status.eq(PINNED))
                    .desc(),
                discussion_threads::updated_at.desc(),
            ))
            .select(ThreadRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        summarise(&mut conn, rows).await
    }

    async fn comments(&self, thread_id: &Uuid) -> Result<Vec<Comment>, DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CommentRow> = comments::table
            .filter(comments::thread_id.eq(thread_id))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_comment).collect())
    }

    async fn find_comment(&self, id: &Uuid) -> Result<Option<Comment>, DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        comments::table
            .find(id)
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(row_to_comment))
            .map_err(map_diesel_error)
    }

    async fn add_comment(&self, comment: &Comment) -> Result<(), DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = comment_to_row(comment);
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(comments::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                diesel::update(discussion_threads::table.find(row.thread_id))
                    .set(discussion_threads::updated_at.eq(row.created_at))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn update_comment(&self, comment: &Comment) -> Result<(), DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(comments::table.find(comment.id))
            .set((
                comments::content.eq(&comment.content),
                comments::is_edited.eq(comment.is_edited),
                comments::updated_at.eq(comment.updated_at),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_comment(&self, id: &Uuid) -> Result<bool, DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(comments::table.find(id))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(map_diesel_error)
    }

    async fn toggle_like(
        &self,
        comment_id: &Uuid,
        user_id: &UserId,
    ) -> Result<LikeToggle, DiscussionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let like = NewCommentLikeRow {
            comment_id: *comment_id,
            user_id: *user_id.as_uuid(),
        };
        conn.transaction(|conn| {
            async move {
                let removed = diesel::delete(comment_likes::table.find((like.comment_id, like.user_id)))
                    .execute(conn)
                    .await?;
                let liked = removed == 0;
                if liked {
                    diesel::insert_into(comment_likes::table)
                        .values(&like)
                        .execute(conn)
                        .await?;
                }
                let target = comments::table.find(like.comment_id);
                let likes_count = if liked {
                    diesel::update(target)
                        .set(comments::likes_count.eq(comments::likes_count + 1))
                        .returning(comments::likes_count)
                        .get_result::<i64>(conn)
                        .await?
                } else {
                    diesel::update(target.filter(comments::likes_count.gt(0)))
                        .set(comments::likes_count.eq(comments::likes_count - 1))
                        .execute(conn)
                        .await?;
                    target
                        .select(comments::likes_count)
                        .first::<i64>(conn)
                        .await?
                };
                Ok(LikeToggle { liked, likes_count })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion.

    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::{CommentContent, ThreadFields, ThreadForm};

    fn thread() -> DiscussionThread {
        let fields = ThreadFields::try_from(ThreadForm {
            title: "Ward boundaries".to_owned(),
            content: "Are they changing?".to_owned(),
            module_id: None,
        })
        .expect("valid thread");
        DiscussionThread::create(fields, UserId::random(), Utc::now())
    }

    #[rstest]
    fn threads_round_trip() {
        let original = thread();
        let restored = row_to_thread(thread_to_row(&original)).expect("valid row");
        assert_eq!(restored, original);
    }

    #[rstest]
    fn unknown_thread_status_is_rejected() {
        let mut row = thread_to_row(&thread());
        row.status = "locked".to_owned();
        assert!(matches!(
            row_to_thread(row),
            Err(DiscussionRepositoryError::Query { .. })
        ));
    }

    #[rstest]
    fn comments_round_trip() {
        let original = Comment::create(
            Uuid::new_v4(),
            UserId::random(),
            CommentContent::new("Yes, next spring").expect("valid comment"),
            None,
            Utc::now(),
        );
        assert_eq!(row_to_comment(comment_to_row(&original)), original);
    }
}
