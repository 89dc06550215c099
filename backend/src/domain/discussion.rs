//! Discussion threads, comments and likes.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::learning_module::{storage_enum, validate_title};
use super::{Error, UserId};

/// Maximum comment length in characters.
pub const COMMENT_MAX: usize = 1000;

/// Moderation state of a thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    #[default]
    Open,
    /// No further comments accepted.
    Closed,
    Pinned,
}

storage_enum!(ThreadStatus, "thread status", {
    Open => "open",
    Closed => "closed",
    Pinned => "pinned",
});

/// Stored discussion thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionThread {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub module_id: Option<Uuid>,
    pub status: ThreadStatus,
    pub is_pinned: bool,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiscussionThread {
    /// Open a new thread authored by `author_id`.
    pub fn create(fields: ThreadFields, author_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            content: fields.content,
            author_id,
            module_id: fields.module_id,
            status: ThreadStatus::Open,
            is_pinned: false,
            views_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the thread still accepts comments.
    pub fn accepts_comments(&self) -> bool {
        self.status != ThreadStatus::Closed
    }

    /// Whether the thread sorts ahead of unpinned threads.
    pub fn pinned(&self) -> bool {
        self.is_pinned || self.status == ThreadStatus::Pinned
    }
}

/// Thread listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSummary {
    pub thread: DiscussionThread,
    pub comment_count: u64,
}

/// Sort threads pinned first, then most recently updated.
pub fn sort_threads(threads: &mut [DiscussionThread]) {
    threads.sort_by_key(|thread| (Reverse(thread.pinned()), Reverse(thread.updated_at)));
}

/// Raw thread input.
#[derive(Debug, Clone, Default)]
pub struct ThreadForm {
    pub title: String,
    pub content: String,
    pub module_id: Option<Uuid>,
}

/// Validated thread fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadFields {
    pub title: String,
    pub content: String,
    pub module_id: Option<Uuid>,
}

impl TryFrom<ThreadForm> for ThreadFields {
    type Error = Error;

    fn try_from(form: ThreadForm) -> Result<Self, Self::Error> {
        let content = form.content.trim().to_owned();
        if content.is_empty() {
            return Err(Error::invalid_field(
                "content",
                "empty_content",
                "thread content must not be empty",
            ));
        }
        Ok(Self {
            title: validate_title(&form.title)?,
            content,
            module_id: form.module_id,
        })
    }
}

/// Admin moderation changes; absent fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadModeration {
    pub status: Option<ThreadStatus>,
    pub is_pinned: Option<bool>,
}

/// Stored comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub author_id: UserId,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub is_edited: bool,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Build a new comment.
    pub fn create(
        thread_id: Uuid,
        author_id: UserId,
        content: CommentContent,
        parent_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            thread_id,
            author_id,
            content: content.into_inner(),
            parent_id,
            is_edited: false,
            likes_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the body and flag the comment as edited.
    pub fn edit(&mut self, content: CommentContent, now: DateTime<Utc>) {
        self.content = content.into_inner();
        self.is_edited = true;
        self.updated_at = now;
    }
}

/// Comment body, trimmed, 1 to [`COMMENT_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentContent(String);

impl CommentContent {
    /// Validate a comment body.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let content = raw.trim();
        if content.is_empty() {
            return Err(Error::invalid_field(
                "content",
                "empty_content",
                "comment must not be empty",
            ));
        }
        if content.chars().count() > COMMENT_MAX {
            return Err(Error::invalid_field(
                "content",
                "content_too_long",
                format!("comment must be at most {COMMENT_MAX} characters"),
            ));
        }
        Ok(Self(content.to_owned()))
    }

    fn into_inner(self) -> String {
        self.0
    }
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: i64,
}

/// A comment with its replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

/// Arrange a thread's flat comment list into a tree.
///
/// Top-level comments come newest first; replies under each parent come
/// oldest first. Comments whose parent is missing are promoted to top level.
pub fn build_comment_tree(comments: Vec<Comment>) -> Vec<CommentNode> {
    let known: std::collections::HashSet<Uuid> = comments.iter().map(|c| c.id).collect();
    let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    let mut roots = Vec::new();
    for comment in comments {
        match comment.parent_id.filter(|parent| known.contains(parent)) {
            Some(parent) => children.entry(parent).or_default().push(comment),
            None => roots.push(comment),
        }
    }
    roots.sort_by_key(|c| Reverse(c.created_at));
    roots
        .into_iter()
        .map(|root| attach_replies(root, &mut children))
        .collect()
}

fn attach_replies(comment: Comment, children: &mut HashMap<Uuid, Vec<Comment>>) -> CommentNode {
    let mut replies = children.remove(&comment.id).unwrap_or_default();
    replies.sort_by_key(|c| c.created_at);
    CommentNode {
        replies: replies
            .into_iter()
            .map(|reply| attach_replies(reply, children))
            .collect(),
        comment,
    }
}
