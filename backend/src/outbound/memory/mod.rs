//! Process-local adapters backing every repository port.
//!
//! [`MemoryStore`] keeps all tables behind one mutex so cross-table
//! behaviour (comment cascades, thread bumps, author statistics) matches
//! the PostgreSQL adapters. The server falls back to it when no database
//! URL is configured, and integration tests drive the HTTP surface with it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::domain::{
    Comment, DiscussionThread, LearningModule, PasswordHash, Question, QuestionAnswer, Quiz,
    QuizAttempt, User,
};

mod attempts;
mod discussions;
mod modules;
mod quizzes;
mod users;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<(User, PasswordHash)>,
    modules: Vec<LearningModule>,
    quizzes: Vec<Quiz>,
    questions: Vec<Question>,
    attempts: Vec<QuizAttempt>,
    answers: Vec<QuestionAnswer>,
    threads: Vec<DiscussionThread>,
    comments: Vec<Comment>,
    /// `(comment_id, user_id)` pairs.
    likes: HashSet<(Uuid, Uuid)>,
}

/// In-memory implementation of all repository ports.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(&self, fail: impl FnOnce(String) -> E) -> Result<MutexGuard<'_, Tables>, E> {
        self.tables
            .lock()
            .map_err(|_| fail("in-memory store lock poisoned".to_owned()))
    }
}

fn to_count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
