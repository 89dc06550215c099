//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    Accounts, AttemptRepository, Attempts, Dashboards, DiscussionRepository, Discussions,
    ModuleRepository, Modules, QuizRepository, Quizzes, UserRepository,
};
use crate::domain::{
    AccountService, AttemptService, DashboardService, DiscussionService, ModuleService,
    QuizService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn Accounts>,
    pub modules: Arc<dyn Modules>,
    pub quizzes: Arc<dyn Quizzes>,
    pub attempts: Arc<dyn Attempts>,
    pub discussions: Arc<dyn Discussions>,
    pub dashboards: Arc<dyn Dashboards>,
}

/// Parameter object naming every port the HTTP layer drives.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn Accounts>,
    pub modules: Arc<dyn Modules>,
    pub quizzes: Arc<dyn Quizzes>,
    pub attempts: Arc<dyn Attempts>,
    pub discussions: Arc<dyn Discussions>,
    pub dashboards: Arc<dyn Dashboards>,
}

impl HttpState {
    /// Construct state from the port implementations.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            modules,
            quizzes,
            attempts,
            discussions,
            dashboards,
        } = ports;
        Self {
            accounts,
            modules,
            quizzes,
            attempts,
            discussions,
            dashboards,
        }
    }
}

/// Repository adapters the domain services are built over.
pub struct Repositories<U, M, Q, A, D> {
    pub users: Arc<U>,
    pub modules: Arc<M>,
    pub quizzes: Arc<Q>,
    pub attempts: Arc<A>,
    pub discussions: Arc<D>,
}

impl<R> Repositories<R, R, R, R, R> {
    /// Use one adapter for every table, as the in-memory store does.
    pub fn shared(store: Arc<R>) -> Self {
        Self {
            users: store.clone(),
            modules: store.clone(),
            quizzes: store.clone(),
            attempts: store.clone(),
            discussions: store,
        }
    }
}

impl HttpState {
    /// Wire the domain services over `repos`, all reading time from `clock`.
    pub fn from_repositories<U, M, Q, A, D>(
        repos: Repositories<U, M, Q, A, D>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        U: UserRepository + 'static,
        M: ModuleRepository + 'static,
        Q: QuizRepository + 'static,
        A: AttemptRepository + 'static,
        D: DiscussionRepository + 'static,
    {
        let Repositories {
            users,
            modules,
            quizzes,
            attempts,
            discussions,
        } = repos;
        Self::new(HttpStatePorts {
            accounts: Arc::new(AccountService::new(
                users.clone(),
                modules.clone(),
                quizzes.clone(),
                attempts.clone(),
                clock.clone(),
            )),
            modules: Arc::new(ModuleService::new(
                modules.clone(),
                quizzes.clone(),
                discussions.clone(),
                clock.clone(),
            )),
            quizzes: Arc::new(QuizService::new(
                modules.clone(),
                quizzes.clone(),
                attempts.clone(),
                clock.clone(),
            )),
            attempts: Arc::new(AttemptService::new(
                quizzes.clone(),
                attempts.clone(),
                clock.clone(),
            )),
            discussions: Arc::new(DiscussionService::new(discussions, modules.clone(), clock)),
            dashboards: Arc::new(DashboardService::new(users, modules, quizzes, attempts)),
        })
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
