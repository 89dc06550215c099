//! Landing page and role dashboard assembly.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    AdminDashboard, AttemptRepository, CitizenDashboard, Dashboard, Dashboards,
    EducatorDashboard, HomeSummary, ModuleRepository, QuizRepository, UserRepository,
};
use crate::domain::{Error, Role, User};

const HOME_RECENT_MODULES: u32 = 3;
const ADMIN_RECENT_ROWS: u32 = 5;
const CITIZEN_RECENT_ATTEMPTS: u32 = 5;
const CITIZEN_AVAILABLE_MODULES: u32 = 6;

/// Read-only dashboard service over every repository.
#[derive(Clone)]
pub struct DashboardService<U, M, Q, A> {
    users: Arc<U>,
    modules: Arc<M>,
    quizzes: Arc<Q>,
    attempts: Arc<A>,
}

impl<U, M, Q, A> DashboardService<U, M, Q, A> {
    /// Create the service.
    pub fn new(users: Arc<U>, modules: Arc<M>, quizzes: Arc<Q>, attempts: Arc<A>) -> Self {
        Self {
            users,
            modules,
            quizzes,
            attempts,
        }
    }
}

#[async_trait]
impl<U, M, Q, A> Dashboards for DashboardService<U, M, Q, A>
where
    U: UserRepository,
    M: ModuleRepository,
    Q: QuizRepository,
    A: AttemptRepository,
{
    async fn home(&self) -> Result<HomeSummary, Error> {
        Ok(HomeSummary {
            published_modules: self.modules.count_published().await?,
            total_users: self.users.count().await?,
            recent_modules: self.modules.recent_published(HOME_RECENT_MODULES).await?,
        })
    }

    async fn dashboard(&self, viewer: &User) -> Result<Dashboard, Error> {
        match viewer.role {
            Role::Admin => self.admin(viewer).await.map(Dashboard::Admin),
            Role::Educator => self.educator(viewer).await.map(Dashboard::Educator),
            Role::Citizen => self.citizen(viewer).await.map(Dashboard::Citizen),
        }
    }

    async fn admin(&self, viewer: &User) -> Result<AdminDashboard, Error> {
        viewer.require_admin()?;
        Ok(AdminDashboard {
            total_users: self.users.count().await?,
            total_modules: self.modules.count().await?,
            total_quizzes: self.quizzes.count().await?,
            total_attempts: self.attempts.count().await?,
            recent_users: self.users.recent(ADMIN_RECENT_ROWS).await?,
            recent_modules: self.modules.recent(ADMIN_RECENT_ROWS).await?,
        })
    }

    async fn educator(&self, viewer: &User) -> Result<EducatorDashboard, Error> {
        viewer.require_role(Role::Educator, "view the educator dashboard")?;
        let stats = self.attempts.author_stats(&viewer.id).await?;
        Ok(EducatorDashboard {
            modules: self.modules.list_by_author(&viewer.id).await?,
            quizzes: self.quizzes.list_by_author(&viewer.id).await?,
            total_attempts: stats.total_attempts,
            average_passed_percentage: stats.average_passed_percentage,
        })
    }

    async fn citizen(&self, viewer: &User) -> Result<CitizenDashboard, Error> {
        viewer.require_role(Role::Citizen, "view the learner dashboard")?;
        let stats = self.attempts.learner_stats(&viewer.id).await?;
        Ok(CitizenDashboard {
            quizzes_passed: stats.quizzes_passed,
            total_attempts: stats.total_attempts,
            average_passed_percentage: stats.average_passed_percentage,
            recent_attempts: self
                .attempts
                .recent_for_user(&viewer.id, CITIZEN_RECENT_ATTEMPTS)
                .await?,
            available_modules: self
                .modules
                .recent_published(CITIZEN_AVAILABLE_MODULES)
                .await?,
        })
    }
}
