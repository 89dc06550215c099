//! Driving port for the landing page and role dashboards.

use async_trait::async_trait;

use crate::domain::{Error, LearningModule, Quiz, QuizAttempt, User};

/// Public landing page summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeSummary {
    pub published_modules: u64,
    pub total_users: u64,
    pub recent_modules: Vec<LearningModule>,
}

/// Platform-wide figures for admins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminDashboard {
    pub total_users: u64,
    pub total_modules: u64,
    pub total_quizzes: u64,
    pub total_attempts: u64,
    pub recent_users: Vec<User>,
    pub recent_modules: Vec<LearningModule>,
}

/// Authored content and learner activity for educators.
#[derive(Debug, Clone, PartialEq)]
pub struct EducatorDashboard {
    pub modules: Vec<LearningModule>,
    pub quizzes: Vec<Quiz>,
    pub total_attempts: u64,
    pub average_passed_percentage: Option<f64>,
}

/// Progress overview for citizens.
#[derive(Debug, Clone, PartialEq)]
pub struct CitizenDashboard {
    pub quizzes_passed: u64,
    pub total_attempts: u64,
    pub average_passed_percentage: Option<f64>,
    pub recent_attempts: Vec<QuizAttempt>,
    pub available_modules: Vec<LearningModule>,
}

/// Dashboard matching the viewer's role.
#[derive(Debug, Clone, PartialEq)]
pub enum Dashboard {
    Admin(AdminDashboard),
    Educator(EducatorDashboard),
    Citizen(CitizenDashboard),
}

/// Domain use-case port for dashboards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Dashboards: Send + Sync {
    /// Public landing page figures.
    async fn home(&self) -> Result<HomeSummary, Error>;

    /// Dashboard for the viewer's role.
    async fn dashboard(&self, viewer: &User) -> Result<Dashboard, Error>;

    /// Admin dashboard; forbidden for other roles.
    async fn admin(&self, viewer: &User) -> Result<AdminDashboard, Error>;

    /// Educator dashboard; forbidden for other roles.
    async fn educator(&self, viewer: &User) -> Result<EducatorDashboard, Error>;

    /// Citizen dashboard; forbidden for other roles.
    async fn citizen(&self, viewer: &User) -> Result<CitizenDashboard, Error>;
}
