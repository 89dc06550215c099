//! Response payloads and their OpenAPI schemas.
//!
//! Domain aggregates stay free of serialisation concerns; handlers convert
//! them into the camelCase DTOs defined here. Answer keys never leave the
//! server on a quiz sheet: [`QuestionResponse::sheet`] drops them.

use chrono::{DateTime, Utc};
use pagination::Page;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    AdminDashboard, AnswerReview, AttemptResult, AttemptSheet, CitizenDashboard, Dashboard,
    EducatorDashboard, HomeSummary, ModuleDetail, ProfileStats, ProfileView, QuizDetail,
    ThreadDetail, ViewerProgress,
};
use crate::domain::{
    Choice, Comment, CommentNode, DifficultyLevel, DiscussionThread, LearningModule, LikeToggle,
    ModuleStatus, Question, QuestionType, Quiz, QuizAttempt, QuizDifficulty, Role, ThreadStatus,
    ThreadSummary, User,
};

/// One page of results.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 12)]
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PageResponse<T> {
    /// Convert a domain page, mapping every item.
    pub fn from_page<U>(page: Page<U>, f: impl FnMut(U) -> T) -> Self {
        let has_next = page.has_next();
        let has_previous = page.has_previous();
        let page = page.map(f);
        Self {
            items: page.items,
            page: page.page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
            has_next,
            has_previous,
        }
    }
}

/// Account as returned to clients. Password hashes are never serialised.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.org")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "Ada Lovelace")]
    pub display_name: String,
    pub role: Role,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let display_name = user.display_name();
        Self {
            id: *user.id.as_uuid(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            first_name: user.profile.first_name,
            last_name: user.profile.last_name,
            display_name,
            role: user.role,
            bio: user.profile.bio,
            profile_image_url: user.profile.profile_image_url,
            is_email_verified: user.is_email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Role-dependent profile counters; only the viewer's role's fields are set.
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStatsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules_created: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quizzes_created: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quizzes_attempted: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quizzes_passed: Option<u64>,
}

impl From<ProfileStats> for ProfileStatsResponse {
    fn from(stats: ProfileStats) -> Self {
        match stats {
            ProfileStats::Educator {
                modules_created,
                quizzes_created,
            } => Self {
                modules_created: Some(modules_created),
                quizzes_created: Some(quizzes_created),
                ..Self::default()
            },
            ProfileStats::Citizen {
                quizzes_attempted,
                quizzes_passed,
            } => Self {
                quizzes_attempted: Some(quizzes_attempted),
                quizzes_passed: Some(quizzes_passed),
                ..Self::default()
            },
            ProfileStats::Admin => Self::default(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub stats: ProfileStatsResponse,
    pub is_own_profile: bool,
}

impl From<ProfileView> for ProfileResponse {
    fn from(view: ProfileView) -> Self {
        Self {
            user: view.user.into(),
            stats: view.stats.into(),
            is_own_profile: view.is_own_profile,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResponse {
    pub id: Uuid,
    pub title: String,
    #[schema(example = "voting-basics")]
    pub slug: String,
    pub description: String,
    pub content: String,
    pub created_by: Option<Uuid>,
    pub status: ModuleStatus,
    pub order: i32,
    pub image_url: Option<String>,
    pub attachment_url: Option<String>,
    pub difficulty_level: DifficultyLevel,
    pub estimated_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<LearningModule> for ModuleResponse {
    fn from(module: LearningModule) -> Self {
        Self {
            id: module.id,
            title: module.title,
            slug: module.slug.to_string(),
            description: module.description,
            content: module.content,
            created_by: module.created_by.map(|id| *id.as_uuid()),
            status: module.status,
            order: module.order,
            image_url: module.image_url,
            attachment_url: module.attachment_url,
            difficulty_level: module.difficulty_level,
            estimated_minutes: module.estimated_minutes,
            created_at: module.created_at,
            updated_at: module.updated_at,
            published_at: module.published_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDetailResponse {
    pub module: ModuleResponse,
    pub quizzes: Vec<QuizResponse>,
    pub threads: Vec<ThreadSummaryResponse>,
}

impl From<ModuleDetail> for ModuleDetailResponse {
    fn from(detail: ModuleDetail) -> Self {
        Self {
            module: detail.module.into(),
            quizzes: detail.quizzes.into_iter().map(Into::into).collect(),
            threads: detail.threads.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub module_id: Uuid,
    pub created_by: Option<Uuid>,
    pub difficulty: QuizDifficulty,
    #[schema(example = 60)]
    pub passing_score: i32,
    pub time_limit_minutes: Option<i32>,
    pub is_published: bool,
    pub shuffle_questions: bool,
    pub show_answers: bool,
    pub max_attempts: Option<i32>,
    pub total_questions: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Quiz> for QuizResponse {
    fn from(quiz: Quiz) -> Self {
        let settings = quiz.settings;
        Self {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            module_id: quiz.module_id,
            created_by: quiz.created_by.map(|id| *id.as_uuid()),
            difficulty: settings.difficulty,
            passing_score: settings.passing_score,
            time_limit_minutes: settings.time_limit_minutes,
            is_published: settings.is_published,
            shuffle_questions: settings.shuffle_questions,
            show_answers: settings.show_answers,
            max_attempts: settings.max_attempts,
            total_questions: quiz.total_questions,
            created_at: quiz.created_at,
            updated_at: quiz.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceResponse {
    pub id: Uuid,
    pub text: String,
    pub order: i32,
    /// Only present in authoring views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: Uuid,
    pub text: String,
    pub question_type: QuestionType,
    pub order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub points: i32,
    pub choices: Vec<ChoiceResponse>,
}

impl QuestionResponse {
    fn build(question: Question, reveal: bool) -> Self {
        let choices = question
            .choices
            .into_iter()
            .map(|choice: Choice| ChoiceResponse {
                id: choice.id,
                text: choice.text,
                order: choice.order,
                is_correct: reveal.then_some(choice.is_correct),
            })
            .collect();
        Self {
            id: question.id,
            text: question.text,
            question_type: question.question_type,
            order: question.order,
            explanation: question.explanation.filter(|_| reveal),
            points: question.points,
            choices,
        }
    }

    /// Full question including the answer key, for quiz authors.
    pub fn authoring(question: Question) -> Self {
        Self::build(question, true)
    }

    /// Question as shown to a learner mid-attempt.
    pub fn sheet(question: Question) -> Self {
        Self::build(question, false)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewerProgressResponse {
    pub attempts_used: u64,
    pub best_attempt: Option<AttemptResponse>,
    pub can_attempt: bool,
}

impl From<ViewerProgress> for ViewerProgressResponse {
    fn from(progress: ViewerProgress) -> Self {
        Self {
            attempts_used: progress.attempts_used,
            best_attempt: progress.best_attempt.map(Into::into),
            can_attempt: progress.can_attempt,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizDetailResponse {
    pub quiz: QuizResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ViewerProgressResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionResponse>>,
}

impl From<QuizDetail> for QuizDetailResponse {
    fn from(detail: QuizDetail) -> Self {
        Self {
            quiz: detail.quiz.into(),
            progress: detail.progress.map(Into::into),
            questions: detail
                .questions
                .map(|questions| questions.into_iter().map(QuestionResponse::authoring).collect()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResponse {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_possible_score: i32,
    pub score: Option<i32>,
    pub percentage: Option<f64>,
    pub is_passed: Option<bool>,
    pub questions_attempted: i32,
    pub questions_correct: i32,
    pub time_taken_seconds: Option<i64>,
}

impl From<QuizAttempt> for AttemptResponse {
    fn from(attempt: QuizAttempt) -> Self {
        let outcome = attempt.outcome.as_ref();
        Self {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            user_id: *attempt.user_id.as_uuid(),
            started_at: attempt.started_at,
            completed_at: attempt.completed_at,
            total_possible_score: attempt.total_possible_score,
            score: outcome.map(|o| o.score),
            percentage: outcome.map(|o| o.percentage),
            is_passed: outcome.map(|o| o.is_passed),
            questions_attempted: outcome.map_or(0, |o| o.questions_attempted),
            questions_correct: outcome.map_or(0, |o| o.questions_correct),
            time_taken_seconds: attempt.time_taken_seconds,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSheetResponse {
    pub quiz: QuizResponse,
    pub attempt: AttemptResponse,
    pub questions: Vec<QuestionResponse>,
    /// `true` when an unfinished attempt was picked up again.
    pub resumed: bool,
}

impl From<AttemptSheet> for AttemptSheetResponse {
    fn from(sheet: AttemptSheet) -> Self {
        Self {
            quiz: sheet.quiz.into(),
            attempt: sheet.attempt.into(),
            questions: sheet
                .questions
                .into_iter()
                .map(QuestionResponse::sheet)
                .collect(),
            resumed: sheet.resumed,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReviewResponse {
    pub question_id: Uuid,
    pub question_text: String,
    pub points: i32,
    pub selected_choice_id: Option<Uuid>,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_choice_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl From<AnswerReview> for AnswerReviewResponse {
    fn from(review: AnswerReview) -> Self {
        Self {
            question_id: review.question_id,
            question_text: review.question_text,
            points: review.points,
            selected_choice_id: review.selected_choice_id,
            is_correct: review.is_correct,
            correct_choice_id: review.correct_choice_id,
            explanation: review.explanation,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResultResponse {
    pub quiz: QuizResponse,
    pub attempt: AttemptResponse,
    pub answers: Vec<AnswerReviewResponse>,
}

impl From<AttemptResult> for AttemptResultResponse {
    fn from(result: AttemptResult) -> Self {
        Self {
            quiz: result.quiz.into(),
            attempt: result.attempt.into(),
            answers: result.answers.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub module_id: Option<Uuid>,
    pub status: ThreadStatus,
    pub is_pinned: bool,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DiscussionThread> for ThreadResponse {
    fn from(thread: DiscussionThread) -> Self {
        Self {
            id: thread.id,
            title: thread.title,
            content: thread.content,
            author_id: *thread.author_id.as_uuid(),
            module_id: thread.module_id,
            status: thread.status,
            is_pinned: thread.is_pinned,
            views_count: thread.views_count,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummaryResponse {
    pub thread: ThreadResponse,
    pub comment_count: u64,
}

impl From<ThreadSummary> for ThreadSummaryResponse {
    fn from(summary: ThreadSummary) -> Self {
        Self {
            thread: summary.thread.into(),
            comment_count: summary.comment_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub is_edited: bool,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[schema(no_recursion)]
    pub replies: Vec<CommentResponse>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            thread_id: comment.thread_id,
            author_id: *comment.author_id.as_uuid(),
            content: comment.content,
            parent_id: comment.parent_id,
            is_edited: comment.is_edited,
            likes_count: comment.likes_count,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            replies: Vec::new(),
        }
    }
}

impl From<CommentNode> for CommentResponse {
    fn from(node: CommentNode) -> Self {
        Self {
            replies: node.replies.into_iter().map(Into::into).collect(),
            ..Self::from(node.comment)
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDetailResponse {
    pub thread: ThreadResponse,
    pub comments: Vec<CommentResponse>,
}

impl From<ThreadDetail> for ThreadDetailResponse {
    fn from(detail: ThreadDetail) -> Self {
        Self {
            thread: detail.thread.into(),
            comments: detail.comments.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
    pub likes_count: i64,
}

impl From<LikeToggle> for LikeResponse {
    fn from(toggle: LikeToggle) -> Self {
        Self {
            liked: toggle.liked,
            likes_count: toggle.likes_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    pub published_modules: u64,
    pub total_users: u64,
    pub recent_modules: Vec<ModuleResponse>,
}

impl From<HomeSummary> for HomeResponse {
    fn from(home: HomeSummary) -> Self {
        Self {
            published_modules: home.published_modules,
            total_users: home.total_users,
            recent_modules: home.recent_modules.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardResponse {
    pub total_users: u64,
    pub total_modules: u64,
    pub total_quizzes: u64,
    pub total_attempts: u64,
    pub recent_users: Vec<UserResponse>,
    pub recent_modules: Vec<ModuleResponse>,
}

impl From<AdminDashboard> for AdminDashboardResponse {
    fn from(dashboard: AdminDashboard) -> Self {
        Self {
            total_users: dashboard.total_users,
            total_modules: dashboard.total_modules,
            total_quizzes: dashboard.total_quizzes,
            total_attempts: dashboard.total_attempts,
            recent_users: dashboard.recent_users.into_iter().map(Into::into).collect(),
            recent_modules: dashboard.recent_modules.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EducatorDashboardResponse {
    pub modules: Vec<ModuleResponse>,
    pub quizzes: Vec<QuizResponse>,
    pub total_attempts: u64,
    pub average_passed_percentage: Option<f64>,
}

impl From<EducatorDashboard> for EducatorDashboardResponse {
    fn from(dashboard: EducatorDashboard) -> Self {
        Self {
            modules: dashboard.modules.into_iter().map(Into::into).collect(),
            quizzes: dashboard.quizzes.into_iter().map(Into::into).collect(),
            total_attempts: dashboard.total_attempts,
            average_passed_percentage: dashboard.average_passed_percentage,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CitizenDashboardResponse {
    pub quizzes_passed: u64,
    pub total_attempts: u64,
    pub average_passed_percentage: Option<f64>,
    pub recent_attempts: Vec<AttemptResponse>,
    pub available_modules: Vec<ModuleResponse>,
}

impl From<CitizenDashboard> for CitizenDashboardResponse {
    fn from(dashboard: CitizenDashboard) -> Self {
        Self {
            quizzes_passed: dashboard.quizzes_passed,
            total_attempts: dashboard.total_attempts,
            average_passed_percentage: dashboard.average_passed_percentage,
            recent_attempts: dashboard.recent_attempts.into_iter().map(Into::into).collect(),
            available_modules: dashboard
                .available_modules
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Dashboard for the signed-in user, tagged with the role it was built for.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardResponse {
    Admin(AdminDashboardResponse),
    Educator(EducatorDashboardResponse),
    Citizen(CitizenDashboardResponse),
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        match dashboard {
            Dashboard::Admin(inner) => Self::Admin(inner.into()),
            Dashboard::Educator(inner) => Self::Educator(inner.into()),
            Dashboard::Citizen(inner) => Self::Citizen(inner.into()),
        }
    }
}
