//! Quiz browsing and authoring handlers.
//!
//! ```text
//! GET /api/v1/quizzes?page=1
//! POST /api/v1/quizzes
//! GET /api/v1/quizzes/{quiz_id}
//! PUT /api/v1/quizzes/{quiz_id}
//! POST /api/v1/quizzes/{quiz_id}/questions
//! DELETE /api/v1/quizzes/{quiz_id}/questions/{question_id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::QUIZZES_PAGE_SIZE;
use crate::domain::{ChoiceForm, Error, QuestionForm, QuestionType, QuizDifficulty, QuizForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    PageResponse, QuestionResponse, QuizDetailResponse, QuizResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, page_request, parse_uuid};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Quiz settings payload used for create and update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Owning module id.
    pub module_id: Option<String>,
    pub difficulty: Option<QuizDifficulty>,
    /// Percentage needed to pass, 0 to 100.
    pub passing_score: Option<i32>,
    pub time_limit_minutes: Option<i32>,
    pub is_published: Option<bool>,
    pub shuffle_questions: Option<bool>,
    pub show_answers: Option<bool>,
    /// Omit for unlimited attempts.
    pub max_attempts: Option<i32>,
}

fn parse_quiz_request(payload: QuizRequest) -> Result<QuizForm, Error> {
    const MODULE_ID: FieldName = FieldName::new("moduleId");
    let module_id = payload
        .module_id
        .ok_or_else(|| missing_field_error(MODULE_ID))?;
    Ok(QuizForm {
        title: payload.title,
        description: payload.description,
        module_id: parse_uuid(module_id, MODULE_ID)?,
        difficulty: payload.difficulty,
        passing_score: payload.passing_score,
        time_limit_minutes: payload.time_limit_minutes,
        is_published: payload.is_published,
        shuffle_questions: payload.shuffle_questions,
        show_answers: payload.show_answers,
        max_attempts: payload.max_attempts,
    })
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceRequest {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// New question with its complete choice set.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    pub text: String,
    pub question_type: Option<QuestionType>,
    pub order: Option<i32>,
    pub explanation: Option<String>,
    pub points: Option<i32>,
    pub choices: Vec<ChoiceRequest>,
}

impl From<QuestionRequest> for QuestionForm {
    fn from(value: QuestionRequest) -> Self {
        Self {
            text: value.text,
            question_type: value.question_type,
            order: value.order,
            explanation: value.explanation,
            points: value.points,
            choices: value
                .choices
                .into_iter()
                .map(|choice| ChoiceForm {
                    text: choice.text,
                    is_correct: choice.is_correct,
                })
                .collect(),
        }
    }
}

/// Published quizzes, newest first, 12 per page.
#[utoipa::path(
    get,
    path = "/api/v1/quizzes",
    params(PageQuery),
    responses(
        (status = 200, description = "Published quizzes", body = PageResponse<QuizResponse>),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["quizzes"],
    operation_id = "listQuizzes",
    security([])
)]
#[get("/quizzes")]
pub async fn list_quizzes(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<QuizResponse>>> {
    let page = page_request(query.page, QUIZZES_PAGE_SIZE)?;
    let quizzes = state.quizzes.list_published(page).await?;
    Ok(web::Json(PageResponse::from_page(quizzes, Into::into)))
}

/// Create a quiz inside an existing module (educators only).
#[utoipa::path(
    post,
    path = "/api/v1/quizzes",
    request_body = QuizRequest,
    responses(
        (status = 201, description = "Quiz created", body = QuizResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Educators only", body = Error),
        (status = 404, description = "Module not found", body = Error)
    ),
    tags = ["quizzes"],
    operation_id = "createQuiz"
)]
#[post("/quizzes")]
pub async fn create_quiz(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<QuizRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user(&state).await?;
    let form = parse_quiz_request(payload.into_inner())?;
    let quiz = state.quizzes.create(&actor, form).await?;
    Ok(HttpResponse::Created().json(QuizResponse::from(quiz)))
}

/// Quiz detail. Signed-in viewers also get their attempt progress; authors
/// and admins get the full question set.
#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_id}",
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Quiz detail", body = QuizDetailResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["quizzes"],
    operation_id = "getQuiz",
    security([])
)]
#[get("/quizzes/{quiz_id}")]
pub async fn get_quiz(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<QuizDetailResponse>> {
    let viewer = session.viewer(&state).await?;
    let detail = state.quizzes.get(viewer, path.into_inner()).await?;
    Ok(web::Json(detail.into()))
}

/// Update quiz settings (author or admin).
#[utoipa::path(
    put,
    path = "/api/v1/quizzes/{quiz_id}",
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    request_body = QuizRequest,
    responses(
        (status = 200, description = "Updated quiz", body = QuizResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["quizzes"],
    operation_id = "updateQuiz"
)]
#[put("/quizzes/{quiz_id}")]
pub async fn update_quiz(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<QuizRequest>,
) -> ApiResult<web::Json<QuizResponse>> {
    let actor = session.require_user(&state).await?;
    let form = parse_quiz_request(payload.into_inner())?;
    let quiz = state
        .quizzes
        .update(&actor, path.into_inner(), form)
        .await?;
    Ok(web::Json(quiz.into()))
}

/// Add a question with its choices (author or admin).
#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_id}/questions",
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    request_body = QuestionRequest,
    responses(
        (status = 201, description = "Question added", body = QuestionResponse),
        (status = 400, description = "Invalid choice set", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Quiz not found", body = Error)
    ),
    tags = ["quizzes"],
    operation_id = "addQuestion"
)]
#[post("/quizzes/{quiz_id}/questions")]
pub async fn add_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<QuestionRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user(&state).await?;
    let question = state
        .quizzes
        .add_question(&actor, path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(QuestionResponse::authoring(question)))
}

/// Remove a question (author or admin).
#[utoipa::path(
    delete,
    path = "/api/v1/quizzes/{quiz_id}/questions/{question_id}",
    params(
        ("quiz_id" = Uuid, Path, description = "Quiz id"),
        ("question_id" = Uuid, Path, description = "Question id")
    ),
    responses(
        (status = 204, description = "Question removed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["quizzes"],
    operation_id = "removeQuestion"
)]
#[delete("/quizzes/{quiz_id}/questions/{question_id}")]
pub async fn remove_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user(&state).await?;
    let (quiz_id, question_id) = path.into_inner();
    state
        .quizzes
        .remove_question(&actor, quiz_id, question_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::ErrorCode;

    fn quiz_request(module_id: Option<&str>) -> QuizRequest {
        serde_json::from_value(json!({
            "title": "Ballot basics",
            "moduleId": module_id,
            "passingScore": 70,
            "maxAttempts": 2
        }))
        .expect("valid payload")
    }

    #[rstest]
    fn quiz_requests_need_a_module() {
        let error = parse_quiz_request(quiz_request(None)).expect_err("module required");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details().and_then(|d| d.get("field")),
            Some(&json!("moduleId"))
        );
    }

    #[rstest]
    fn quiz_requests_reject_malformed_module_ids() {
        let error =
            parse_quiz_request(quiz_request(Some("module-7"))).expect_err("malformed module id");
        assert_eq!(
            error.details().and_then(|d| d.get("code")),
            Some(&json!("invalid_uuid"))
        );
    }

    #[rstest]
    fn quiz_requests_carry_settings() {
        let module_id = Uuid::new_v4();
        let form = parse_quiz_request(quiz_request(Some(&module_id.to_string())))
            .expect("valid request");
        assert_eq!(form.module_id, module_id);
        assert_eq!(form.passing_score, Some(70));
        assert_eq!(form.max_attempts, Some(2));
        assert_eq!(form.shuffle_questions, None);
    }

    #[rstest]
    fn choices_default_to_incorrect() {
        let request: QuestionRequest = serde_json::from_value(json!({
            "text": "Polls close at 10pm",
            "questionType": "true_false",
            "choices": [{ "text": "True", "isCorrect": true }, { "text": "False" }]
        }))
        .expect("valid payload");
        let form = QuestionForm::from(request);
        assert_eq!(form.question_type, Some(QuestionType::TrueFalse));
        assert!(form.choices[0].is_correct);
        assert!(!form.choices[1].is_correct);
    }
}
