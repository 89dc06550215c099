//! Quiz-taking handlers.
//!
//! ```text
//! POST /api/v1/quizzes/{quiz_id}/attempt
//! POST /api/v1/quizzes/{quiz_id}/attempt/submit {"answers":{"<question>":"<choice>"}}
//! GET /api/v1/attempts/{attempt_id}
//! ```

use std::collections::HashMap;

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{AttemptResponse, AttemptResultResponse, AttemptSheetResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_answer_map;

/// Selected choice per question; unanswered questions are simply omitted.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptRequest {
    #[serde(default)]
    pub answers: HashMap<String, String>,
}

/// Start an attempt, or resume the caller's unfinished one.
///
/// The returned sheet never includes which choices are correct.
#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_id}/attempt",
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Attempt sheet", body = AttemptSheetResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Citizens only", body = Error),
        (status = 404, description = "Quiz not found", body = Error),
        (status = 409, description = "Maximum attempts reached", body = Error)
    ),
    tags = ["attempts"],
    operation_id = "startAttempt"
)]
#[post("/quizzes/{quiz_id}/attempt")]
pub async fn start_attempt(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<AttemptSheetResponse>> {
    let actor = session.require_user(&state).await?;
    let sheet = state.attempts.start(&actor, path.into_inner()).await?;
    Ok(web::Json(sheet.into()))
}

/// Grade and complete the caller's open attempt.
#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_id}/attempt/submit",
    params(("quiz_id" = Uuid, Path, description = "Quiz id")),
    request_body = SubmitAttemptRequest,
    responses(
        (status = 200, description = "Graded attempt", body = AttemptResponse),
        (status = 400, description = "Unknown question or choice", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Citizens only", body = Error),
        (status = 404, description = "Quiz not found", body = Error),
        (status = 409, description = "No open attempt, or it was already submitted", body = Error)
    ),
    tags = ["attempts"],
    operation_id = "submitAttempt"
)]
#[post("/quizzes/{quiz_id}/attempt/submit")]
pub async fn submit_attempt(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<SubmitAttemptRequest>,
) -> ApiResult<web::Json<AttemptResponse>> {
    let actor = session.require_user(&state).await?;
    let answers = parse_answer_map(payload.into_inner().answers)?;
    let attempt = state
        .attempts
        .submit(&actor, path.into_inner(), answers)
        .await?;
    Ok(web::Json(attempt.into()))
}

/// Review a completed attempt (its owner only).
#[utoipa::path(
    get,
    path = "/api/v1/attempts/{attempt_id}",
    params(("attempt_id" = Uuid, Path, description = "Attempt id")),
    responses(
        (status = 200, description = "Attempt review", body = AttemptResultResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["attempts"],
    operation_id = "attemptResult"
)]
#[get("/attempts/{attempt_id}")]
pub async fn attempt_result(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<AttemptResultResponse>> {
    let actor = session.require_user(&state).await?;
    let result = state.attempts.result(&actor, path.into_inner()).await?;
    Ok(web::Json(result.into()))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::AttemptSheet;
    use crate::domain::{
        Choice, Question, QuestionType, Quiz, QuizAttempt, QuizFields, QuizForm, User,
    };
    use crate::inbound::http::accounts::login;
    use crate::inbound::http::test_utils::{MockPorts, login_cookie, test_session_middleware};
    use crate::test_support::{citizen, fixture_now};

    fn quiz(author: &User) -> Quiz {
        let fields = QuizFields::try_from(QuizForm {
            title: "Ballot basics".to_owned(),
            description: "Check your knowledge".to_owned(),
            module_id: Uuid::new_v4(),
            is_published: Some(true),
            ..QuizForm::default()
        })
        .expect("valid quiz");
        Quiz::create(fields, author.id, fixture_now())
    }

    fn question(quiz_id: Uuid) -> Question {
        let id = Uuid::new_v4();
        Question {
            id,
            quiz_id,
            text: "Is voting secret?".to_owned(),
            question_type: QuestionType::TrueFalse,
            order: 0,
            explanation: Some("The ballot is secret.".to_owned()),
            points: 1,
            choices: vec![
                Choice {
                    id: Uuid::new_v4(),
                    question_id: id,
                    text: "Yes".to_owned(),
                    is_correct: true,
                    order: 0,
                },
                Choice {
                    id: Uuid::new_v4(),
                    question_id: id,
                    text: "No".to_owned(),
                    is_correct: false,
                    order: 1,
                },
            ],
        }
    }

    macro_rules! app_with {
        ($ports:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($ports.into_state()))
                    .wrap(test_session_middleware())
                    .service(
                        web::scope("/api/v1")
                            .service(login)
                            .service(start_attempt)
                            .service(submit_attempt)
                            .service(attempt_result),
                    ),
            )
            .await
        };
    }

    #[rstest]
    #[actix_web::test]
    async fn sheets_never_reveal_correct_choices() {
        let learner = citizen();
        let mut ports = MockPorts::signed_in_as(&learner);
        let quiz = quiz(&learner);
        let quiz_id = quiz.id;
        let questions = vec![question(quiz_id)];
        let attempt = QuizAttempt::start(learner.id, quiz_id, 1, fixture_now());
        ports.attempts.expect_start().returning(move |_, _| {
            Ok(AttemptSheet {
                quiz: quiz.clone(),
                attempt: attempt.clone(),
                questions: questions.clone(),
                resumed: false,
            })
        });
        let app = app_with!(ports);
        let cookie = login_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/quizzes/{quiz_id}/attempt"))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        let choices = body["questions"][0]["choices"].as_array().expect("choices");
        assert_eq!(choices.len(), 2);
        assert!(choices.iter().all(|choice| choice.get("isCorrect").is_none()));
        assert!(body["questions"][0].get("explanation").is_none());
        assert_eq!(body["resumed"], false);
    }

    #[rstest]
    #[actix_web::test]
    async fn submissions_reach_the_port_parsed() {
        let learner = citizen();
        let mut ports = MockPorts::signed_in_as(&learner);
        let (question_id, choice_id) = (Uuid::new_v4(), Uuid::new_v4());
        let quiz_id = Uuid::new_v4();
        let attempt = QuizAttempt::start(learner.id, quiz_id, 1, fixture_now());
        ports
            .attempts
            .expect_submit()
            .withf(move |_, quiz, answers| {
                *quiz == quiz_id && answers.get(&question_id) == Some(&choice_id)
            })
            .returning(move |_, _, _| Ok(attempt.clone()));
        let app = app_with!(ports);
        let cookie = login_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/quizzes/{quiz_id}/attempt/submit"))
                .cookie(cookie)
                .set_json(json!({ "answers": { question_id.to_string(): choice_id.to_string() } }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_answers_never_reach_the_port() {
        let learner = citizen();
        let ports = MockPorts::signed_in_as(&learner);
        let app = app_with!(ports);
        let cookie = login_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/quizzes/{}/attempt/submit", Uuid::new_v4()))
                .cookie(cookie)
                .set_json(json!({ "answers": { "first": "yes" } }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn results_surface_port_errors() {
        let learner = citizen();
        let mut ports = MockPorts::signed_in_as(&learner);
        ports
            .attempts
            .expect_result()
            .returning(|_, _| Err(Error::not_found("attempt not found")));
        let app = app_with!(ports);
        let cookie = login_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/attempts/{}", Uuid::new_v4()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
