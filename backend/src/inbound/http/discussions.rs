//! Discussion forum handlers.
//!
//! ```text
//! GET /api/v1/discussions?page=1
//! POST /api/v1/discussions
//! GET /api/v1/discussions/{thread_id}
//! PUT /api/v1/discussions/{thread_id}
//! POST /api/v1/discussions/{thread_id}/comments
//! PUT /api/v1/comments/{comment_id}
//! POST /api/v1/comments/{comment_id}/like
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::THREADS_PAGE_SIZE;
use crate::domain::{Error, ThreadForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::quizzes::PageQuery;
use crate::inbound::http::schemas::{
    CommentResponse, LikeResponse, PageResponse, ThreadDetailResponse, ThreadResponse,
    ThreadSummaryResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, page_request, parse_optional_uuid};

/// Thread payload used for create and update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Attach the thread to a module; blank or absent means general.
    pub module_id: Option<String>,
}

impl TryFrom<ThreadRequest> for ThreadForm {
    type Error = Error;

    fn try_from(value: ThreadRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title,
            content: value.content,
            module_id: parse_optional_uuid(value.module_id, FieldName::new("moduleId"))?,
        })
    }
}

/// Comment body; `parentId` makes it a reply.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub content: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentEditRequest {
    pub content: String,
}

/// Threads, pinned first then most recently active, 15 per page.
#[utoipa::path(
    get,
    path = "/api/v1/discussions",
    params(PageQuery),
    responses(
        (status = 200, description = "Threads", body = PageResponse<ThreadSummaryResponse>),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["discussions"],
    operation_id = "listThreads",
    security([])
)]
#[get("/discussions")]
pub async fn list_threads(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<ThreadSummaryResponse>>> {
    let page = page_request(query.page, THREADS_PAGE_SIZE)?;
    let threads = state.discussions.list_threads(page).await?;
    Ok(web::Json(PageResponse::from_page(threads, Into::into)))
}

/// Open a thread.
#[utoipa::path(
    post,
    path = "/api/v1/discussions",
    request_body = ThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Module not found", body = Error)
    ),
    tags = ["discussions"],
    operation_id = "createThread"
)]
#[post("/discussions")]
pub async fn create_thread(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ThreadRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user(&state).await?;
    let form = ThreadForm::try_from(payload.into_inner())?;
    let thread = state.discussions.create_thread(&actor, form).await?;
    Ok(HttpResponse::Created().json(ThreadResponse::from(thread)))
}

/// Thread with its nested comments. Each read counts as a view.
#[utoipa::path(
    get,
    path = "/api/v1/discussions/{thread_id}",
    params(("thread_id" = Uuid, Path, description = "Thread id")),
    responses(
        (status = 200, description = "Thread detail", body = ThreadDetailResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["discussions"],
    operation_id = "getThread",
    security([])
)]
#[get("/discussions/{thread_id}")]
pub async fn get_thread(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ThreadDetailResponse>> {
    let detail = state.discussions.get_thread(path.into_inner()).await?;
    Ok(web::Json(detail.into()))
}

/// Edit a thread (its author only).
#[utoipa::path(
    put,
    path = "/api/v1/discussions/{thread_id}",
    params(("thread_id" = Uuid, Path, description = "Thread id")),
    request_body = ThreadRequest,
    responses(
        (status = 200, description = "Updated thread", body = ThreadResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["discussions"],
    operation_id = "updateThread"
)]
#[put("/discussions/{thread_id}")]
pub async fn update_thread(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ThreadRequest>,
) -> ApiResult<web::Json<ThreadResponse>> {
    let actor = session.require_user(&state).await?;
    let form = ThreadForm::try_from(payload.into_inner())?;
    let thread = state
        .discussions
        .update_thread(&actor, path.into_inner(), form)
        .await?;
    Ok(web::Json(thread.into()))
}

/// Comment on a thread, or reply to one of its comments.
#[utoipa::path(
    post,
    path = "/api/v1/discussions/{thread_id}/comments",
    params(("thread_id" = Uuid, Path, description = "Thread id")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 400, description = "Invalid comment", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Thread or parent not found", body = Error),
        (status = 409, description = "Thread closed", body = Error)
    ),
    tags = ["discussions"],
    operation_id = "addComment"
)]
#[post("/discussions/{thread_id}/comments")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user(&state).await?;
    let CommentRequest { content, parent_id } = payload.into_inner();
    let parent_id = parse_optional_uuid(parent_id, FieldName::new("parentId"))?;
    let comment = state
        .discussions
        .add_comment(&actor, path.into_inner(), content, parent_id)
        .await?;
    Ok(HttpResponse::Created().json(CommentResponse::from(comment)))
}

/// Edit a comment (its author only).
#[utoipa::path(
    put,
    path = "/api/v1/comments/{comment_id}",
    params(("comment_id" = Uuid, Path, description = "Comment id")),
    request_body = CommentEditRequest,
    responses(
        (status = 200, description = "Edited comment", body = CommentResponse),
        (status = 400, description = "Invalid comment", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["discussions"],
    operation_id = "editComment"
)]
#[put("/comments/{comment_id}")]
pub async fn edit_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<CommentEditRequest>,
) -> ApiResult<web::Json<CommentResponse>> {
    let actor = session.require_user(&state).await?;
    let comment = state
        .discussions
        .edit_comment(&actor, path.into_inner(), payload.into_inner().content)
        .await?;
    Ok(web::Json(comment.into()))
}

/// Like a comment, or take the like back.
#[utoipa::path(
    post,
    path = "/api/v1/comments/{comment_id}/like",
    params(("comment_id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Like state", body = LikeResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["discussions"],
    operation_id = "toggleLike"
)]
#[post("/comments/{comment_id}/like")]
pub async fn toggle_like(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<LikeResponse>> {
    let actor = session.require_user(&state).await?;
    let toggle = state
        .discussions
        .toggle_like(&actor, path.into_inner())
        .await?;
    Ok(web::Json(toggle.into()))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::App;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::{Comment, CommentContent, CommentNode, DiscussionThread, LikeToggle};
    use crate::domain::{ThreadFields, UserId};
    use crate::domain::ports::ThreadDetail;
    use crate::inbound::http::accounts::login;
    use crate::inbound::http::test_utils::{MockPorts, login_cookie, test_session_middleware};
    use crate::test_support::{citizen, fixture_now};

    fn thread() -> DiscussionThread {
        let fields = ThreadFields::try_from(ThreadForm {
            title: "Polling station access".to_owned(),
            content: "Step-free entrances?".to_owned(),
            module_id: None,
        })
        .expect("valid thread");
        DiscussionThread::create(fields, UserId::random(), fixture_now())
    }

    fn comment(thread_id: Uuid, parent_id: Option<Uuid>) -> Comment {
        Comment::create(
            thread_id,
            UserId::random(),
            CommentContent::new("Most have ramps").expect("valid comment"),
            parent_id,
            fixture_now(),
        )
    }

    macro_rules! app_with {
        ($ports:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new($ports.into_state()))
                    .wrap(test_session_middleware())
                    .service(
                        web::scope("/api/v1")
                            .service(login)
                            .service(list_threads)
                            .service(create_thread)
                            .service(get_thread)
                            .service(add_comment)
                            .service(toggle_like),
                    ),
            )
            .await
        };
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("   "), None)]
    fn blank_module_ids_mean_general_threads(
        #[case] module_id: Option<&str>,
        #[case] expected: Option<Uuid>,
    ) {
        let form = ThreadForm::try_from(ThreadRequest {
            title: "General".to_owned(),
            content: "Hello".to_owned(),
            module_id: module_id.map(str::to_owned),
        })
        .expect("valid request");
        assert_eq!(form.module_id, expected);
    }

    #[rstest]
    fn malformed_module_ids_are_rejected() {
        let error = ThreadForm::try_from(ThreadRequest {
            title: "General".to_owned(),
            content: "Hello".to_owned(),
            module_id: Some("civics".to_owned()),
        })
        .expect_err("malformed id");
        assert_eq!(
            error.details().and_then(|d| d.get("field")),
            Some(&json!("moduleId"))
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn thread_detail_nests_replies() {
        let mut ports = MockPorts::default();
        let thread = thread();
        let root = comment(thread.id, None);
        let reply = comment(thread.id, Some(root.id));
        let (thread_id, reply_id) = (thread.id, reply.id);
        ports
            .discussions
            .expect_get_thread()
            .withf(move |id| *id == thread_id)
            .returning(move |_| {
                Ok(ThreadDetail {
                    thread: thread.clone(),
                    comments: vec![CommentNode {
                        comment: root.clone(),
                        replies: vec![CommentNode {
                            comment: reply.clone(),
                            replies: Vec::new(),
                        }],
                    }],
                })
            });
        let app = app_with!(ports);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/discussions/{thread_id}"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body["comments"][0]["replies"][0]["id"],
            json!(reply_id.to_string())
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn replies_carry_their_parent() {
        let learner = citizen();
        let mut ports = MockPorts::signed_in_as(&learner);
        let (thread_id, parent_id) = (Uuid::new_v4(), Uuid::new_v4());
        ports
            .discussions
            .expect_add_comment()
            .withf(move |_, thread, content, parent| {
                *thread == thread_id && content == "Agreed" && *parent == Some(parent_id)
            })
            .returning(move |_, _, _, _| Ok(comment(thread_id, Some(parent_id))));
        let app = app_with!(ports);
        let cookie = login_cookie(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/discussions/{thread_id}/comments"))
                .cookie(cookie)
                .set_json(json!({ "content": "Agreed", "parentId": parent_id.to_string() }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[rstest]
    #[actix_web::test]
    async fn likes_report_the_new_count() {
        let learner = citizen();
        let mut ports = MockPorts::signed_in_as(&learner);
        ports.discussions.expect_toggle_like().returning(|_, _| {
            Ok(LikeToggle {
                liked: true,
                likes_count: 3,
            })
        });
        let app = app_with!(ports);
        let cookie = login_cookie(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/comments/{}/like", Uuid::new_v4()))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body, json!({ "liked": true, "likesCount": 3 }));
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_visitors_cannot_post() {
        let app = app_with!(MockPorts::default());
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/discussions")
                .set_json(json!({ "title": "Hi", "content": "There" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
