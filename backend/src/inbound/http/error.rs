//! Domain errors as HTTP responses.
//!
//! Every failure leaves the API as the same JSON envelope with the request's
//! trace id in both the body and the `trace-id` header. The extractor
//! configs below route malformed bodies, queries and paths through it too.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code() != ErrorCode::InternalError {
            return response.json(self);
        }
        // Internal messages and details stay in the logs.
        let public = Error::internal("Internal server error");
        match self.trace_id() {
            Some(id) => response.json(public.with_trace_id(id.to_owned())),
            None => response.json(public),
        }
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

fn rejected_input(kind: &str, detail: String) -> actix_web::Error {
    debug!(kind, detail = %detail, "request input rejected");
    Error::invalid_request(format!("malformed {kind}"))
        .with_details(serde_json::json!({ "reason": detail }))
        .into()
}

/// JSON body extractor config producing `invalid_request` envelopes.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _: &HttpRequest| {
        rejected_input("JSON body", err.to_string())
    })
}

/// Query string extractor config producing `invalid_request` envelopes.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _: &HttpRequest| {
        rejected_input("query string", err.to_string())
    })
}

/// Path extractor config producing `invalid_request` envelopes.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _: &HttpRequest| {
        rejected_input("path", err.to_string())
    })
}
