//! Shared validation helpers for inbound HTTP adapters.

use std::collections::HashMap;

use pagination::{PageRequest, PageRequestError};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidPage,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidPage => "invalid_page",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_uuid(value: String, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(&value).map_err(|_| invalid_uuid_error(field, &value))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<Uuid>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_uuid(raw, field))
        .transpose()
}

/// Parse a submitted answer sheet keyed by question id.
///
/// Errors name the offending key as `answers.<key>`.
pub(crate) fn parse_answer_map(
    answers: HashMap<String, String>,
) -> Result<HashMap<Uuid, Uuid>, Error> {
    answers
        .into_iter()
        .map(|(question, choice)| {
            let question_id = Uuid::parse_str(&question).map_err(|_| {
                ValidationError::new("answers", "answer keys must be question UUIDs")
                    .with_value(ErrorCode::InvalidUuid, question.clone())
            })?;
            let choice_id = Uuid::parse_str(&choice).map_err(|_| {
                ValidationError::new(
                    format!("answers.{question}"),
                    "selected choices must be UUIDs",
                )
                .with_value(ErrorCode::InvalidUuid, choice.clone())
            })?;
            Ok((question_id, choice_id))
        })
        .collect()
}

/// Build a page request from the optional `page` query parameter.
pub(crate) fn page_request(page: Option<u32>, size: u32) -> Result<PageRequest, Error> {
    PageRequest::from_optional(page, size).map_err(|err| match err {
        PageRequestError::ZeroPage => ValidationError::new("page", "page numbers start at 1")
            .with_value(ErrorCode::InvalidPage, "0"),
        PageRequestError::InvalidSize { .. } => Error::internal(err.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::Value;

    use super::*;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    fn missing_fields_name_the_field() {
        let error = missing_field_error(FieldName::new("title"));
        assert_eq!(error.message(), "missing required field: title");
        assert_eq!(detail(&error, "code"), Some(&json!("missing_field")));
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("  "), None)]
    fn blank_optional_uuids_are_absent(#[case] raw: Option<&str>, #[case] expected: Option<Uuid>) {
        let parsed = parse_optional_uuid(raw.map(str::to_owned), FieldName::new("moduleId"))
            .expect("blank values are accepted");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn malformed_uuids_echo_the_value() {
        let error = parse_uuid("abc".to_owned(), FieldName::new("moduleId"))
            .expect_err("not a uuid");
        assert_eq!(detail(&error, "field"), Some(&json!("moduleId")));
        assert_eq!(detail(&error, "value"), Some(&json!("abc")));
    }

    #[rstest]
    fn page_zero_is_rejected() {
        let error = page_request(Some(0), 12).expect_err("zero page");
        assert_eq!(detail(&error, "code"), Some(&json!("invalid_page")));
        assert_eq!(page_request(None, 12).expect("default").page(), 1);
    }

    #[rstest]
    fn answer_maps_parse_both_sides() {
        let (question, choice) = (Uuid::new_v4(), Uuid::new_v4());
        let parsed =
            parse_answer_map(HashMap::from([(question.to_string(), choice.to_string())]))
                .expect("valid answers");
        assert_eq!(parsed.get(&question), Some(&choice));
    }

    #[rstest]
    fn bad_choices_point_at_their_question() {
        let question = Uuid::new_v4();
        let error = parse_answer_map(HashMap::from([(question.to_string(), "b".to_owned())]))
            .expect_err("bad choice");
        assert_eq!(
            detail(&error, "field"),
            Some(&json!(format!("answers.{question}")))
        );
    }
}
