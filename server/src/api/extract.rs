//! Request Extractors
//!
//! `JsonBody` wraps axum's `Json` so malformed bodies answer with the same
//! JSON error shape as every other failure.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lc_common::error::ValidationIssue;
use serde::de::DeserializeOwned;
use serde_json::json;

/// JSON request body with a JSON rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonBodyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(JsonBodyError)
    }
}

/// A request body that could not be decoded.
#[derive(Debug)]
pub struct JsonBodyError(pub JsonRejection);

/// Split axum's rejection text into a field path and message.
///
/// `"...target type: updated[0].accessRoleId: unknown variant"` becomes the
/// path `["updated", "0", "accessRoleId"]`.
fn body_issue(text: &str) -> ValidationIssue {
    let detail = text
        .split_once("target type: ")
        .or_else(|| text.split_once("body as JSON: "))
        .map_or(text, |(_, detail)| detail);

    match detail.split_once(": ") {
        Some((path, message)) if !path.contains(char::is_whitespace) => ValidationIssue {
            path: path
                .split(['.', '[', ']'])
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
            message: message.to_string(),
        },
        _ => ValidationIssue::root(detail),
    }
}

impl IntoResponse for JsonBodyError {
    fn into_response(self) -> Response {
        let text = self.0.body_text();
        match &self.0 {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                let body = json!({
                    "error": "VALIDATION_ERROR",
                    "message": text,
                    "issues": [body_issue(&text)],
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            JsonRejection::MissingJsonContentType(_) => {
                let body = json!({ "error": "UNSUPPORTED_MEDIA_TYPE", "message": text });
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, Json(body)).into_response()
            }
            other => {
                let body = json!({ "error": "INVALID_BODY", "message": text });
                (other.status(), Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_issue_splits_field_path() {
        let issue = body_issue(
            "Failed to deserialize the JSON body into the target type: \
             updated[0].accessRoleId: unknown variant `agent_superuser`",
        );
        assert_eq!(issue.path, vec!["updated", "0", "accessRoleId"]);
        assert_eq!(issue.message, "unknown variant `agent_superuser`");
    }

    #[test]
    fn test_body_issue_without_path() {
        let issue = body_issue(
            "Failed to deserialize the JSON body into the target type: \
             missing field `groups` at line 1 column 2",
        );
        assert!(issue.path.is_empty());
        assert_eq!(issue.message, "missing field `groups` at line 1 column 2");
    }

    #[test]
    fn test_syntax_error_detail() {
        let issue = body_issue(
            "Failed to parse the request body as JSON: expected value at line 1 column 1",
        );
        assert!(issue.path.is_empty());
        assert_eq!(issue.message, "expected value at line 1 column 1");
    }
}
