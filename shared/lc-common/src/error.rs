//! Error Types
//!
//! Validation failures carry a list of [`ValidationIssue`]s so callers can
//! report every offending field at once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single validation failure at a field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ValidationIssue {
    /// Path segments from the document root to the offending field.
    pub path: Vec<String>,
    /// Human-readable message.
    pub message: String,
}

impl ValidationIssue {
    /// Create an issue at a single top-level field.
    pub fn at(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.into()],
            message: message.into(),
        }
    }

    /// Create an issue with no path (document-level).
    pub fn root(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.message)
        }
    }
}

/// Render a list of issues as a single line.
///
/// Each issue becomes `path.to.field: message` and issues are joined by a
/// single space.
///
/// ```
/// use lc_common::error::{errors_to_string, ValidationIssue};
///
/// let issues = vec![
///     ValidationIssue::at("rating", "Invalid enum value"),
///     ValidationIssue::root("Required"),
/// ];
/// assert_eq!(errors_to_string(&issues), "rating: Invalid enum value Required");
/// ```
pub fn errors_to_string(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert `validator` derive errors into path-addressed issues.
pub fn issues_from_validator(errors: &validator::ValidationErrors) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| ValidationIssue {
                path: vec![(*field).to_string()],
                message: e
                    .message
                    .as_ref()
                    .map_or_else(|| e.code.to_string(), ToString::to_string),
            })
        })
        .collect();
    issues.sort_by(|a, b| a.path.cmp(&b.path));
    issues
}

/// Common library error.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more fields failed validation.
    #[error("Validation failed: {}", errors_to_string(.0))]
    Validation(Vec<ValidationIssue>),

    /// The payload was not valid JSON for the expected shape.
    #[error("Invalid payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a single-issue validation error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![ValidationIssue::at(field, message)])
    }

    /// Issues carried by this error, if it is a validation error.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Validation(issues) => issues,
            Self::Json(_) => &[],
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(issues_from_validator(&errors))
    }
}

/// Result type alias using the common error type.
pub type Result<T> = std::result::Result<T, Error>;
