//! Message feedback.
//!
//! A rating is a thumbs up or down plus one tag from a fixed list. The wire
//! form carries only the tag key.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::{Error, Result, ValidationIssue};

/// Longest free-text comment accepted, in characters.
pub const MAX_FEEDBACK_TEXT: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum FeedbackRating {
    ThumbsUp,
    ThumbsDown,
}

impl FeedbackRating {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThumbsUp => "thumbsUp",
            Self::ThumbsDown => "thumbsDown",
        }
    }
}

/// The fixed set of feedback reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTagKey {
    NotMatched,
    Inaccurate,
    BadStyle,
    MissingImage,
    UnjustifiedRefusal,
    NotHelpful,
    Other,
    AccurateReliable,
    CreativeSolution,
    ClearWellWritten,
    AttentionToDetail,
}

impl FeedbackTagKey {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::NotMatched,
            Self::Inaccurate,
            Self::BadStyle,
            Self::MissingImage,
            Self::UnjustifiedRefusal,
            Self::NotHelpful,
            Self::Other,
            Self::AccurateReliable,
            Self::CreativeSolution,
            Self::ClearWellWritten,
            Self::AttentionToDetail,
        ]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotMatched => "not_matched",
            Self::Inaccurate => "inaccurate",
            Self::BadStyle => "bad_style",
            Self::MissingImage => "missing_image",
            Self::UnjustifiedRefusal => "unjustified_refusal",
            Self::NotHelpful => "not_helpful",
            Self::Other => "other",
            Self::AccurateReliable => "accurate_reliable",
            Self::CreativeSolution => "creative_solution",
            Self::ClearWellWritten => "clear_well_written",
            Self::AttentionToDetail => "attention_to_detail",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.as_str() == s)
    }

    /// Rating this reason belongs to.
    #[must_use]
    pub const fn direction(self) -> FeedbackRating {
        match self {
            Self::NotMatched
            | Self::Inaccurate
            | Self::BadStyle
            | Self::MissingImage
            | Self::UnjustifiedRefusal
            | Self::NotHelpful
            | Self::Other => FeedbackRating::ThumbsDown,
            Self::AccurateReliable
            | Self::CreativeSolution
            | Self::ClearWellWritten
            | Self::AttentionToDetail => FeedbackRating::ThumbsUp,
        }
    }

    const fn icon(self) -> &'static str {
        match self {
            Self::NotMatched | Self::Inaccurate => "AlertCircle",
            Self::BadStyle | Self::ClearWellWritten => "PenTool",
            Self::MissingImage => "ImageOff",
            Self::UnjustifiedRefusal => "Ban",
            Self::NotHelpful => "ThumbsDown",
            Self::Other => "HelpCircle",
            Self::AccurateReliable => "CheckCircle",
            Self::CreativeSolution => "Lightbulb",
            Self::AttentionToDetail => "Search",
        }
    }
}

/// Display metadata of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeedbackTag {
    pub key: FeedbackTagKey,
    /// Localization key.
    pub label: String,
    pub direction: FeedbackRating,
    pub icon: String,
}

impl From<FeedbackTagKey> for FeedbackTag {
    fn from(key: FeedbackTagKey) -> Self {
        Self {
            key,
            label: format!("com_ui_feedback_tag_{}", key.as_str()),
            direction: key.direction(),
            icon: key.icon().to_string(),
        }
    }
}

/// Every tag, thumbs-down reasons first.
#[must_use]
pub fn feedback_tags() -> Vec<FeedbackTag> {
    FeedbackTagKey::all()
        .iter()
        .copied()
        .map(FeedbackTag::from)
        .collect()
}

#[must_use]
pub fn tags_for_rating(rating: FeedbackRating) -> Vec<FeedbackTag> {
    feedback_tags()
        .into_iter()
        .filter(|t| t.direction == rating)
        .collect()
}

#[must_use]
pub fn tag_by_key(key: Option<FeedbackTagKey>) -> Option<FeedbackTag> {
    key.map(FeedbackTag::from)
}

/// Feedback as the UI holds it, with the full tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub rating: FeedbackRating,
    pub tag: Option<FeedbackTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Feedback as stored on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MinimalFeedback {
    pub rating: FeedbackRating,
    pub tag: FeedbackTagKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1024, message = "Feedback text must be at most 1024 characters"))]
    pub text: Option<String>,
}

impl MinimalFeedback {
    /// Decode and validate untrusted feedback, reporting every bad field.
    pub fn parse(value: &Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(Error::Validation(vec![ValidationIssue::root(
                "Expected object",
            )]));
        };

        let mut issues = Vec::new();
        let rating = decode_field::<FeedbackRating>(object.get("rating"), "rating", &mut issues);
        let tag = decode_field::<FeedbackTagKey>(object.get("tag"), "tag", &mut issues);
        let text = match object.get("text") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                issues.push(ValidationIssue::at("text", "Expected string"));
                None
            }
        };

        match (rating, tag) {
            (Some(rating), Some(tag)) if issues.is_empty() => {
                let feedback = Self { rating, tag, text };
                feedback.validate()?;
                Ok(feedback)
            }
            _ => Err(Error::Validation(issues)),
        }
    }

    /// Whether the tag belongs to the chosen rating.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        matches!(
            (self.rating, self.tag.direction()),
            (FeedbackRating::ThumbsUp, FeedbackRating::ThumbsUp)
                | (FeedbackRating::ThumbsDown, FeedbackRating::ThumbsDown)
        )
    }
}

fn decode_field<T: serde::de::DeserializeOwned>(
    value: Option<&Value>,
    field: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<T> {
    let Some(value) = value else {
        issues.push(ValidationIssue::at(field, "Required"));
        return None;
    };
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(_) => {
            issues.push(ValidationIssue::at(
                field,
                format!("Invalid enum value, received {value}"),
            ));
            None
        }
    }
}

/// Reduce UI feedback to its stored form.
///
/// Feedback without a tag has no stored form.
#[must_use]
pub fn to_minimal_feedback(feedback: Option<&Feedback>) -> Option<MinimalFeedback> {
    let feedback = feedback?;
    let tag = feedback.tag.as_ref()?;
    Some(MinimalFeedback {
        rating: feedback.rating,
        tag: tag.key,
        text: feedback.text.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_order_and_directions() {
        let tags = feedback_tags();
        assert_eq!(tags.len(), 11);
        assert!(tags[..7]
            .iter()
            .all(|t| t.direction == FeedbackRating::ThumbsDown));
        assert!(tags[7..]
            .iter()
            .all(|t| t.direction == FeedbackRating::ThumbsUp));
        assert_eq!(tags[0].label, "com_ui_feedback_tag_not_matched");
        assert_eq!(tags_for_rating(FeedbackRating::ThumbsUp).len(), 4);
    }

    #[test]
    fn test_every_key_round_trips_through_parse() {
        for &key in FeedbackTagKey::all() {
            assert_eq!(FeedbackTagKey::parse(key.as_str()), Some(key));
            assert_eq!(serde_json::to_value(key).unwrap(), key.as_str());
        }
        assert_eq!(FeedbackTagKey::parse("rude"), None);
    }

    #[test]
    fn test_unknown_tag_fails_validation() {
        let err = MinimalFeedback::parse(&json!({ "rating": "thumbsDown", "tag": "rude" }))
            .unwrap_err();
        assert_eq!(err.issues()[0].path, vec!["tag".to_string()]);
    }

    #[test]
    fn test_missing_fields_are_reported_together() {
        let err = MinimalFeedback::parse(&json!({ "text": 5 })).unwrap_err();
        let paths: Vec<String> = err.issues().iter().map(|i| i.path.join(".")).collect();
        assert_eq!(paths, vec!["rating", "tag", "text"]);
    }

    #[test]
    fn test_text_length_limit() {
        let ok = MinimalFeedback::parse(&json!({
            "rating": "thumbsUp",
            "tag": "creative_solution",
            "text": "é".repeat(1024)
        }));
        assert!(ok.is_ok());

        let too_long = MinimalFeedback::parse(&json!({
            "rating": "thumbsUp",
            "tag": "creative_solution",
            "text": "a".repeat(1025)
        }));
        assert_eq!(too_long.unwrap_err().issues()[0].path, vec!["text".to_string()]);
    }

    #[test]
    fn test_to_minimal_feedback() {
        let feedback = Feedback {
            rating: FeedbackRating::ThumbsDown,
            tag: tag_by_key(Some(FeedbackTagKey::Inaccurate)),
            text: Some("wrong date".into()),
        };
        let minimal = to_minimal_feedback(Some(&feedback)).unwrap();
        assert_eq!(
            serde_json::to_value(&minimal).unwrap(),
            json!({ "rating": "thumbsDown", "tag": "inaccurate", "text": "wrong date" })
        );
        assert!(minimal.is_consistent());

        let untagged = Feedback {
            tag: None,
            ..feedback
        };
        assert_eq!(to_minimal_feedback(Some(&untagged)), None);
        assert_eq!(to_minimal_feedback(None), None);
    }
}
