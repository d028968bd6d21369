//! Message request and response types.

use lc_common::feedback::{FeedbackRating, MinimalFeedback};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Validated feedback and whether its tag matches the rating.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackValidationResponse {
    pub feedback: MinimalFeedback,
    pub consistent: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedbackTagsQuery {
    /// Only tags offered for this rating.
    pub rating: Option<FeedbackRating>,
}
