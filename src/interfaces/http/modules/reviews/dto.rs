use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::reviews::{NewReview, ReviewView};
use crate::domain::Review;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: String,
    pub station_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub session_id: Option<String>,
    pub rating: i32,
    pub comment: String,
    pub helpful: i32,
    pub timestamp: DateTime<Utc>,
}

impl From<Review> for ReviewDto {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            station_id: r.station_id,
            user_id: r.user_id,
            user_name: None,
            session_id: r.session_id,
            rating: r.rating,
            comment: r.comment,
            helpful: r.helpful,
            timestamp: r.timestamp,
        }
    }
}

impl From<ReviewView> for ReviewDto {
    fn from(v: ReviewView) -> Self {
        Self {
            user_name: Some(v.user_name),
            ..v.review.into()
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub station_id: Option<String>,
    pub session_id: Option<String>,
    /// 1 to 5 stars
    pub rating: Option<i32>,
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

impl From<CreateReviewRequest> for NewReview {
    fn from(r: CreateReviewRequest) -> Self {
        Self {
            station_id: r.station_id,
            session_id: r.session_id,
            rating: r.rating,
            comment: r.comment,
        }
    }
}
