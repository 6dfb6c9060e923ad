//! Review handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension,
};

use super::dto::{CreateReviewRequest, ReviewDto};
use crate::application::ReviewService;
use crate::domain::UserRole;
use crate::interfaces::http::common::{
    created, ok, ApiResponse, ApiResult, Created, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/reviews/station/{station_id}",
    tag = "Reviews",
    params(("station_id" = String, Path, description = "Station ID")),
    responses((status = 200, description = "Reviews of the station, newest first", body = ApiResponse<Vec<ReviewDto>>))
)]
pub async fn station_reviews(
    State(reviews): State<Arc<ReviewService>>,
    Path(station_id): Path<String>,
) -> ApiResult<Vec<ReviewDto>> {
    let views = reviews.for_station(&station_id).await?;
    ok(views.into_iter().map(ReviewDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/reviews/user/{user_id}",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Reviews written by the user", body = ApiResponse<Vec<ReviewDto>>))
)]
pub async fn user_reviews(
    State(reviews): State<Arc<ReviewService>>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<ReviewDto>> {
    let views = reviews.for_user(&user_id).await?;
    ok(views.into_iter().map(ReviewDto::from).collect())
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review posted and station rating updated", body = ApiResponse<ReviewDto>),
        (status = 400, description = "Invalid rating or station already reviewed"),
        (status = 404, description = "Station not found")
    )
)]
pub async fn create_review(
    State(reviews): State<Arc<ReviewService>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateReviewRequest>,
) -> Created<ReviewDto> {
    let actor = user.require(&[UserRole::User])?;
    created(reviews.create(&actor, request.into()).await?.into())
}

#[utoipa::path(
    post,
    path = "/api/reviews/{id}/helpful",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Helpful count incremented", body = ApiResponse<String>),
        (status = 404, description = "Review not found")
    )
)]
pub async fn mark_helpful(
    State(reviews): State<Arc<ReviewService>>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    reviews.mark_helpful(&id).await?;
    Ok(axum::Json(ApiResponse::message("Marked as helpful")))
}
