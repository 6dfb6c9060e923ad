//! Admin handlers
//!
//! Routes are mounted behind `require_admin`, so handlers do not check the
//! role themselves.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{
    AdminSessionDto, AdminStatsDto, AdminTransactionDto, FeedbackStatsDto, ReviewListParams,
    UserListParams,
};
use crate::application::{
    AdminService, BookingService, ReviewService, StationService, UserService,
};
use crate::interfaces::http::common::{ok, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::modules::bookings::BookingDto;
use crate::interfaces::http::modules::reviews::ReviewDto;
use crate::interfaces::http::modules::stations::{StationListingDto, StatusRequest};
use crate::interfaces::http::modules::users::UserDto;

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Platform dashboard figures", body = ApiResponse<AdminStatsDto>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn admin_stats(State(admin): State<Arc<AdminService>>) -> ApiResult<AdminStatsDto> {
    ok(admin.stats().await?.into())
}

#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All bookings, newest first", body = ApiResponse<Vec<BookingDto>>))
)]
pub async fn all_bookings(
    State(bookings): State<Arc<BookingService>>,
) -> ApiResult<Vec<BookingDto>> {
    let views = bookings.list_all().await?;
    ok(views.into_iter().map(BookingDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/admin/sessions",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All sessions with driver, station and operator names", body = ApiResponse<Vec<AdminSessionDto>>))
)]
pub async fn all_sessions(
    State(admin): State<Arc<AdminService>>,
) -> ApiResult<Vec<AdminSessionDto>> {
    let views = admin.sessions().await?;
    ok(views.into_iter().map(AdminSessionDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/admin/transactions",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All transactions with user names", body = ApiResponse<Vec<AdminTransactionDto>>))
)]
pub async fn all_transactions(
    State(admin): State<Arc<AdminService>>,
) -> ApiResult<Vec<AdminTransactionDto>> {
    let views = admin.transactions().await?;
    ok(views.into_iter().map(AdminTransactionDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(UserListParams),
    responses((status = 200, description = "Accounts, optionally of one role", body = ApiResponse<Vec<UserDto>>))
)]
pub async fn list_users(
    State(users): State<Arc<UserService>>,
    Query(params): Query<UserListParams>,
) -> ApiResult<Vec<UserDto>> {
    let list = users.list_users(params.role.as_deref()).await?;
    ok(list.into_iter().map(UserDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/admin/stations",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All stations with operator names", body = ApiResponse<Vec<StationListingDto>>))
)]
pub async fn all_stations(
    State(stations): State<Arc<StationService>>,
) -> ApiResult<Vec<StationListingDto>> {
    let listings = stations.list_all().await?;
    ok(listings.into_iter().map(StationListingDto::from).collect())
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/status",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Account activated or deactivated"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_status(
    State(users): State<Arc<UserService>>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<StatusRequest>,
) -> ApiResult<()> {
    users.set_status(&id, &request.status).await?;
    Ok(Json(ApiResponse::message("User status updated")))
}

#[utoipa::path(
    put,
    path = "/api/admin/stations/{id}/status",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Station ID")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Station status changed"),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Station not found")
    )
)]
pub async fn update_station_status(
    State(stations): State<Arc<StationService>>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<StatusRequest>,
) -> ApiResult<()> {
    stations.force_status(&id, &request.status).await?;
    Ok(Json(ApiResponse::message("Station status updated")))
}

#[utoipa::path(
    get,
    path = "/api/admin/feedback/stats",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Review statistics", body = ApiResponse<FeedbackStatsDto>))
)]
pub async fn feedback_stats(
    State(admin): State<Arc<AdminService>>,
) -> ApiResult<FeedbackStatsDto> {
    ok(admin.feedback_stats().await?.into())
}

#[utoipa::path(
    get,
    path = "/api/admin/feedback/reviews",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(ReviewListParams),
    responses((status = 200, description = "Reviews, newest first", body = ApiResponse<Vec<ReviewDto>>))
)]
pub async fn feedback_reviews(
    State(reviews): State<Arc<ReviewService>>,
    Query(params): Query<ReviewListParams>,
) -> ApiResult<Vec<ReviewDto>> {
    let views = reviews.list(params.into()).await?;
    ok(views.into_iter().map(ReviewDto::from).collect())
}
