//! Notification handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::dto::{CountDto, NotificationDto};
use crate::application::NotificationService;
use crate::interfaces::http::common::{ok, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/notifications/user/{user_id}",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Notifications, newest first", body = ApiResponse<Vec<NotificationDto>>),
        (status = 403, description = "Another user's notifications")
    )
)]
pub async fn list_notifications(
    State(notifications): State<Arc<NotificationService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<NotificationDto>> {
    let items = notifications.list(&user.actor(), &user_id).await?;
    ok(items.into_iter().map(NotificationDto::from).collect())
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked as read", body = ApiResponse<String>),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    State(notifications): State<Arc<NotificationService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    notifications.mark_read(&user.actor(), &id).await?;
    Ok(Json(ApiResponse::message("Notification marked as read")))
}

#[utoipa::path(
    put,
    path = "/api/notifications/user/{user_id}/read-all",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Number of notifications marked", body = ApiResponse<CountDto>))
)]
pub async fn mark_all_read(
    State(notifications): State<Arc<NotificationService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> ApiResult<CountDto> {
    let count = notifications.mark_all_read(&user.actor(), &user_id).await?;
    Ok(Json(ApiResponse::with_message(
        CountDto { count },
        "All notifications marked as read",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted", body = ApiResponse<String>),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn delete_notification(
    State(notifications): State<Arc<NotificationService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    notifications.delete(&user.actor(), &id).await?;
    Ok(Json(ApiResponse::message("Notification deleted")))
}

#[utoipa::path(
    get,
    path = "/api/notifications/user/{user_id}/unread-count",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Unread notifications", body = ApiResponse<CountDto>))
)]
pub async fn unread_count(
    State(notifications): State<Arc<NotificationService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> ApiResult<CountDto> {
    let count = notifications.unread_count(&user.actor(), &user_id).await?;
    ok(CountDto { count })
}
