//! Charging session handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension,
};

use super::dto::{SessionDto, SessionStatsDto, StartSessionRequest};
use crate::application::SessionService;
use crate::domain::UserRole;
use crate::interfaces::http::common::{
    created, ok, ApiResponse, ApiResult, Created, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

const ANY_ROLE: [UserRole; 3] = [UserRole::User, UserRole::Operator, UserRole::Admin];
const DRIVER_OR_ADMIN: [UserRole; 2] = [UserRole::User, UserRole::Admin];

#[utoipa::path(
    get,
    path = "/api/sessions",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Sessions visible to the caller, newest first", body = ApiResponse<Vec<SessionDto>>))
)]
pub async fn list_sessions(
    State(sessions): State<Arc<SessionService>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<SessionDto>> {
    let actor = user.require(&ANY_ROLE)?;
    let views = sessions.list(&actor).await?;
    ok(views.into_iter().map(SessionDto::from).collect())
}

/// Same listing as `GET /api/sessions`; the path id is not consulted.
#[utoipa::path(
    get,
    path = "/api/sessions/user/{user_id}",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Sessions visible to the caller", body = ApiResponse<Vec<SessionDto>>))
)]
pub async fn list_user_sessions(
    State(sessions): State<Arc<SessionService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(_user_id): Path<String>,
) -> ApiResult<Vec<SessionDto>> {
    list_sessions(State(sessions), Extension(user)).await
}

#[utoipa::path(
    get,
    path = "/api/sessions/active/{user_id}",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "The active session; `data` is null when not charging", body = ApiResponse<SessionDto>),
        (status = 403, description = "Another user's session")
    )
)]
pub async fn active_session(
    State(sessions): State<Arc<SessionService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Option<SessionDto>> {
    let actor = user.require(&DRIVER_OR_ADMIN)?;
    ok(sessions.active_for(&actor, &user_id).await?.map(Into::into))
}

#[utoipa::path(
    post,
    path = "/api/sessions/start",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Charging started", body = ApiResponse<SessionDto>),
        (status = 400, description = "Already charging, port busy, or station unavailable"),
        (status = 404, description = "Station or port not found")
    )
)]
pub async fn start_session(
    State(sessions): State<Arc<SessionService>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<StartSessionRequest>,
) -> Created<SessionDto> {
    let actor = user.require(&[UserRole::User])?;
    created(sessions.start(&actor, request.into()).await?.into())
}

#[utoipa::path(
    post,
    path = "/api/sessions/stop/{id}",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session completed and billed", body = ApiResponse<SessionDto>),
        (status = 400, description = "Session is not active"),
        (status = 403, description = "Not allowed to stop this session"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn stop_session(
    State(sessions): State<Arc<SessionService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<SessionDto> {
    let actor = user.require(&ANY_ROLE)?;
    ok(sessions.stop(&actor, &id).await?.into())
}

#[utoipa::path(
    get,
    path = "/api/sessions/station/{station_id}",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    params(("station_id" = String, Path, description = "Station ID")),
    responses(
        (status = 200, description = "Sessions at the station", body = ApiResponse<Vec<SessionDto>>),
        (status = 403, description = "Not the owning operator")
    )
)]
pub async fn list_station_sessions(
    State(sessions): State<Arc<SessionService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(station_id): Path<String>,
) -> ApiResult<Vec<SessionDto>> {
    let actor = user.require(&[UserRole::Operator, UserRole::Admin])?;
    let views = sessions.for_station(&actor, &station_id).await?;
    ok(views.into_iter().map(SessionDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/sessions/history/{user_id}",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Completed sessions", body = ApiResponse<Vec<SessionDto>>))
)]
pub async fn session_history(
    State(sessions): State<Arc<SessionService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<SessionDto>> {
    let actor = user.require(&DRIVER_OR_ADMIN)?;
    let views = sessions.history(&actor, &user_id).await?;
    ok(views.into_iter().map(SessionDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/sessions/stats/{user_id}",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Lifetime charging figures", body = ApiResponse<SessionStatsDto>))
)]
pub async fn session_stats(
    State(sessions): State<Arc<SessionService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> ApiResult<SessionStatsDto> {
    let actor = user.require(&DRIVER_OR_ADMIN)?;
    ok(sessions.stats(&actor, &user_id).await?.into())
}
