//! User directory handlers. Delegates to `UserService`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension,
};

use super::dto::{SearchUsersParams, UpdateProfileRequest, UserDto};
use crate::application::UserService;
use crate::domain::UserRole;
use crate::interfaces::http::common::{ok, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/api/users/search",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(SearchUsersParams),
    responses(
        (status = 200, description = "Matching users", body = ApiResponse<Vec<UserDto>>),
        (status = 403, description = "Operators and admins only")
    )
)]
pub async fn search_users(
    State(users): State<Arc<UserService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<SearchUsersParams>,
) -> ApiResult<Vec<UserDto>> {
    user.require(&[UserRole::Operator, UserRole::Admin])?;
    let found = users.search(&params.q, params.role.as_deref()).await?;
    ok(found.into_iter().map(UserDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserDto>),
        (status = 403, description = "Not the caller and caller is not an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(users): State<Arc<UserService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<UserDto> {
    let found = users.get_user(&user.actor(), &id).await?;
    ok(found.into())
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 400, description = "No valid fields to update"),
        (status = 403, description = "Not the caller and caller is not an admin")
    )
)]
pub async fn update_user(
    State(users): State<Arc<UserService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<UserDto> {
    let updated = users.update_user(&user.actor(), &id, request.into()).await?;
    ok(updated.into())
}
