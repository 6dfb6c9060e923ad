//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, Extension};

use super::dto::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::application::UserService;
use crate::interfaces::http::common::{
    created, ok, ApiResponse, ApiResult, Created, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::users::{UpdateProfileRequest, UserDto};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Email and password are required"),
        (status = 401, description = "Invalid email or password, or account deactivated")
    )
)]
pub async fn login(
    State(users): State<Arc<UserService>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let result = users
        .login(
            request.email.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;
    ok(result.into())
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Missing field, invalid role or email already registered")
    )
)]
pub async fn register(
    State(users): State<Arc<UserService>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Created<AuthResponse> {
    let result = users.register(request.into()).await?;
    created(result.into())
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserDto>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_current_user(
    State(users): State<Arc<UserService>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<UserDto> {
    ok(users.me(&user.user_id).await?.into())
}

#[utoipa::path(
    put,
    path = "/api/auth/update-profile",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserDto>),
        (status = 400, description = "No valid fields to update")
    )
)]
pub async fn update_profile(
    State(users): State<Arc<UserService>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<UserDto> {
    ok(users.update_profile(&user.user_id, request.into()).await?.into())
}

#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Current password and new password are required"),
        (status = 401, description = "Current password is incorrect")
    )
)]
pub async fn change_password(
    State(users): State<Arc<UserService>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    users
        .change_password(
            &user.user_id,
            request.current_password.as_deref().unwrap_or_default(),
            request.new_password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(axum::Json(ApiResponse::message("Password changed successfully")))
}
