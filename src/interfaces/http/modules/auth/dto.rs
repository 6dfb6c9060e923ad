use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::identity::{AuthResult, Registration};
use crate::interfaces::http::modules::users::UserDto;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "user@evpulse.com")]
    pub email: Option<String>,
    #[schema(example = "user123")]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    /// `user` (default) or `operator`
    pub role: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub vehicle: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub company: Option<Value>,
}

impl From<RegisterRequest> for Registration {
    fn from(r: RegisterRequest) -> Self {
        Self {
            email: r.email,
            password: r.password,
            name: r.name,
            role: r.role,
            phone: r.phone,
            vehicle: r.vehicle,
            company: r.company,
        }
    }
}

/// Signed-in account and its bearer token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserDto,
    pub token: String,
}

impl From<AuthResult> for AuthResponse {
    fn from(r: AuthResult) -> Self {
        Self {
            user: r.user.into(),
            token: r.token,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}
