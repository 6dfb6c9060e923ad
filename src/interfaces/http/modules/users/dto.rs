use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::user::{ProfileUpdate, User};

/// Public view of an account. The password hash never leaves the server.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub name: String,
    /// `user`, `operator` or `admin`
    pub role: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub profile_image: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub vehicle: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub company: Option<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role.as_str().to_string(),
            phone: u.phone,
            avatar: u.avatar,
            profile_image: u.profile_image,
            vehicle: u.vehicle,
            company: u.company,
            is_active: u.is_active,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Fields a user may change on their own profile. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub profile_image: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub vehicle: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub company: Option<Value>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            name: r.name,
            phone: r.phone,
            avatar: r.avatar,
            profile_image: r.profile_image,
            vehicle: r.vehicle,
            company: r.company,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchUsersParams {
    /// Substring of the name or email, case-insensitive
    #[serde(default)]
    pub q: String,
    /// Restrict to one role
    pub role: Option<String>,
}
