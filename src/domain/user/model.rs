//! User domain entity

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    /// EV driver: books slots, charges, pays
    User,
    /// Owns and runs stations
    Operator,
    /// Platform administrator
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Operator => "operator",
            Self::Admin => "admin",
        }
    }

    /// Lenient conversion for stored values; unknown roles fall back to `User`.
    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::User)
    }

    /// Strict conversion for client input.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" => Some(Self::User),
            "operator" => Some(Self::Operator),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub profile_image: Option<String>,
    /// Free-form vehicle description, e.g. `{"make": "Tesla", "batteryCapacity": 75}`
    pub vehicle: Option<Value>,
    /// Free-form company description for operators
    pub company: Option<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            password_hash: password_hash.into(),
            name: name.into(),
            role,
            phone: None,
            avatar: None,
            profile_image: None,
            vehicle: None,
            company: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Name shown next to records owned by this user.
    pub fn display_name(&self) -> &str {
        if !self.name.trim().is_empty() {
            &self.name
        } else {
            &self.email
        }
    }

    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(avatar) = update.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(image) = update.profile_image {
            self.profile_image = Some(image);
        }
        if let Some(vehicle) = update.vehicle {
            self.vehicle = Some(vehicle);
        }
        if let Some(company) = update.company {
            self.company = Some(company);
        }
        self.updated_at = Utc::now();
    }
}

/// Self-service profile fields. Anything not listed here cannot be changed
/// through the profile endpoints.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub profile_image: Option<String>,
    pub vehicle: Option<Value>,
    pub company: Option<Value>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.avatar.is_none()
            && self.profile_image.is_none()
            && self.vehicle.is_none()
            && self.company.is_none()
    }
}

/// The caller of a use-case, as established by authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// True when the actor is `user_id` or an admin.
    pub fn can_act_for(&self, user_id: &str) -> bool {
        self.is_admin() || self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_strict_and_from_str_is_lenient() {
        assert_eq!(UserRole::parse("Operator"), Some(UserRole::Operator));
        assert_eq!(UserRole::parse("superuser"), None);
        assert_eq!(UserRole::from_str("superuser"), UserRole::User);
        assert_eq!(UserRole::from_str(UserRole::Admin.as_str()), UserRole::Admin);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut user = User::new("a@b.c", "hash", "  ", UserRole::User);
        assert_eq!(user.display_name(), "a@b.c");
        user.name = "Alice".into();
        assert_eq!(user.display_name(), "Alice");
    }

    #[test]
    fn apply_only_touches_given_fields() {
        let mut user = User::new("a@b.c", "hash", "Alice", UserRole::User);
        user.phone = Some("+1".into());
        user.apply(ProfileUpdate {
            name: Some("Alicia".into()),
            ..Default::default()
        });
        assert_eq!(user.name, "Alicia");
        assert_eq!(user.phone.as_deref(), Some("+1"));
    }

    #[test]
    fn empty_profile_update() {
        assert!(ProfileUpdate::default().is_empty());
        assert!(!ProfileUpdate {
            avatar: Some("x.png".into()),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn actor_permissions() {
        let admin = Actor::new("a", UserRole::Admin);
        let user = Actor::new("u", UserRole::User);
        assert!(admin.can_act_for("someone"));
        assert!(user.can_act_for("u"));
        assert!(!user.can_act_for("other"));
    }
}
