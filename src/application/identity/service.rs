//! User management service, application-layer orchestration
//!
//! HTTP handlers are thin wrappers that delegate here.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::application::access::ensure_self_or_admin;
use crate::domain::user::ProfileUpdate;
use crate::domain::{Actor, DomainError, DomainResult, RepositoryProvider, User, UserRole};
use crate::infrastructure::crypto::{create_token, hash_password, verify_password, JwtConfig};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Returned after a successful login or registration
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub user: User,
}

/// Self-service sign-up input. Required fields arrive as `Option` so the
/// service can report which one is missing.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub vehicle: Option<Value>,
    pub company: Option<Value>,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> DomainResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::Validation(format!("{} is required", field))),
    }
}

pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
}

impl UserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self { repos, jwt_config }
    }

    fn issue_token(&self, user: &User) -> DomainResult<String> {
        create_token(&user.id, &user.email, user.role.as_str(), &self.jwt_config)
            .map_err(|e| DomainError::Internal(format!("Failed to create token: {}", e)))
    }

    async fn load(&self, id: &str) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    // ── Authentication ──────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Email and password are required".into(),
            ));
        }

        let Some(user) = self.repos.users().find_by_email(email).await? else {
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        if !verify_password(password, &user.password_hash) {
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        if !user.is_active {
            return Err(DomainError::Unauthorized("Account is deactivated".into()));
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(AuthResult { token, user })
    }

    // ── Registration ────────────────────────────────────────────

    /// Create an account. Admin accounts cannot be self-assigned.
    pub async fn register(&self, input: Registration) -> DomainResult<AuthResult> {
        let email = required(&input.email, "email")?.to_string();
        let password = required(&input.password, "password")?.to_string();
        let name = required(&input.name, "name")?.to_string();

        let role = match input.role.as_deref().map(str::trim) {
            None | Some("") => UserRole::User,
            Some(raw) => match UserRole::parse(raw) {
                Some(UserRole::Admin) | None => {
                    return Err(DomainError::Validation("Invalid role".into()))
                }
                Some(role) => role,
            },
        };

        if self.repos.users().find_by_email(&email).await?.is_some() {
            return Err(DomainError::Validation("Email already registered".into()));
        }

        let hash = hash_password(&password)
            .map_err(|e| DomainError::Internal(format!("Failed to hash password: {}", e)))?;

        let mut user = User::new(email, hash, name, role);
        user.phone = input.phone;
        user.vehicle = input.vehicle;
        user.company = input.company;

        // A concurrent sign-up with the same email trips the unique index.
        self.repos
            .users()
            .create(user.clone())
            .await
            .map_err(|e| match e {
                DomainError::Conflict(msg) => DomainError::Validation(msg),
                other => other,
            })?;

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, role = %user.role, "New user registered");
        Ok(AuthResult { token, user })
    }

    // ── Profile ─────────────────────────────────────────────────

    pub async fn me(&self, user_id: &str) -> DomainResult<User> {
        self.load(user_id).await
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> DomainResult<User> {
        if update.is_empty() {
            return Err(DomainError::Validation("No valid fields to update".into()));
        }
        let mut user = self.load(user_id).await?;
        user.apply(update);
        self.repos.users().update(&user).await?;
        info!(user_id, "Profile updated");
        Ok(user)
    }

    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        if current_password.is_empty() || new_password.is_empty() {
            return Err(DomainError::Validation(
                "Current password and new password are required".into(),
            ));
        }

        let user = self.load(user_id).await?;
        if !verify_password(current_password, &user.password_hash) {
            return Err(DomainError::Unauthorized(
                "Current password is incorrect".into(),
            ));
        }

        let new_hash = hash_password(new_password)
            .map_err(|e| DomainError::Internal(format!("Failed to hash password: {}", e)))?;
        self.repos.users().update_password(user_id, &new_hash).await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    // ── Directory ───────────────────────────────────────────────

    /// Case-insensitive search on name and email. An unknown role is ignored.
    pub async fn search(&self, query: &str, role: Option<&str>) -> DomainResult<Vec<User>> {
        let role = role.and_then(UserRole::parse);
        self.repos.users().search(query.trim(), role).await
    }

    pub async fn get_user(&self, actor: &Actor, id: &str) -> DomainResult<User> {
        ensure_self_or_admin(actor, id)?;
        self.load(id).await
    }

    pub async fn update_user(
        &self,
        actor: &Actor,
        id: &str,
        update: ProfileUpdate,
    ) -> DomainResult<User> {
        ensure_self_or_admin(actor, id)?;
        self.update_profile(id, update).await
    }

    pub async fn list_users(&self, role: Option<&str>) -> DomainResult<Vec<User>> {
        self.repos.users().list(role.and_then(UserRole::parse)).await
    }

    /// `status == "active"` activates the account; anything else deactivates it.
    pub async fn set_status(&self, id: &str, status: &str) -> DomainResult<()> {
        let active = status == "active";
        if !self.repos.users().set_active(id, active).await? {
            return Err(DomainError::not_found("User", id));
        }
        info!(user_id = id, active, "User status changed");
        Ok(())
    }
}
