//! Bearer-token authentication and role guards for Axum

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::{debug, warn};

use super::common::{ApiError, ApiResponse};
use crate::domain::{Actor, DomainError, RepositoryProvider, UserRole};
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    AccountDeactivated,
    InsufficientPermissions,
}

/// State the auth middleware needs: token settings and user lookups.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    pub repos: Arc<dyn RepositoryProvider>,
}

/// The caller, as established by a verified bearer token.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: UserRole::from_str(&claims.role),
        }
    }

    pub fn actor(&self) -> Actor {
        Actor::new(&self.user_id, self.role)
    }

    /// 403 `"Unauthorized"` unless the caller holds one of `roles`.
    pub fn require(&self, roles: &[UserRole]) -> Result<Actor, ApiError> {
        if roles.contains(&self.role) {
            Ok(self.actor())
        } else {
            Err(ApiError(DomainError::forbidden()))
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim)
}

/// JWT authentication middleware.
///
/// The token's subject is looked up so deactivated accounts are turned away
/// immediately; the role in the token is replaced by the stored one. When the
/// account no longer exists the claims are passed through and the handler
/// decides what a missing user means.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    let claims = match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) if claims.is_expired() => return auth_error_response(AuthError::ExpiredToken),
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            return auth_error_response(AuthError::InvalidToken);
        }
    };

    let mut user = AuthenticatedUser::from_claims(claims);
    match auth_state.repos.users().find_by_id(&user.user_id).await {
        Ok(Some(stored)) if !stored.is_active => {
            return auth_error_response(AuthError::AccountDeactivated);
        }
        Ok(Some(stored)) => {
            user.role = stored.role;
            user.email = stored.email;
        }
        Ok(None) => {}
        Err(e) => return ApiError(e).into_response(),
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}

async fn require_roles(
    roles: &[UserRole],
    user: Option<&AuthenticatedUser>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match user {
        Some(user) if roles.contains(&user.role) => next.run(request).await,
        Some(user) => {
            warn!(user_id = %user.user_id, role = %user.role, path = %request.uri().path(), "Role check failed");
            auth_error_response(AuthError::InsufficientPermissions)
        }
        None => auth_error_response(AuthError::MissingToken),
    }
}

/// Route guard: admins only. Layer it inside `auth_middleware`.
pub async fn require_admin(
    user: Option<Extension<AuthenticatedUser>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    require_roles(&[UserRole::Admin], user.as_deref(), request, next).await
}

/// Route guard: station operators and admins.
pub async fn require_operator(
    user: Option<Extension<AuthenticatedUser>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    require_roles(
        &[UserRole::Operator, UserRole::Admin],
        user.as_deref(),
        request,
        next,
    )
    .await
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::AccountDeactivated => (StatusCode::UNAUTHORIZED, "Account is deactivated"),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Unauthorized"),
    };

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}
