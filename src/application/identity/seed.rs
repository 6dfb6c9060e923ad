//! Demo accounts created on first start.

use serde_json::json;
use tracing::{info, warn};

use crate::domain::{DomainError, DomainResult, RepositoryProvider, User, UserRole};
use crate::infrastructure::crypto::hash_password;

/// `(email, password, name, role)`
pub const DEFAULT_ACCOUNTS: [(&str, &str, &str, UserRole); 3] = [
    ("admin@evpulse.com", "admin123", "Admin User", UserRole::Admin),
    ("operator@evpulse.com", "operator123", "Station Operator", UserRole::Operator),
    ("user@evpulse.com", "user123", "Test User", UserRole::User),
];

/// Create the default admin, operator and driver when no user exists yet.
/// Returns how many accounts were created.
pub async fn seed_default_users(repos: &dyn RepositoryProvider) -> DomainResult<usize> {
    if repos.users().count().await? > 0 {
        return Ok(0);
    }

    let mut created = 0;
    for (email, password, name, role) in DEFAULT_ACCOUNTS {
        let hash = hash_password(password)
            .map_err(|e| DomainError::Internal(format!("Failed to hash password: {}", e)))?;
        let mut user = User::new(email, hash, name, role);
        match role {
            UserRole::Operator => user.company = Some(json!("EV Solutions Inc")),
            UserRole::User => {
                user.vehicle = Some(json!({"make": "Tesla", "model": "Model 3", "batteryCapacity": 75}))
            }
            UserRole::Admin => {}
        }

        match repos.users().create(user).await {
            Ok(()) => created += 1,
            // Another instance seeded first
            Err(DomainError::Conflict(_)) => warn!(email, "Default account already exists"),
            Err(e) => return Err(e),
        }
    }

    info!(created, "Default accounts created");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::verify_password;
    use crate::infrastructure::database::testing::{create_user, test_repos};

    #[tokio::test]
    async fn seeds_three_accounts_once() {
        let repos = test_repos().await;
        assert_eq!(seed_default_users(repos.as_ref()).await.unwrap(), 3);
        assert_eq!(seed_default_users(repos.as_ref()).await.unwrap(), 0);

        let admin = repos.users().find_by_email("admin@evpulse.com").await.unwrap().unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert!(verify_password("admin123", &admin.password_hash));

        let driver = repos.users().find_by_email("user@evpulse.com").await.unwrap().unwrap();
        assert_eq!(driver.vehicle.unwrap()["batteryCapacity"], 75);
    }

    #[tokio::test]
    async fn existing_users_disable_seeding() {
        let repos = test_repos().await;
        create_user(repos.as_ref(), "someone@example.com", UserRole::User).await;
        assert_eq!(seed_default_users(repos.as_ref()).await.unwrap(), 0);
        assert!(repos.users().find_by_email("admin@evpulse.com").await.unwrap().is_none());
    }
}
