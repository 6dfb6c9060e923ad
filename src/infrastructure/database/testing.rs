//! In-memory database fixtures shared by repository and service tests.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

use super::migrator::Migrator;
use super::repositories::SeaOrmRepositoryProvider;
use super::{init_database, DatabaseConfig};
use crate::domain::station::{Port, PortStatus, Station};
use crate::domain::user::{User, UserRole};
use crate::domain::RepositoryProvider;

/// Fresh migrated in-memory SQLite database.
pub async fn test_db() -> DatabaseConnection {
    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

pub async fn test_repos() -> Arc<dyn RepositoryProvider> {
    Arc::new(SeaOrmRepositoryProvider::new(test_db().await))
}

pub async fn create_user(repos: &dyn RepositoryProvider, email: &str, role: UserRole) -> User {
    let hash = crate::infrastructure::crypto::hash_password("password123").expect("hash");
    let user = User::new(email, hash, email.split('@').next().unwrap_or(email), role);
    repos.users().create(user.clone()).await.expect("create user");
    user
}

pub fn port(id: i32, port_type: &str, status: PortStatus) -> Port {
    Port {
        id,
        port_type: port_type.to_string(),
        power: 50.0,
        status,
        price: 8.0,
    }
}

/// Station in "Pune - Baner" with two available ports: 1 "Fast DC" and 2 "Normal AC".
pub async fn create_station(repos: &dyn RepositoryProvider, operator_id: &str) -> Station {
    let mut station = Station::new("Baner Hub", "Pune", "Baner", operator_id);
    station.ports = vec![
        port(1, "Fast DC", PortStatus::Available),
        port(2, "Normal AC", PortStatus::Available),
    ];
    repos.stations().create(&station).await.expect("create station");
    station
}
