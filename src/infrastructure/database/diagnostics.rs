//! Read-only database checks used by the health endpoints.

use std::time::{Duration, Instant};

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, Statement};

/// Tables the service owns, in creation order.
pub const APP_TABLES: [&str; 8] = [
    "users",
    "stations",
    "station_ports",
    "bookings",
    "charging_sessions",
    "transactions",
    "notifications",
    "reviews",
];

/// Round-trip a `SELECT 1` and report how long it took.
pub async fn ping(db: &DatabaseConnection) -> Result<Duration, DbErr> {
    let start = Instant::now();
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "SELECT 1".to_string(),
    ))
    .await?;
    Ok(start.elapsed())
}

/// Names of the user tables present in the connected database.
pub async fn list_tables(db: &DatabaseConnection) -> Result<Vec<String>, DbErr> {
    let backend = db.get_database_backend();
    let sql = match backend {
        DatabaseBackend::Sqlite => {
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
        }
        DatabaseBackend::Postgres => {
            "SELECT tablename AS name FROM pg_tables WHERE schemaname = 'public' ORDER BY tablename"
        }
        DatabaseBackend::MySql => {
            "SELECT table_name AS name FROM information_schema.tables WHERE table_schema = DATABASE() ORDER BY table_name"
        }
    };
    let rows = db
        .query_all(Statement::from_string(backend, sql.to_string()))
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String>("", "name"))
        .collect()
}

/// `COUNT(*)` of one of the service's own tables.
pub async fn count_rows(db: &DatabaseConnection, table: &str) -> Result<u64, DbErr> {
    if !APP_TABLES.contains(&table) {
        return Err(DbErr::Custom(format!("Unknown table: {}", table)));
    }
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS count FROM {}", table),
        ))
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(table.to_string()))?;
    Ok(row.try_get::<i64>("", "count")?.max(0) as u64)
}
