//! Health check handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use tracing::warn;

use super::dto::*;
use crate::infrastructure::database::diagnostics::{count_rows, list_tables, ping, APP_TABLES};
use crate::infrastructure::database::{mask_url, DatabaseConfig};

#[derive(Clone)]
pub struct HealthState {
    pub db: DatabaseConnection,
    pub db_config: DatabaseConfig,
    pub started_at: Arc<Instant>,
    /// Problems found when the configuration was validated at startup
    pub config_issues: Arc<Vec<String>>,
}

impl HealthState {
    fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    async fn database_health(&self) -> DatabaseHealth {
        match ping(&self.db).await {
            Ok(latency) => DatabaseHealth {
                status: "connected".into(),
                healthy: true,
                latency_ms: Some(latency.as_millis() as u64),
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "Database ping failed");
                DatabaseHealth {
                    status: "disconnected".into(),
                    healthy: false,
                    latency_ms: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

async fn table_counts(db: &DatabaseConnection) -> Option<TableCounts> {
    Some(TableCounts {
        users: count_rows(db, "users").await.ok()?,
        stations: count_rows(db, "stations").await.ok()?,
        sessions: count_rows(db, "charging_sessions").await.ok()?,
        bookings: count_rows(db, "bookings").await.ok()?,
        transactions: count_rows(db, "transactions").await.ok()?,
    })
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.database_health().await;
    let healthy = database.healthy;
    let collections = if healthy {
        table_counts(&state.db).await
    } else {
        None
    };

    let (status, message, http_status) = if healthy {
        ("healthy", "EVPulse API is running", StatusCode::OK)
    } else {
        (
            "degraded",
            "Database connection failed",
            StatusCode::SERVICE_UNAVAILABLE,
        )
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.into(),
            message: message.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
            collections,
            stats: UptimeStats {
                uptime_seconds: state.uptime_seconds(),
            },
            timestamp: Utc::now(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/test",
    tag = "Health",
    responses((status = 200, description = "API is reachable", body = TestResponse))
)]
pub async fn test_endpoint() -> Json<TestResponse> {
    Json(TestResponse {
        success: true,
        message: "EVPulse API test endpoint".into(),
        timestamp: Utc::now(),
    })
}

#[utoipa::path(
    get,
    path = "/api/db/status",
    tag = "Health",
    responses((status = 200, description = "Connection and pool status", body = DbStatusResponse))
)]
pub async fn db_status(State(state): State<HealthState>) -> Json<DbStatusResponse> {
    let health = state.database_health().await;
    Json(DbStatusResponse {
        connected: health.healthy,
        backend: state.db_config.backend().to_string(),
        stats: DbStats {
            uptime_seconds: state.uptime_seconds(),
            pool: PoolInfo {
                min_connections: state.db_config.min_connections,
                max_connections: state.db_config.max_connections,
            },
        },
        health,
        timestamp: Utc::now(),
    })
}

#[utoipa::path(
    get,
    path = "/api/db/diagnostics",
    tag = "Health",
    responses((status = 200, description = "Connectivity, schema and configuration checks", body = DiagnosticsResponse))
)]
pub async fn db_diagnostics(State(state): State<HealthState>) -> Json<DiagnosticsResponse> {
    let mut checks = Vec::new();

    checks.push(match ping(&state.db).await {
        Ok(latency) => DiagnosticCheck {
            name: "ping".into(),
            ok: true,
            detail: format!("{} ms to {}", latency.as_millis(), mask_url(&state.db_config.url)),
        },
        Err(e) => DiagnosticCheck {
            name: "ping".into(),
            ok: false,
            detail: e.to_string(),
        },
    });

    match list_tables(&state.db).await {
        Ok(tables) => {
            let missing: Vec<&str> = APP_TABLES
                .iter()
                .copied()
                .filter(|t| !tables.iter().any(|name| name == t))
                .collect();
            checks.push(DiagnosticCheck {
                name: "tables".into(),
                ok: missing.is_empty(),
                detail: if missing.is_empty() {
                    tables.join(", ")
                } else {
                    format!("missing: {}", missing.join(", "))
                },
            });

            for table in APP_TABLES.iter().filter(|t| !missing.contains(t)) {
                checks.push(match count_rows(&state.db, table).await {
                    Ok(n) => DiagnosticCheck {
                        name: format!("count:{}", table),
                        ok: true,
                        detail: n.to_string(),
                    },
                    Err(e) => DiagnosticCheck {
                        name: format!("count:{}", table),
                        ok: false,
                        detail: e.to_string(),
                    },
                });
            }
        }
        Err(e) => checks.push(DiagnosticCheck {
            name: "tables".into(),
            ok: false,
            detail: e.to_string(),
        }),
    }

    checks.push(DiagnosticCheck {
        name: "config".into(),
        ok: state.config_issues.is_empty(),
        detail: if state.config_issues.is_empty() {
            "valid".into()
        } else {
            state.config_issues.join("; ")
        },
    });

    Json(DiagnosticsResponse {
        ok: checks.iter().all(|c| c.ok),
        checks,
        timestamp: Utc::now(),
    })
}
