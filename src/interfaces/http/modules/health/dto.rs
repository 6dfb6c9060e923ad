use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseHealth {
    /// `connected` or `disconnected`
    pub status: String,
    pub healthy: bool,
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableCounts {
    pub users: u64,
    pub stations: u64,
    pub sessions: u64,
    pub bookings: u64,
    pub transactions: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UptimeStats {
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,
    pub message: String,
    pub version: String,
    pub database: DatabaseHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<TableCounts>,
    pub stats: UptimeStats,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TestResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PoolInfo {
    pub min_connections: u32,
    pub max_connections: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DbStats {
    pub uptime_seconds: u64,
    pub pool: PoolInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DbStatusResponse {
    pub connected: bool,
    pub backend: String,
    pub stats: DbStats,
    pub health: DatabaseHealth,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosticCheck {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosticsResponse {
    pub checks: Vec<DiagnosticCheck>,
    pub ok: bool,
    pub timestamp: DateTime<Utc>,
}
