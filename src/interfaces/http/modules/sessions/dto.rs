use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::charging::{SessionStats, SessionView, StartSession};
use crate::domain::session::SessionOptions;
use crate::domain::ChargingSession;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub id: String,
    pub user_id: String,
    pub station_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
    pub port_id: i32,
    pub charging_type: String,
    pub payment_method: String,
    /// active / completed / cancelled
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Minutes
    pub duration: i32,
    /// kWh
    pub energy_delivered: f64,
    pub cost: f64,
    pub total_cost: f64,
    pub progress: i32,
    pub battery_start: i32,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChargingSession> for SessionDto {
    fn from(s: ChargingSession) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            station_id: s.station_id,
            station_name: None,
            port_id: s.port_id,
            charging_type: s.charging_type,
            payment_method: s.payment_method,
            status: s.status.as_str().to_string(),
            start_time: s.start_time,
            end_time: s.end_time,
            duration: s.duration,
            energy_delivered: s.energy_delivered,
            cost: s.cost,
            total_cost: s.total_cost,
            progress: s.progress,
            battery_start: s.battery_start,
            estimated_completion: s.estimated_completion,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl From<SessionView> for SessionDto {
    fn from(v: SessionView) -> Self {
        Self {
            station_name: Some(v.station_name),
            ..v.session.into()
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub station_id: Option<String>,
    pub port_id: Option<i32>,
    /// Defaults to "Normal AC"
    pub charging_type: Option<String>,
    /// Defaults to "Wallet"
    pub payment_method: Option<String>,
    /// Battery percentage at plug-in, defaults to 20
    #[validate(range(min = 0, max = 100))]
    pub battery_start: Option<i32>,
}

impl From<StartSessionRequest> for StartSession {
    fn from(r: StartSessionRequest) -> Self {
        Self {
            station_id: r.station_id,
            port_id: r.port_id,
            options: SessionOptions {
                charging_type: r.charging_type,
                payment_method: r.payment_method,
                battery_start: r.battery_start,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatsDto {
    /// kWh
    pub total_energy: f64,
    pub total_cost: f64,
    pub total_sessions: u64,
    /// Minutes
    pub avg_session_duration: i64,
    /// kg
    pub co2_saved: f64,
}

impl From<SessionStats> for SessionStatsDto {
    fn from(s: SessionStats) -> Self {
        Self {
            total_energy: s.total_energy,
            total_cost: s.total_cost,
            total_sessions: s.total_sessions,
            avg_session_duration: s.avg_session_duration,
            co2_saved: s.co2_saved,
        }
    }
}
