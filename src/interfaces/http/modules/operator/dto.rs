use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::dashboards::{
    HourCount, MaintenanceAlert, OperatorStats, RecentReview, StationFeedback, StationRevenue,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceAlertDto {
    /// `{stationId}-{portId}`
    pub id: String,
    pub station_id: String,
    pub station_name: String,
    pub port_id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub priority: String,
    pub timestamp: DateTime<Utc>,
}

impl From<MaintenanceAlert> for MaintenanceAlertDto {
    fn from(a: MaintenanceAlert) -> Self {
        Self {
            id: a.id,
            station_id: a.station_id,
            station_name: a.station_name,
            port_id: a.port_id,
            kind: a.kind,
            message: a.message,
            priority: a.priority,
            timestamp: a.timestamp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StationRevenueDto {
    pub station: String,
    pub revenue: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HourCountDto {
    /// e.g. `9AM`
    pub hour: String,
    pub sessions: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperatorStatsDto {
    pub total_stations: u64,
    pub total_ports: u64,
    pub active_sessions: u64,
    pub today_revenue: f64,
    pub today_energy: f64,
    pub monthly_revenue: f64,
    pub monthly_energy: f64,
    /// Percent of usable ports that are busy
    pub port_utilization: i64,
    /// Minutes
    pub average_session_duration: i64,
    pub maintenance_alerts: Vec<MaintenanceAlertDto>,
    pub revenue_by_station: Vec<StationRevenueDto>,
    pub sessions_by_hour: Vec<HourCountDto>,
}

impl From<OperatorStats> for OperatorStatsDto {
    fn from(s: OperatorStats) -> Self {
        Self {
            total_stations: s.total_stations,
            total_ports: s.total_ports,
            active_sessions: s.active_sessions,
            today_revenue: s.today_revenue,
            today_energy: s.today_energy,
            monthly_revenue: s.monthly_revenue,
            monthly_energy: s.monthly_energy,
            port_utilization: s.port_utilization,
            average_session_duration: s.average_session_duration,
            maintenance_alerts: s.maintenance_alerts.into_iter().map(Into::into).collect(),
            revenue_by_station: s
                .revenue_by_station
                .into_iter()
                .map(|StationRevenue { station, revenue }| StationRevenueDto { station, revenue })
                .collect(),
            sessions_by_hour: s
                .sessions_by_hour
                .into_iter()
                .map(|HourCount { hour, sessions }| HourCountDto { hour, sessions })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecentReviewDto {
    pub rating: i32,
    pub comment: String,
    /// YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationFeedbackDto {
    pub station_id: String,
    pub station_name: String,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub recent_reviews: Vec<RecentReviewDto>,
    /// Stars (5 down to 1) to review count
    pub rating_breakdown: BTreeMap<i32, u64>,
}

impl From<StationFeedback> for StationFeedbackDto {
    fn from(f: StationFeedback) -> Self {
        Self {
            station_id: f.station_id,
            station_name: f.station_name,
            average_rating: f.average_rating,
            total_reviews: f.total_reviews,
            recent_reviews: f
                .recent_reviews
                .into_iter()
                .map(|RecentReview { rating, comment, date }| RecentReviewDto {
                    rating,
                    comment,
                    date,
                })
                .collect(),
            rating_breakdown: f.rating_breakdown,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    #[schema(value_type = Option<Object>)]
    pub pricing: Option<Value>,
    pub peak_hours: Option<String>,
}
