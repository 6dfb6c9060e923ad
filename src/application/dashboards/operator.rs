//! Operator console: figures scoped to the stations the caller runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Timelike, Utc};
use tracing::info;

use crate::application::access::ensure_can_manage;
use crate::domain::{
    Actor, ChargingSession, DomainError, DomainResult, PortStatus, RecordScope,
    RepositoryProvider, ReviewFilter, SessionStatus, Station,
};
use crate::shared::{round_energy, round_money};

const WINDOW_DAYS: i64 = 30;
const RECENT_REVIEWS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceAlert {
    pub id: String,
    pub station_id: String,
    pub station_name: String,
    pub port_id: i32,
    pub kind: String,
    pub message: String,
    pub priority: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationRevenue {
    pub station: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourCount {
    pub hour: String,
    pub sessions: u64,
}

#[derive(Debug, Clone)]
pub struct OperatorStats {
    pub total_stations: u64,
    pub total_ports: u64,
    pub active_sessions: u64,
    pub today_revenue: f64,
    pub today_energy: f64,
    pub monthly_revenue: f64,
    pub monthly_energy: f64,
    pub port_utilization: i64,
    pub average_session_duration: i64,
    pub maintenance_alerts: Vec<MaintenanceAlert>,
    pub revenue_by_station: Vec<StationRevenue>,
    pub sessions_by_hour: Vec<HourCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentReview {
    pub rating: i32,
    pub comment: String,
    /// YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Clone)]
pub struct StationFeedback {
    pub station_id: String,
    pub station_name: String,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub recent_reviews: Vec<RecentReview>,
    /// stars -> count, always holding keys 1..=5
    pub rating_breakdown: BTreeMap<i32, u64>,
}

/// One alert per offline port.
pub fn alerts_for(stations: &[Station]) -> Vec<MaintenanceAlert> {
    stations
        .iter()
        .flat_map(|station| {
            station
                .ports
                .iter()
                .filter(|p| p.status == PortStatus::Offline)
                .map(move |port| MaintenanceAlert {
                    id: format!("{}-{}", station.id, port.id),
                    station_id: station.id.clone(),
                    station_name: station.name.clone(),
                    port_id: port.id,
                    kind: "offline".into(),
                    message: format!("Port {} is offline - requires attention", port.id),
                    priority: "high".into(),
                    timestamp: station.updated_at,
                })
        })
        .collect()
}

/// `round(busy / max(non-offline, 1) * 100)`
pub fn port_utilization(stations: &[Station]) -> i64 {
    let ports = stations.iter().flat_map(|s| s.ports.iter());
    let (busy, online) = ports.fold((0u64, 0u64), |(busy, online), p| match p.status {
        PortStatus::Busy => (busy + 1, online + 1),
        PortStatus::Available => (busy, online + 1),
        PortStatus::Offline => (busy, online),
    });
    (busy as f64 / online.max(1) as f64 * 100.0).round() as i64
}

/// Session counts per starting hour, labelled "9AM" / "12PM", earliest first.
pub fn sessions_by_hour(sessions: &[ChargingSession]) -> Vec<HourCount> {
    let mut hours: BTreeMap<u32, (String, u64)> = BTreeMap::new();
    for s in sessions {
        let entry = hours
            .entry(s.start_time.hour())
            .or_insert_with(|| (s.start_time.format("%-I%p").to_string(), 0));
        entry.1 += 1;
    }
    hours
        .into_values()
        .map(|(hour, sessions)| HourCount { hour, sessions })
        .collect()
}

fn totals(sessions: &[ChargingSession]) -> (f64, f64) {
    let revenue = sessions.iter().map(|s| s.cost).sum();
    let energy = sessions.iter().map(|s| s.energy_delivered).sum();
    (round_money(revenue), round_energy(energy))
}

fn midnight_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc())
        .unwrap_or(now)
}

/// Parses `"{stationId}-{portId}"`, splitting on the last dash since station
/// ids contain dashes themselves.
pub fn parse_alert_id(alert_id: &str) -> Option<(&str, i32)> {
    let (station_id, port) = alert_id.rsplit_once('-')?;
    if station_id.is_empty() {
        return None;
    }
    Some((station_id, port.parse().ok()?))
}

pub struct OperatorService {
    repos: Arc<dyn RepositoryProvider>,
}

impl OperatorService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    async fn stations(&self, actor: &Actor) -> DomainResult<Vec<Station>> {
        self.repos.stations().find_by_operator(&actor.user_id).await
    }

    pub async fn stats(&self, actor: &Actor) -> DomainResult<OperatorStats> {
        let repos = self.repos.as_ref();
        let stations = self.stations(actor).await?;
        let ids: Vec<String> = stations.iter().map(|s| s.id.clone()).collect();
        let names: HashMap<&str, &str> = stations
            .iter()
            .map(|s| (s.id.as_str(), s.name.as_str()))
            .collect();

        let now = Utc::now();
        let today = repos.sessions().list_started_since(&ids, midnight_utc(now)).await?;
        let month = repos
            .sessions()
            .list_started_since(&ids, now - Duration::days(WINDOW_DAYS))
            .await?;
        let (today_revenue, today_energy) = totals(&today);
        let (monthly_revenue, monthly_energy) = totals(&month);

        let mut by_station: BTreeMap<&str, f64> = BTreeMap::new();
        for s in &month {
            if let Some(name) = names.get(s.station_id.as_str()) {
                *by_station.entry(name).or_default() += s.cost;
            }
        }

        let completed: Vec<i32> = repos
            .sessions()
            .list(&RecordScope::Stations(ids.clone()))
            .await?
            .into_iter()
            .filter(|s| s.status == SessionStatus::Completed)
            .map(|s| s.duration)
            .collect();
        let average_session_duration = if completed.is_empty() {
            0
        } else {
            (completed.iter().map(|d| *d as f64).sum::<f64>() / completed.len() as f64).round()
                as i64
        };

        Ok(OperatorStats {
            total_stations: stations.len() as u64,
            total_ports: stations.iter().map(|s| s.ports.len() as u64).sum(),
            active_sessions: repos.sessions().count_active_at(&ids).await?,
            today_revenue,
            today_energy,
            monthly_revenue,
            monthly_energy,
            port_utilization: port_utilization(&stations),
            average_session_duration,
            maintenance_alerts: alerts_for(&stations),
            revenue_by_station: by_station
                .into_iter()
                .map(|(station, revenue)| StationRevenue {
                    station: station.to_string(),
                    revenue: round_money(revenue),
                })
                .collect(),
            sessions_by_hour: sessions_by_hour(&today),
        })
    }

    pub async fn maintenance_alerts(&self, actor: &Actor) -> DomainResult<Vec<MaintenanceAlert>> {
        Ok(alerts_for(&self.stations(actor).await?))
    }

    pub async fn feedback(&self, actor: &Actor) -> DomainResult<Vec<StationFeedback>> {
        let mut feedback = Vec::new();
        for station in self.stations(actor).await? {
            let reviews = self
                .repos
                .reviews()
                .list(
                    &ReviewFilter {
                        station_id: Some(station.id.clone()),
                        ..Default::default()
                    },
                    None,
                )
                .await?;

            let mut rating_breakdown: BTreeMap<i32, u64> = (1..=5).map(|r| (r, 0)).collect();
            for r in &reviews {
                if let Some(count) = rating_breakdown.get_mut(&r.rating) {
                    *count += 1;
                }
            }

            feedback.push(StationFeedback {
                recent_reviews: reviews
                    .iter()
                    .take(RECENT_REVIEWS)
                    .map(|r| RecentReview {
                        rating: r.rating,
                        comment: r.comment.clone(),
                        date: r.timestamp.format("%Y-%m-%d").to_string(),
                    })
                    .collect(),
                rating_breakdown,
                station_id: station.id,
                station_name: station.name,
                average_rating: station.rating,
                total_reviews: station.total_reviews,
            });
        }
        Ok(feedback)
    }

    /// Brings an offline port back to available.
    pub async fn resolve_alert(&self, actor: &Actor, alert_id: &str) -> DomainResult<()> {
        let (station_id, port_id) = parse_alert_id(alert_id)
            .ok_or_else(|| DomainError::Validation("Invalid alert ID".into()))?;
        let alert_not_found = || DomainError::not_found("Alert", alert_id);

        let station = self
            .repos
            .stations()
            .find_by_id(station_id)
            .await?
            .ok_or_else(alert_not_found)?;
        ensure_can_manage(actor, &station)?;
        if !station
            .port(port_id)
            .is_some_and(|p| p.status == PortStatus::Offline)
        {
            return Err(alert_not_found());
        }

        if !self
            .repos
            .stations()
            .set_port_status(station_id, port_id, PortStatus::Available)
            .await?
        {
            return Err(alert_not_found());
        }
        info!(station_id, port_id, "Maintenance alert resolved");
        Ok(())
    }
}
