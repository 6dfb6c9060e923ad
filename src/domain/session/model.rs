//! Charging session domain entity

use chrono::{DateTime, Duration, Utc};

use crate::domain::pricing::{SessionCharge, DEFAULT_CHARGING_TYPE};

pub const ALREADY_CHARGING: &str = "You already have an active charging session";
pub const NOT_ACTIVE: &str = "Session is not active";

pub const DEFAULT_PAYMENT_METHOD: &str = "Wallet";
pub const DEFAULT_BATTERY_START: i32 = 20;
/// Completion estimate given to the driver when charging starts.
pub const ESTIMATED_CHARGE_MINUTES: i64 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "completed" => Self::Completed,
            _ => Self::Cancelled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChargingSession {
    pub id: String,
    pub user_id: String,
    pub station_id: String,
    pub port_id: i32,
    pub charging_type: String,
    pub payment_method: String,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Minutes
    pub duration: i32,
    /// kWh
    pub energy_delivered: f64,
    pub cost: f64,
    pub total_cost: f64,
    /// 0..=100
    pub progress: i32,
    pub battery_start: i32,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional start parameters; `None` picks the defaults.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub charging_type: Option<String>,
    pub payment_method: Option<String>,
    pub battery_start: Option<i32>,
}

impl ChargingSession {
    pub fn start(
        user_id: impl Into<String>,
        station_id: impl Into<String>,
        port_id: i32,
        options: SessionOptions,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            station_id: station_id.into(),
            port_id,
            charging_type: options
                .charging_type
                .unwrap_or_else(|| DEFAULT_CHARGING_TYPE.to_string()),
            payment_method: options
                .payment_method
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            status: SessionStatus::Active,
            start_time: now,
            end_time: None,
            duration: 0,
            energy_delivered: 0.0,
            cost: 0.0,
            total_cost: 0.0,
            progress: 0,
            battery_start: options.battery_start.unwrap_or(DEFAULT_BATTERY_START),
            estimated_completion: Some(now + Duration::minutes(ESTIMATED_CHARGE_MINUTES)),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Close the session at `end` and bill it. Returns the computed charge.
    pub fn complete(&mut self, end: DateTime<Utc>) -> SessionCharge {
        let charge = SessionCharge::compute(self.start_time, end, &self.charging_type);
        self.status = SessionStatus::Completed;
        self.end_time = Some(end);
        self.duration = charge.duration_minutes;
        self.energy_delivered = charge.energy_kwh;
        self.cost = charge.cost;
        self.total_cost = charge.cost;
        self.progress = 100;
        self.updated_at = end;
        charge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_applies_defaults() {
        let s = ChargingSession::start("u", "s", 2, SessionOptions::default());
        assert!(s.is_active());
        assert_eq!(s.charging_type, "Normal AC");
        assert_eq!(s.payment_method, "Wallet");
        assert_eq!(s.battery_start, 20);
        let eta = s.estimated_completion.unwrap() - s.start_time;
        assert_eq!(eta.num_minutes(), 45);
    }

    #[test]
    fn complete_bills_elapsed_time() {
        let mut s = ChargingSession::start(
            "u",
            "s",
            1,
            SessionOptions {
                charging_type: Some("Fast DC".into()),
                ..Default::default()
            },
        );
        s.start_time = Utc::now() - Duration::minutes(10);
        let charge = s.complete(s.start_time + Duration::minutes(10));

        assert_eq!(s.status, SessionStatus::Completed);
        assert_eq!(s.duration, 10);
        assert_eq!(s.energy_delivered, 8.0);
        assert_eq!(s.cost, 2.8);
        assert_eq!(s.total_cost, s.cost);
        assert_eq!(s.progress, 100);
        assert_eq!(charge.cost, 2.8);
        assert!(s.end_time.is_some());
    }
}
