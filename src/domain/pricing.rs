//! Flat-rate charging tariff
//!
//! Sessions are billed from elapsed time: a nominal 0.8 kWh per charging
//! minute at 0.35 per kWh for fast charging and 0.25 otherwise.

use chrono::{DateTime, Utc};

use crate::shared::{round_energy, round_money};

pub const FAST_RATE_PER_KWH: f64 = 0.35;
pub const STANDARD_RATE_PER_KWH: f64 = 0.25;
/// Nominal energy delivered per minute of charging.
pub const KWH_PER_MINUTE: f64 = 0.8;
/// Nominal energy assumed for a one-hour booking slot.
pub const BOOKING_SLOT_KWH: f64 = 30.0;
/// kg of CO2 avoided per kWh delivered.
pub const CO2_KG_PER_KWH: f64 = 0.4;

pub const DEFAULT_CHARGING_TYPE: &str = "Normal AC";

pub fn energy_rate(charging_type: &str) -> f64 {
    if charging_type.to_lowercase().contains("fast") {
        FAST_RATE_PER_KWH
    } else {
        STANDARD_RATE_PER_KWH
    }
}

/// Up-front estimate shown when a slot is booked.
pub fn estimate_booking_cost(charging_type: &str) -> f64 {
    round_money(energy_rate(charging_type) * BOOKING_SLOT_KWH)
}

/// Final figures for a finished session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionCharge {
    pub duration_minutes: i32,
    pub energy_kwh: f64,
    pub cost: f64,
}

impl SessionCharge {
    pub fn compute(start: DateTime<Utc>, end: DateTime<Utc>, charging_type: &str) -> Self {
        let elapsed_secs = (end - start).num_seconds().max(0);
        let duration_minutes = (elapsed_secs / 60) as i32;
        let energy_kwh = round_energy(duration_minutes as f64 * KWH_PER_MINUTE);
        let cost = round_money(energy_kwh * energy_rate(charging_type));
        Self {
            duration_minutes,
            energy_kwh,
            cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fast_types_get_the_fast_rate() {
        assert_eq!(energy_rate("Fast DC"), FAST_RATE_PER_KWH);
        assert_eq!(energy_rate("ultra FAST"), FAST_RATE_PER_KWH);
        assert_eq!(energy_rate("Normal AC"), STANDARD_RATE_PER_KWH);
    }

    #[test]
    fn booking_estimate() {
        assert_eq!(estimate_booking_cost("Fast DC"), 10.5);
        assert_eq!(estimate_booking_cost("Normal AC"), 7.5);
    }

    #[test]
    fn session_charge_truncates_to_whole_minutes() {
        let start = Utc::now();
        let end = start + Duration::seconds(30 * 60 + 59);
        let charge = SessionCharge::compute(start, end, "Fast DC");
        assert_eq!(charge.duration_minutes, 30);
        assert_eq!(charge.energy_kwh, 24.0);
        assert_eq!(charge.cost, 8.4);
    }

    #[test]
    fn session_shorter_than_a_minute_is_free() {
        let start = Utc::now();
        let charge = SessionCharge::compute(start, start + Duration::seconds(59), "Normal AC");
        assert_eq!(charge.duration_minutes, 0);
        assert_eq!(charge.energy_kwh, 0.0);
        assert_eq!(charge.cost, 0.0);
    }

    #[test]
    fn clock_skew_never_produces_negative_values() {
        let start = Utc::now();
        let charge = SessionCharge::compute(start, start - Duration::minutes(5), "Normal AC");
        assert_eq!(charge.duration_minutes, 0);
    }
}
