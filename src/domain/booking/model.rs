//! Booking domain entity

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::pricing::estimate_booking_cost;

pub const SLOT_TAKEN: &str = "Time slot is already booked";

/// Bookable one-hour slots, in display order.
pub const TIME_SLOTS: [&str; 13] = [
    "08:00 - 09:00",
    "09:00 - 10:00",
    "10:00 - 11:00",
    "11:00 - 12:00",
    "12:00 - 13:00",
    "13:00 - 14:00",
    "14:00 - 15:00",
    "15:00 - 16:00",
    "16:00 - 17:00",
    "17:00 - 18:00",
    "18:00 - 19:00",
    "19:00 - 20:00",
    "20:00 - 21:00",
];

pub fn is_valid_time_slot(slot: &str) -> bool {
    TIME_SLOTS.contains(&slot)
}

/// Dates travel as zero-padded `YYYY-MM-DD`. Slot checks and the unique
/// index compare the stored text, so `2030-1-5` is rejected.
pub fn is_valid_booking_date(date: &str) -> bool {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|parsed| parsed.format("%Y-%m-%d").to_string() == date)
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Statuses that occupy their slot. Must match the partial unique index
    /// on `bookings`.
    pub const HOLDING: [BookingStatus; 2] = [BookingStatus::Confirmed, BookingStatus::Pending];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "completed" => Self::Completed,
            _ => Self::Cancelled,
        }
    }

    pub fn holds_slot(&self) -> bool {
        Self::HOLDING.contains(self)
    }
}

#[derive(Debug, Clone)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub station_id: String,
    pub port_id: i32,
    pub date: String,
    pub time_slot: String,
    pub charging_type: String,
    pub estimated_cost: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// A confirmed booking with its cost estimate filled in.
    pub fn confirmed(
        user_id: impl Into<String>,
        station_id: impl Into<String>,
        port_id: i32,
        date: impl Into<String>,
        time_slot: impl Into<String>,
        charging_type: impl Into<String>,
    ) -> Self {
        let charging_type = charging_type.into();
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            station_id: station_id.into(),
            port_id,
            date: date.into(),
            time_slot: time_slot.into(),
            estimated_cost: estimate_booking_cost(&charging_type),
            charging_type,
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirteen_hourly_slots_from_eight_to_nine_pm() {
        assert_eq!(TIME_SLOTS.len(), 13);
        assert_eq!(TIME_SLOTS[0], "08:00 - 09:00");
        assert_eq!(TIME_SLOTS[12], "20:00 - 21:00");
        assert!(is_valid_time_slot("12:00 - 13:00"));
        assert!(!is_valid_time_slot("07:00 - 08:00"));
    }

    #[test]
    fn booking_date_format() {
        assert!(is_valid_booking_date("2025-03-01"));
        assert!(!is_valid_booking_date("01/03/2025"));
        assert!(!is_valid_booking_date("2025-02-30"));
        assert!(!is_valid_booking_date("2025-3-1"));
        assert!(!is_valid_booking_date(" 2025-03-01"));
    }

    #[test]
    fn confirmed_booking_gets_estimate() {
        let b = Booking::confirmed("u", "s", 1, "2025-03-01", TIME_SLOTS[0], "Fast DC");
        assert_eq!(b.status, BookingStatus::Confirmed);
        assert_eq!(b.estimated_cost, 10.5);
        assert!(b.status.holds_slot());
    }

    #[test]
    fn cancelled_and_completed_release_the_slot() {
        assert!(!BookingStatus::Cancelled.holds_slot());
        assert!(!BookingStatus::Completed.holds_slot());
        assert!(BookingStatus::Pending.holds_slot());
    }
}
