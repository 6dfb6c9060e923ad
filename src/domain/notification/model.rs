use chrono::{DateTime, Utc};

/// An in-app message for one user.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    /// Machine-readable kind, e.g. `booking_confirmed`
    pub kind: String,
    pub title: String,
    pub message: String,
    /// Client route the notification links to
    pub action_url: Option<String>,
    pub read: bool,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: impl Into<String>,
        kind: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        action_url: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            kind: kind.into(),
            title: title.into(),
            message: message.into(),
            action_url,
            read: false,
            timestamp: Utc::now(),
        }
    }

    pub fn booking_confirmed(user_id: &str, station_name: &str, date: &str, slot: &str) -> Self {
        Self::new(
            user_id,
            "booking_confirmed",
            "Booking Confirmed",
            format!(
                "Your booking at {} for {}, {} has been confirmed.",
                station_name, date, slot
            ),
            Some("/user/bookings".to_string()),
        )
    }

    pub fn charging_complete(user_id: &str, total_cost: f64) -> Self {
        Self::new(
            user_id,
            "charging_complete",
            "Charging Complete",
            format!("Your vehicle has finished charging. Total: ${}", total_cost),
            Some("/user/history".to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_confirmation_text() {
        let n = Notification::booking_confirmed("u1", "Hub One", "2025-03-01", "08:00 - 09:00");
        assert_eq!(n.kind, "booking_confirmed");
        assert_eq!(
            n.message,
            "Your booking at Hub One for 2025-03-01, 08:00 - 09:00 has been confirmed."
        );
        assert_eq!(n.action_url.as_deref(), Some("/user/bookings"));
        assert!(!n.read);
    }

    #[test]
    fn charging_complete_text() {
        let n = Notification::charging_complete("u1", 8.4);
        assert_eq!(n.message, "Your vehicle has finished charging. Total: $8.4");
        assert_eq!(n.action_url.as_deref(), Some("/user/history"));
    }
}
