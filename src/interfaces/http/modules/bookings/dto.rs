use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::bookings::{BookingView, NewBooking};
use crate::domain::Booking;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: String,
    pub user_id: String,
    pub station_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
    pub port_id: i32,
    /// YYYY-MM-DD
    pub date: String,
    #[schema(example = "10:00 - 11:00")]
    pub time_slot: String,
    pub charging_type: String,
    pub estimated_cost: f64,
    /// pending / confirmed / cancelled / completed
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            station_id: b.station_id,
            station_name: None,
            port_id: b.port_id,
            date: b.date,
            time_slot: b.time_slot,
            charging_type: b.charging_type,
            estimated_cost: b.estimated_cost,
            status: b.status.as_str().to_string(),
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

impl From<BookingView> for BookingDto {
    fn from(v: BookingView) -> Self {
        Self {
            station_name: Some(v.station_name),
            ..v.booking.into()
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub station_id: Option<String>,
    pub port_id: Option<i32>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
    /// Defaults to "Normal AC"
    pub charging_type: Option<String>,
}

impl From<CreateBookingRequest> for NewBooking {
    fn from(r: CreateBookingRequest) -> Self {
        Self {
            station_id: r.station_id,
            port_id: r.port_id,
            date: r.date,
            time_slot: r.time_slot,
            charging_type: r.charging_type,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailableSlotsParams {
    pub station_id: Option<String>,
    /// YYYY-MM-DD
    pub date: Option<String>,
    /// Only consider bookings on this port
    pub port_id: Option<i32>,
}
