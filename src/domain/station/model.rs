//! Station domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::round_to;

/// Mean Earth radius used for distance calculations, in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Status of a station as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationStatus {
    Available,
    Busy,
    Offline,
}

impl StationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Offline => "offline",
        }
    }

    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::Offline)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "busy" => Some(Self::Busy),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }
}

/// Status of a single charging port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    Available,
    Busy,
    Offline,
}

impl PortStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Offline => "offline",
        }
    }

    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::Offline)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "busy" => Some(Self::Busy),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// `(0, 0)` is what clients send when they have no location.
    pub fn is_known(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && !(self.lat == 0.0 && self.lng == 0.0)
    }
}

/// A physical connector at a station. `id` is unique within its station.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub id: i32,
    /// Free text such as "Fast DC", "CCS2" or "Normal AC"
    pub port_type: String,
    /// Rated power in kW
    pub power: f64,
    pub status: PortStatus,
    /// Price per kWh
    pub price: f64,
}

#[derive(Debug, Clone)]
pub struct Station {
    pub id: String,
    pub name: String,
    /// Display address derived from city and landmark
    pub address: String,
    pub nearby_landmark: String,
    pub city: String,
    pub coordinates: Option<Coordinates>,
    pub operator_id: String,
    pub status: StationStatus,
    pub rating: f64,
    pub total_reviews: i32,
    pub amenities: Vec<String>,
    pub operating_hours: String,
    pub pricing: Value,
    pub peak_hours: Option<String>,
    pub image: Option<String>,
    pub ports: Vec<Port>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Station {
    pub fn new(
        name: impl Into<String>,
        city: impl Into<String>,
        nearby_landmark: impl Into<String>,
        operator_id: impl Into<String>,
    ) -> Self {
        let city = city.into();
        let nearby_landmark = nearby_landmark.into();
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            address: format_display_address(&city, &nearby_landmark),
            nearby_landmark,
            city,
            coordinates: None,
            operator_id: operator_id.into(),
            status: StationStatus::Available,
            rating: 0.0,
            total_reviews: 0,
            amenities: Vec::new(),
            operating_hours: "24/7".to_string(),
            pricing: Value::Object(Default::default()),
            peak_hours: None,
            image: None,
            ports: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn port(&self, port_id: i32) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == port_id)
    }

    pub fn is_operated_by(&self, user_id: &str) -> bool {
        self.operator_id == user_id
    }

    /// Distance in km from `(lat, lng)`, or `None` when the station has no
    /// usable coordinates.
    pub fn distance_from(&self, lat: f64, lng: f64) -> Option<f64> {
        self.coordinates
            .filter(Coordinates::is_known)
            .map(|c| haversine_km(lat, lng, c.lat, c.lng))
    }

    /// Whether any port's type contains `charging_type` (case-insensitive).
    pub fn offers_charging_type(&self, charging_type: &str) -> bool {
        let needle = charging_type.to_lowercase();
        self.ports
            .iter()
            .any(|p| p.port_type.to_lowercase().contains(&needle))
    }

    /// Change city and/or landmark and recompute the display address.
    pub fn relocate(&mut self, city: Option<String>, landmark: Option<String>) {
        if let Some(city) = city {
            self.city = city.trim().to_string();
        }
        if let Some(landmark) = landmark {
            self.nearby_landmark = landmark.trim().to_string();
        }
        self.address = format_display_address(&self.city, &self.nearby_landmark);
    }
}

/// Build the address shown to drivers from a city and a nearby landmark,
/// without repeating the city when the landmark already names it.
pub fn format_display_address(city: &str, landmark: &str) -> String {
    let city = city.trim();
    let landmark = landmark.trim();

    if city.is_empty() {
        return landmark.to_string();
    }
    if landmark.is_empty() {
        return city.to_string();
    }

    let city_lower = city.to_lowercase();
    let landmark_lower = landmark.to_lowercase();

    if landmark_lower == city_lower {
        return city.to_string();
    }
    if landmark_lower.starts_with(&format!("{} -", city_lower))
        || landmark_lower.starts_with(&format!("{} ,", city_lower))
        || landmark_lower.starts_with(&format!("{},", city_lower))
    {
        return landmark.to_string();
    }

    format!("{} - {}", city, landmark)
}

/// Great-circle distance between two points, rounded to 0.1 km.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_to(EARTH_RADIUS_KM * c, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(id: i32, port_type: &str, status: PortStatus) -> Port {
        Port {
            id,
            port_type: port_type.into(),
            power: 50.0,
            status,
            price: 8.0,
        }
    }

    #[test]
    fn display_address_combines_city_and_landmark() {
        assert_eq!(format_display_address("Pune", "Phoenix Mall"), "Pune - Phoenix Mall");
    }

    #[test]
    fn display_address_does_not_repeat_city() {
        assert_eq!(format_display_address("Pune", "pune - Baner"), "pune - Baner");
        assert_eq!(format_display_address("Pune", "Pune, Baner Road"), "Pune, Baner Road");
        assert_eq!(format_display_address("Pune", "PUNE"), "Pune");
    }

    #[test]
    fn display_address_with_missing_parts() {
        assert_eq!(format_display_address("", "Airport"), "Airport");
        assert_eq!(format_display_address("Delhi", "  "), "Delhi");
        assert_eq!(format_display_address("", ""), "");
    }

    #[test]
    fn haversine_known_distance() {
        // San Francisco to Oakland, roughly 13 km
        let d = haversine_km(37.7749, -122.4194, 37.8044, -122.2712);
        assert!((12.0..14.5).contains(&d), "got {}", d);
        assert_eq!(haversine_km(10.0, 10.0, 10.0, 10.0), 0.0);
    }

    #[test]
    fn distance_is_none_without_usable_coordinates() {
        let mut station = Station::new("S", "City", "Landmark", "op");
        assert_eq!(station.distance_from(1.0, 1.0), None);
        station.coordinates = Some(Coordinates { lat: 0.0, lng: 0.0 });
        assert_eq!(station.distance_from(1.0, 1.0), None);
        station.coordinates = Some(Coordinates { lat: 1.0, lng: 1.0 });
        assert_eq!(station.distance_from(1.0, 1.0), Some(0.0));
    }

    #[test]
    fn charging_type_match_is_case_insensitive_substring() {
        let mut station = Station::new("S", "City", "Landmark", "op");
        station.ports = vec![port(1, "Fast DC", PortStatus::Available)];
        assert!(station.offers_charging_type("fast"));
        assert!(station.offers_charging_type("DC"));
        assert!(!station.offers_charging_type("AC"));
    }

    #[test]
    fn relocate_recomputes_address() {
        let mut station = Station::new("S", "Pune", "Baner", "op");
        assert_eq!(station.address, "Pune - Baner");
        station.relocate(Some(" Mumbai ".into()), None);
        assert_eq!(station.city, "Mumbai");
        assert_eq!(station.address, "Mumbai - Baner");
    }

    #[test]
    fn status_parse() {
        assert_eq!(StationStatus::parse("busy"), Some(StationStatus::Busy));
        assert_eq!(StationStatus::parse("closed"), None);
        assert_eq!(PortStatus::from_str("weird"), PortStatus::Offline);
    }
}
