use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::stations::{
    NewStation, PortSpec, SortBy, StationChanges, StationListing, StationQuery,
};
use crate::domain::station::{Coordinates, Port, Station};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct CoordinatesDto {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinates> for CoordinatesDto {
    fn from(c: Coordinates) -> Self {
        Self { lat: c.lat, lng: c.lng }
    }
}

impl From<CoordinatesDto> for Coordinates {
    fn from(c: CoordinatesDto) -> Self {
        Self { lat: c.lat, lng: c.lng }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PortDto {
    pub id: i32,
    #[serde(rename = "type")]
    pub port_type: String,
    /// kW
    pub power: f64,
    pub status: String,
    /// Per kWh
    pub price: f64,
}

impl From<Port> for PortDto {
    fn from(p: Port) -> Self {
        Self {
            id: p.id,
            port_type: p.port_type,
            power: p.power,
            status: p.status.as_str().to_string(),
            price: p.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationDto {
    pub id: String,
    pub name: String,
    pub address: String,
    pub nearby_landmark: String,
    pub city: String,
    pub coordinates: Option<CoordinatesDto>,
    pub operator_id: String,
    pub status: String,
    pub rating: f64,
    pub total_reviews: i32,
    pub amenities: Vec<String>,
    pub operating_hours: String,
    #[schema(value_type = Object)]
    pub pricing: Value,
    pub peak_hours: Option<String>,
    pub image: Option<String>,
    pub ports: Vec<PortDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Station> for StationDto {
    fn from(s: Station) -> Self {
        Self {
            id: s.id,
            name: s.name,
            address: s.address,
            nearby_landmark: s.nearby_landmark,
            city: s.city,
            coordinates: s.coordinates.map(Into::into),
            operator_id: s.operator_id,
            status: s.status.as_str().to_string(),
            rating: s.rating,
            total_reviews: s.total_reviews,
            amenities: s.amenities,
            operating_hours: s.operating_hours,
            pricing: s.pricing,
            peak_hours: s.peak_hours,
            image: s.image,
            ports: s.ports.into_iter().map(PortDto::from).collect(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// A station as listed to drivers: distance from the caller and the name of
/// the operator running it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationListingDto {
    #[serde(flatten)]
    pub station: StationDto,
    /// km, one decimal; absent when the station has no known location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    pub operator_name: String,
}

impl From<StationListing> for StationListingDto {
    fn from(l: StationListing) -> Self {
        Self {
            station: l.station.into(),
            distance: l.distance_km,
            operator_name: l.operator_name,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StationSearchParams {
    /// available / busy / offline, or `all`
    pub status: Option<String>,
    /// Case-insensitive substring of the city
    pub city: Option<String>,
    /// Substring of any port type, or `all`
    pub charging_type: Option<String>,
    /// km from `lat`/`lng`; `0` or an unparseable value means no limit
    pub max_distance: Option<String>,
    /// Unparseable values fall back to the default location
    pub lat: Option<String>,
    pub lng: Option<String>,
    /// `distance` (default) or `rating`
    pub sort_by: Option<String>,
}

fn lenient_number(raw: Option<String>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl From<StationSearchParams> for StationQuery {
    fn from(p: StationSearchParams) -> Self {
        Self {
            status: p.status,
            city: p.city,
            charging_type: p.charging_type,
            max_distance_km: lenient_number(p.max_distance),
            lat: lenient_number(p.lat),
            lng: lenient_number(p.lng),
            sort_by: p.sort_by.as_deref().map(SortBy::from_str).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PortRequest {
    pub id: Option<i32>,
    #[serde(rename = "type")]
    pub port_type: Option<String>,
    pub power: Option<f64>,
    pub status: Option<String>,
    pub price: Option<f64>,
}

impl From<PortRequest> for PortSpec {
    fn from(p: PortRequest) -> Self {
        Self {
            id: p.id,
            port_type: p.port_type,
            power: p.power,
            status: p.status,
            price: p.price,
        }
    }
}

fn port_specs(ports: Option<Vec<PortRequest>>) -> Option<Vec<PortSpec>> {
    ports.map(|ports| ports.into_iter().map(PortSpec::from).collect())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStationRequest {
    #[validate(length(max = 200, message = "name must be at most 200 characters"))]
    pub name: Option<String>,
    pub city: Option<String>,
    pub nearby_landmark: Option<String>,
    /// Accepted in place of `nearbyLandmark`
    pub address: Option<String>,
    pub coordinates: Option<CoordinatesDto>,
    pub amenities: Option<Vec<String>>,
    pub operating_hours: Option<String>,
    pub ports: Option<Vec<PortRequest>>,
    #[schema(value_type = Option<Object>)]
    pub pricing: Option<Value>,
    pub peak_hours: Option<String>,
    pub image: Option<String>,
}

impl From<CreateStationRequest> for NewStation {
    fn from(r: CreateStationRequest) -> Self {
        Self {
            name: r.name,
            city: r.city,
            nearby_landmark: r.nearby_landmark,
            address: r.address,
            coordinates: r.coordinates.map(Into::into),
            amenities: r.amenities,
            operating_hours: r.operating_hours,
            ports: port_specs(r.ports),
            pricing: r.pricing,
            peak_hours: r.peak_hours,
            image: r.image,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStationRequest {
    #[validate(length(max = 200, message = "name must be at most 200 characters"))]
    pub name: Option<String>,
    pub city: Option<String>,
    pub nearby_landmark: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<CoordinatesDto>,
    pub status: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub operating_hours: Option<String>,
    pub ports: Option<Vec<PortRequest>>,
    #[schema(value_type = Option<Object>)]
    pub pricing: Option<Value>,
    pub peak_hours: Option<String>,
    pub image: Option<String>,
}

impl From<UpdateStationRequest> for StationChanges {
    fn from(r: UpdateStationRequest) -> Self {
        Self {
            name: r.name,
            city: r.city,
            nearby_landmark: r.nearby_landmark,
            address: r.address,
            coordinates: r.coordinates.map(Into::into),
            status: r.status,
            amenities: r.amenities,
            operating_hours: r.operating_hours,
            ports: port_specs(r.ports),
            pricing: r.pricing,
            peak_hours: r.peak_hours,
            image: r.image,
        }
    }
}

/// `{"status": "..."}` body shared by the status endpoints.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_numbers_in_search_params_are_dropped() {
        let query = StationQuery::from(StationSearchParams {
            lat: Some("abc".into()),
            lng: Some(" 73.8 ".into()),
            max_distance: Some("NaN".into()),
            ..Default::default()
        });
        assert_eq!(query.lat, None);
        assert_eq!(query.lng, Some(73.8));
        assert_eq!(query.max_distance_km, None);
    }
}
