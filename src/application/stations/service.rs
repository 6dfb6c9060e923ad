use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::application::access::ensure_can_manage;
use crate::application::names::{user_names, UNKNOWN_OPERATOR};
use crate::domain::station::StationFilter;
use crate::domain::{
    Actor, DomainError, DomainResult, Port, PortStatus, RepositoryProvider, Station, StationStatus,
};
use crate::domain::station::Coordinates;
use crate::domain::pricing::DEFAULT_CHARGING_TYPE;

/// Used when the client sends no location.
pub const DEFAULT_LAT: f64 = 37.7749;
pub const DEFAULT_LNG: f64 = -122.4194;

const DEFAULT_PORT_POWER_KW: f64 = 22.0;
const DEFAULT_PORT_PRICE: f64 = 8.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// Nearest first; stations without a distance go last
    #[default]
    Distance,
    /// Highest rating first
    Rating,
}

impl SortBy {
    pub fn from_str(s: &str) -> Self {
        match s {
            "rating" => Self::Rating,
            _ => Self::Distance,
        }
    }
}

/// Public station search. `"all"` in `status` or `charging_type` means no filter.
#[derive(Debug, Clone, Default)]
pub struct StationQuery {
    pub status: Option<String>,
    pub city: Option<String>,
    pub charging_type: Option<String>,
    pub max_distance_km: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub sort_by: SortBy,
}

#[derive(Debug, Clone)]
pub struct StationListing {
    pub station: Station,
    pub distance_km: Option<f64>,
    pub operator_name: String,
}

/// Port as sent by clients; missing fields take defaults and a missing id
/// becomes the port's 1-based position.
#[derive(Debug, Clone, Default)]
pub struct PortSpec {
    pub id: Option<i32>,
    pub port_type: Option<String>,
    pub power: Option<f64>,
    pub status: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewStation {
    pub name: Option<String>,
    pub city: Option<String>,
    /// Falls back to `address` when absent
    pub nearby_landmark: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub amenities: Option<Vec<String>>,
    pub operating_hours: Option<String>,
    pub ports: Option<Vec<PortSpec>>,
    pub pricing: Option<Value>,
    pub peak_hours: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StationChanges {
    pub name: Option<String>,
    pub city: Option<String>,
    pub nearby_landmark: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub status: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub operating_hours: Option<String>,
    pub ports: Option<Vec<PortSpec>>,
    pub pricing: Option<Value>,
    pub peak_hours: Option<String>,
    pub image: Option<String>,
}

fn build_ports(specs: Vec<PortSpec>) -> DomainResult<Vec<Port>> {
    let mut ports: Vec<Port> = Vec::with_capacity(specs.len());
    for (index, spec) in specs.into_iter().enumerate() {
        let id = spec.id.unwrap_or(index as i32 + 1);
        if ports.iter().any(|p| p.id == id) {
            return Err(DomainError::Validation(format!("Duplicate port id {}", id)));
        }
        let status = match spec.status.as_deref() {
            None => PortStatus::Available,
            Some(s) => PortStatus::parse(s)
                .ok_or_else(|| DomainError::Validation("Invalid status".into()))?,
        };
        ports.push(Port {
            id,
            port_type: spec
                .port_type
                .unwrap_or_else(|| DEFAULT_CHARGING_TYPE.to_string()),
            power: spec.power.unwrap_or(DEFAULT_PORT_POWER_KW),
            status,
            price: spec.price.unwrap_or(DEFAULT_PORT_PRICE),
        });
    }
    Ok(ports)
}

fn parse_station_status(s: &str) -> DomainResult<StationStatus> {
    StationStatus::parse(s).ok_or_else(|| DomainError::Validation("Invalid status".into()))
}

fn parse_port_status(s: &str) -> DomainResult<PortStatus> {
    PortStatus::parse(s).ok_or_else(|| DomainError::Validation("Invalid status".into()))
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

pub struct StationService {
    repos: Arc<dyn RepositoryProvider>,
}

impl StationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn get(&self, id: &str) -> DomainResult<Station> {
        self.repos
            .stations()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", id))
    }

    /// Attach the operator's display name to each station.
    pub async fn with_operator_names(&self, stations: Vec<Station>) -> DomainResult<Vec<StationListing>> {
        let names = user_names(
            self.repos.as_ref(),
            stations.iter().map(|s| s.operator_id.clone()),
        )
        .await?;
        Ok(stations
            .into_iter()
            .map(|station| StationListing {
                operator_name: names
                    .get(&station.operator_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_OPERATOR.to_string()),
                distance_km: None,
                station,
            })
            .collect())
    }

    pub async fn search(&self, query: StationQuery) -> DomainResult<Vec<StationListing>> {
        let status = match query.status.as_deref() {
            None | Some("") | Some("all") => None,
            Some(s) => match StationStatus::parse(s) {
                Some(status) => Some(status),
                // An unknown status matches nothing rather than everything.
                None => return Ok(Vec::new()),
            },
        };

        let filter = StationFilter {
            status,
            city: query.city.filter(|c| !c.trim().is_empty()),
        };
        let lat = query.lat.unwrap_or(DEFAULT_LAT);
        let lng = query.lng.unwrap_or(DEFAULT_LNG);

        let charging_type = query
            .charging_type
            .filter(|t| !t.is_empty() && t != "all");

        let stations: Vec<Station> = self
            .repos
            .stations()
            .list(&filter)
            .await?
            .into_iter()
            .filter(|s| {
                charging_type
                    .as_deref()
                    .map_or(true, |t| s.offers_charging_type(t))
            })
            .collect();

        let mut listings = self.with_operator_names(stations).await?;
        for listing in &mut listings {
            listing.distance_km = listing.station.distance_from(lat, lng);
        }

        // Zero means no limit.
        if let Some(max) = query.max_distance_km.filter(|max| *max != 0.0) {
            listings.retain(|l| l.distance_km.map_or(true, |d| d <= max));
        }

        match query.sort_by {
            SortBy::Distance => listings.sort_by(|a, b| {
                let a = a.distance_km.unwrap_or(f64::INFINITY);
                let b = b.distance_km.unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            }),
            SortBy::Rating => {
                listings.sort_by(|a, b| b.station.rating.total_cmp(&a.station.rating))
            }
        }

        Ok(listings)
    }

    /// Every station with its operator name, oldest first.
    pub async fn list_all(&self) -> DomainResult<Vec<StationListing>> {
        let stations = self.repos.stations().list(&StationFilter::default()).await?;
        self.with_operator_names(stations).await
    }

    pub async fn by_operator(&self, operator_id: &str) -> DomainResult<Vec<Station>> {
        self.repos.stations().find_by_operator(operator_id).await
    }

    pub async fn create(&self, actor: &Actor, input: NewStation) -> DomainResult<Station> {
        let name = trimmed(input.name);
        let city = trimmed(input.city);
        let landmark = trimmed(input.nearby_landmark.or(input.address));

        if name.is_empty() {
            return Err(DomainError::Validation("name is required".into()));
        }
        if city.is_empty() {
            return Err(DomainError::Validation("city is required".into()));
        }
        if landmark.is_empty() {
            return Err(DomainError::Validation("nearby landmark is required".into()));
        }

        let mut station = Station::new(name, city, landmark, actor.user_id.clone());
        station.coordinates = input.coordinates;
        station.amenities = input.amenities.unwrap_or_default();
        if let Some(hours) = input.operating_hours {
            station.operating_hours = hours;
        }
        station.ports = build_ports(input.ports.unwrap_or_default())?;
        if let Some(pricing) = input.pricing {
            station.pricing = pricing;
        }
        station.peak_hours = input.peak_hours;
        station.image = input.image;

        self.repos.stations().create(&station).await?;
        info!(station_id = %station.id, operator_id = %station.operator_id, "Station created");
        Ok(station)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        changes: StationChanges,
    ) -> DomainResult<Station> {
        let mut station = self.get(id).await?;
        ensure_can_manage(actor, &station)?;

        let landmark = changes.nearby_landmark.or(changes.address);
        if changes.city.is_some() || landmark.is_some() {
            station.relocate(changes.city, landmark);
        }
        if let Some(name) = changes.name {
            station.name = name.trim().to_string();
        }
        if let Some(status) = changes.status {
            station.status = parse_station_status(&status)?;
        }
        if let Some(coordinates) = changes.coordinates {
            station.coordinates = Some(coordinates);
        }
        if let Some(amenities) = changes.amenities {
            station.amenities = amenities;
        }
        if let Some(hours) = changes.operating_hours {
            station.operating_hours = hours;
        }
        if let Some(ports) = changes.ports {
            station.ports = build_ports(ports)?;
        }
        if let Some(pricing) = changes.pricing {
            station.pricing = pricing;
        }
        if let Some(peak) = changes.peak_hours {
            station.peak_hours = Some(peak);
        }
        if let Some(image) = changes.image {
            station.image = Some(image);
        }
        station.updated_at = chrono::Utc::now();

        self.repos.stations().update(&station).await?;
        info!(station_id = %station.id, "Station updated");
        Ok(station)
    }

    pub async fn set_status(&self, actor: &Actor, id: &str, status: &str) -> DomainResult<()> {
        let status = parse_station_status(status)?;
        let station = self.get(id).await?;
        ensure_can_manage(actor, &station)?;
        self.repos.stations().set_status(id, status).await?;
        info!(station_id = id, status = status.as_str(), "Station status changed");
        Ok(())
    }

    /// Admin override: no ownership check.
    pub async fn force_status(&self, id: &str, status: &str) -> DomainResult<()> {
        let status = parse_station_status(status)?;
        if !self.repos.stations().set_status(id, status).await? {
            return Err(DomainError::not_found("Station", id));
        }
        info!(station_id = id, status = status.as_str(), "Station status changed by admin");
        Ok(())
    }

    pub async fn set_port_status(
        &self,
        actor: &Actor,
        station_id: &str,
        port_id: i32,
        status: &str,
    ) -> DomainResult<()> {
        let status = parse_port_status(status)?;
        let not_found = || DomainError::not_found("Station or port", format!("{}/{}", station_id, port_id));

        let station = self
            .repos
            .stations()
            .find_by_id(station_id)
            .await?
            .ok_or_else(not_found)?;
        ensure_can_manage(actor, &station)?;

        if !self
            .repos
            .stations()
            .set_port_status(station_id, port_id, status)
            .await?
        {
            return Err(not_found());
        }
        info!(station_id, port_id, status = status.as_str(), "Port status changed");
        Ok(())
    }

    /// Owners only: admins use the station update instead.
    pub async fn update_pricing(
        &self,
        actor: &Actor,
        station_id: &str,
        pricing: Option<Value>,
        peak_hours: Option<String>,
    ) -> DomainResult<()> {
        let station = self.get(station_id).await?;
        if !station.is_operated_by(&actor.user_id) {
            return Err(DomainError::forbidden());
        }
        let pricing = pricing.unwrap_or_else(|| Value::Object(Default::default()));
        self.repos
            .stations()
            .update_pricing(station_id, pricing, peak_hours)
            .await?;
        info!(station_id, "Pricing updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infrastructure::database::testing::{create_station, create_user, test_repos};
    use serde_json::json;

    async fn setup() -> (StationService, Arc<dyn RepositoryProvider>, Actor) {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@example.com", UserRole::Operator).await;
        (
            StationService::new(repos.clone()),
            repos,
            Actor::new(op.id, UserRole::Operator),
        )
    }

    fn new_station(name: &str, city: &str, landmark: &str) -> NewStation {
        NewStation {
            name: Some(name.into()),
            city: Some(city.into()),
            nearby_landmark: Some(landmark.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_validates_trimmed_fields() {
        let (svc, _, op) = setup().await;
        let err = svc.create(&op, new_station("  ", "Pune", "Baner")).await.unwrap_err();
        assert_eq!(err.to_string(), "name is required");
        let err = svc.create(&op, new_station("Hub", "", "Baner")).await.unwrap_err();
        assert_eq!(err.to_string(), "city is required");
        let err = svc.create(&op, new_station("Hub", "Pune", " ")).await.unwrap_err();
        assert_eq!(err.to_string(), "nearby landmark is required");
    }

    #[tokio::test]
    async fn create_derives_address_and_port_ids() {
        let (svc, _, op) = setup().await;
        let mut input = new_station("Hub", "Pune", "");
        input.nearby_landmark = None;
        input.address = Some("Pune, Baner Road".into());
        input.ports = Some(vec![
            PortSpec {
                port_type: Some("Fast DC".into()),
                ..Default::default()
            },
            PortSpec::default(),
        ]);

        let station = svc.create(&op, input).await.unwrap();
        assert_eq!(station.address, "Pune, Baner Road");
        assert_eq!(station.ports.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(station.ports[1].port_type, "Normal AC");

        let stored = svc.get(&station.id).await.unwrap();
        assert_eq!(stored.ports.len(), 2);
        assert_eq!(stored.operator_id, op.user_id);
    }

    #[tokio::test]
    async fn duplicate_port_ids_are_rejected() {
        let (svc, _, op) = setup().await;
        let mut input = new_station("Hub", "Pune", "Baner");
        input.ports = Some(vec![
            PortSpec { id: Some(3), ..Default::default() },
            PortSpec { id: Some(3), ..Default::default() },
        ]);
        assert!(matches!(svc.create(&op, input).await, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn search_sorts_by_distance_with_unknown_last() {
        let (svc, repos, op) = setup().await;
        let near = svc
            .create(&op, NewStation {
                coordinates: Some(Coordinates { lat: 37.78, lng: -122.42 }),
                ..new_station("Near", "San Francisco", "Market St")
            })
            .await
            .unwrap();
        let far = svc
            .create(&op, NewStation {
                coordinates: Some(Coordinates { lat: 37.80, lng: -122.27 }),
                ..new_station("Far", "Oakland", "Lake Merritt")
            })
            .await
            .unwrap();
        let nowhere = create_station(repos.as_ref(), &op.user_id).await;

        let all = svc.search(StationQuery::default()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|l| l.station.id.clone()).collect();
        assert_eq!(ids, vec![near.id.clone(), far.id.clone(), nowhere.id.clone()]);
        assert_eq!(all[0].operator_name, "op");

        let close = svc
            .search(StationQuery {
                max_distance_km: Some(5.0),
                ..Default::default()
            })
            .await
            .unwrap();
        // Stations without coordinates are never dropped by the distance filter.
        let ids: Vec<_> = close.iter().map(|l| l.station.id.clone()).collect();
        assert_eq!(ids, vec![near.id.clone(), nowhere.id.clone()]);

        let unlimited = svc
            .search(StationQuery {
                max_distance_km: Some(0.0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(unlimited.len(), 3);
    }

    #[tokio::test]
    async fn search_filters() {
        let (svc, repos, op) = setup().await;
        let baner = create_station(repos.as_ref(), &op.user_id).await;
        let mut ac_only = new_station("AC Spot", "Mumbai", "Bandra");
        ac_only.ports = Some(vec![PortSpec {
            port_type: Some("Type 2 AC".into()),
            ..Default::default()
        }]);
        svc.create(&op, ac_only).await.unwrap();

        let fast = svc
            .search(StationQuery {
                charging_type: Some("fast".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(fast.len(), 1);
        assert_eq!(fast[0].station.id, baner.id);

        let mumbai = svc
            .search(StationQuery {
                city: Some("MUM".into()),
                charging_type: Some("all".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mumbai.len(), 1);

        let offline = svc
            .search(StationQuery {
                status: Some("offline".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(offline.is_empty());
        assert_eq!(
            svc.search(StationQuery {
                status: Some("all".into()),
                ..Default::default()
            })
            .await
            .unwrap()
            .len(),
            2
        );
    }

    #[tokio::test]
    async fn only_the_owner_or_admin_may_update() {
        let (svc, repos, op) = setup().await;
        let other = create_user(repos.as_ref(), "other@example.com", UserRole::Operator).await;
        let station = create_station(repos.as_ref(), &op.user_id).await;

        let intruder = Actor::new(other.id, UserRole::Operator);
        let err = svc
            .update(&intruder, &station.id, StationChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let updated = svc
            .update(
                &op,
                &station.id,
                StationChanges {
                    city: Some("Mumbai".into()),
                    status: Some("busy".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.address, "Mumbai - Baner");
        assert_eq!(updated.status, StationStatus::Busy);

        let admin = Actor::new("admin-id", UserRole::Admin);
        svc.set_status(&admin, &station.id, "offline").await.unwrap();
        assert_eq!(svc.get(&station.id).await.unwrap().status, StationStatus::Offline);
    }

    #[tokio::test]
    async fn port_status_errors() {
        let (svc, repos, op) = setup().await;
        let station = create_station(repos.as_ref(), &op.user_id).await;

        let err = svc.set_port_status(&op, &station.id, 1, "broken").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid status");
        let err = svc.set_port_status(&op, &station.id, 9, "offline").await.unwrap_err();
        assert_eq!(err.to_string(), "Station or port not found");
        let err = svc.set_port_status(&op, "missing", 1, "offline").await.unwrap_err();
        assert_eq!(err.to_string(), "Station or port not found");

        svc.set_port_status(&op, &station.id, 1, "offline").await.unwrap();
        let stored = svc.get(&station.id).await.unwrap();
        assert_eq!(stored.port(1).unwrap().status, PortStatus::Offline);
    }

    #[tokio::test]
    async fn pricing_is_owner_only() {
        let (svc, repos, op) = setup().await;
        let station = create_station(repos.as_ref(), &op.user_id).await;
        let admin = Actor::new("admin-id", UserRole::Admin);

        let err = svc
            .update_pricing(&admin, &station.id, Some(json!({"fast": 12})), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        svc.update_pricing(&op, &station.id, Some(json!({"fast": 12})), Some("6 PM - 9 PM".into()))
            .await
            .unwrap();
        let stored = svc.get(&station.id).await.unwrap();
        assert_eq!(stored.pricing["fast"], 12);
        assert_eq!(stored.peak_hours.as_deref(), Some("6 PM - 9 PM"));
    }
}
