//! SeaORM implementation of StationRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::Value;
use tracing::debug;

use super::{contains_ci, db_err};
use crate::domain::station::{
    Coordinates, Port, PortStatus, Station, StationFilter, StationRepository, StationStatus,
};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::{station, station_port};

pub struct SeaOrmStationRepository {
    db: DatabaseConnection,
}

impl SeaOrmStationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach ports to station rows, keeping the row order.
    async fn with_ports(&self, models: Vec<station::Model>) -> DomainResult<Vec<Station>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let port_models = station_port::Entity::find()
            .filter(station_port::Column::StationId.is_in(ids))
            .order_by_asc(station_port::Column::PortId)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut ports: HashMap<String, Vec<Port>> = HashMap::new();
        for p in port_models {
            ports
                .entry(p.station_id.clone())
                .or_default()
                .push(port_to_domain(p));
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let station_ports = ports.remove(&m.id).unwrap_or_default();
                model_to_domain(m, station_ports)
            })
            .collect())
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn port_to_domain(p: station_port::Model) -> Port {
    Port {
        id: p.port_id,
        port_type: p.port_type,
        power: p.power,
        status: PortStatus::from_str(&p.status),
        price: p.price,
    }
}

fn port_to_active(station_id: &str, p: &Port) -> station_port::ActiveModel {
    station_port::ActiveModel {
        station_id: Set(station_id.to_string()),
        port_id: Set(p.id),
        port_type: Set(p.port_type.clone()),
        power: Set(p.power),
        status: Set(p.status.as_str().to_string()),
        price: Set(p.price),
    }
}

fn model_to_domain(m: station::Model, ports: Vec<Port>) -> Station {
    Station {
        id: m.id,
        name: m.name,
        address: m.address,
        nearby_landmark: m.nearby_landmark,
        city: m.city,
        coordinates: m
            .coordinates
            .and_then(|c| serde_json::from_value::<Coordinates>(c).ok()),
        operator_id: m.operator_id,
        status: StationStatus::from_str(&m.status),
        rating: m.rating,
        total_reviews: m.total_reviews,
        amenities: serde_json::from_value(m.amenities).unwrap_or_default(),
        operating_hours: m.operating_hours,
        pricing: m.pricing,
        peak_hours: m.peak_hours,
        image: m.image,
        ports,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(s: &Station) -> station::ActiveModel {
    station::ActiveModel {
        id: Set(s.id.clone()),
        name: Set(s.name.clone()),
        address: Set(s.address.clone()),
        nearby_landmark: Set(s.nearby_landmark.clone()),
        city: Set(s.city.clone()),
        coordinates: Set(s
            .coordinates
            .and_then(|c| serde_json::to_value(c).ok())),
        operator_id: Set(s.operator_id.clone()),
        status: Set(s.status.as_str().to_string()),
        rating: Set(s.rating),
        total_reviews: Set(s.total_reviews),
        amenities: Set(Value::from(s.amenities.clone())),
        operating_hours: Set(s.operating_hours.clone()),
        pricing: Set(s.pricing.clone()),
        peak_hours: Set(s.peak_hours.clone()),
        image: Set(s.image.clone()),
        created_at: Set(s.created_at),
        updated_at: Set(s.updated_at),
    }
}

// ── StationRepository impl ──────────────────────────────────────

#[async_trait]
impl StationRepository for SeaOrmStationRepository {
    async fn create(&self, s: &Station) -> DomainResult<()> {
        debug!(station_id = %s.id, ports = s.ports.len(), "Creating station");

        let txn = self.db.begin().await.map_err(db_err)?;
        domain_to_active(s).insert(&txn).await.map_err(db_err)?;
        if !s.ports.is_empty() {
            station_port::Entity::insert_many(s.ports.iter().map(|p| port_to_active(&s.id, p)))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Station>> {
        let model = station::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        match model {
            Some(m) => Ok(self.with_ports(vec![m]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<Station>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = station::Entity::find()
            .filter(station::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        self.with_ports(models).await
    }

    async fn list(&self, filter: &StationFilter) -> DomainResult<Vec<Station>> {
        let mut query = station::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(station::Column::Status.eq(status.as_str()));
        }
        if let Some(city) = filter.city.as_deref().filter(|c| !c.trim().is_empty()) {
            query = query.filter(contains_ci(station::Column::City, city));
        }
        let models = query
            .order_by_asc(station::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        self.with_ports(models).await
    }

    async fn find_by_operator(&self, operator_id: &str) -> DomainResult<Vec<Station>> {
        let models = station::Entity::find()
            .filter(station::Column::OperatorId.eq(operator_id))
            .order_by_asc(station::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        self.with_ports(models).await
    }

    async fn update(&self, s: &Station) -> DomainResult<()> {
        debug!(station_id = %s.id, "Updating station");

        let txn = self.db.begin().await.map_err(db_err)?;
        domain_to_active(s).update(&txn).await.map_err(db_err)?;
        station_port::Entity::delete_many()
            .filter(station_port::Column::StationId.eq(s.id.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if !s.ports.is_empty() {
            station_port::Entity::insert_many(s.ports.iter().map(|p| port_to_active(&s.id, p)))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn set_status(&self, id: &str, status: StationStatus) -> DomainResult<bool> {
        let result = station::Entity::update_many()
            .col_expr(station::Column::Status, Expr::value(status.as_str()))
            .col_expr(station::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(station::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn set_port_status(
        &self,
        station_id: &str,
        port_id: i32,
        status: PortStatus,
    ) -> DomainResult<bool> {
        let result = station_port::Entity::update_many()
            .col_expr(station_port::Column::Status, Expr::value(status.as_str()))
            .filter(station_port::Column::StationId.eq(station_id))
            .filter(station_port::Column::PortId.eq(port_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn update_pricing(
        &self,
        id: &str,
        pricing: Value,
        peak_hours: Option<String>,
    ) -> DomainResult<bool> {
        let result = station::Entity::update_many()
            .col_expr(station::Column::Pricing, Expr::value(pricing))
            .col_expr(station::Column::PeakHours, Expr::value(peak_hours))
            .col_expr(station::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(station::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn update_rating(&self, id: &str, rating: f64, total_reviews: i32) -> DomainResult<()> {
        station::Entity::update_many()
            .col_expr(station::Column::Rating, Expr::value(rating))
            .col_expr(station::Column::TotalReviews, Expr::value(total_reviews))
            .filter(station::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        station::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn count_active_ports(&self) -> DomainResult<u64> {
        station_port::Entity::find()
            .filter(station_port::Column::Status.ne(PortStatus::Offline.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn count_by_city(&self, limit: u64) -> DomainResult<Vec<(String, u64)>> {
        let cities: Vec<String> = station::Entity::find()
            .select_only()
            .column(station::Column::City)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for city in cities {
            *counts.entry(city).or_default() += 1;
        }
        let mut counts: Vec<(String, u64)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts.truncate(limit as usize);
        Ok(counts)
    }

    async fn latest(&self, limit: u64) -> DomainResult<Vec<Station>> {
        let models = station::Entity::find()
            .order_by_desc(station::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        self.with_ports(models).await
    }

    async fn top_rated(&self, limit: u64) -> DomainResult<Vec<Station>> {
        let models = station::Entity::find()
            .order_by_desc(station::Column::Rating)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        self.with_ports(models).await
    }

    async fn rated_below(&self, threshold: f64, limit: u64) -> DomainResult<Vec<Station>> {
        let models = station::Entity::find()
            .filter(station::Column::Rating.lt(threshold))
            .order_by_asc(station::Column::Rating)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        self.with_ports(models).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;
    use crate::infrastructure::database::testing::{create_station, create_user, port, test_repos};

    #[tokio::test]
    async fn station_round_trips_with_ports_and_json_fields() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;

        let mut s = Station::new("Hub", "Pune", "Baner", &op.id);
        s.coordinates = Some(Coordinates { lat: 18.5, lng: 73.8 });
        s.amenities = vec!["WiFi".into(), "Cafe".into()];
        s.pricing = serde_json::json!({"peak": 12});
        s.ports = vec![port(2, "Normal AC", PortStatus::Offline), port(1, "Fast DC", PortStatus::Available)];
        repos.stations().create(&s).await.unwrap();

        let stored = repos.stations().find_by_id(&s.id).await.unwrap().unwrap();
        assert_eq!(stored.address, "Pune - Baner");
        assert_eq!(stored.coordinates, Some(Coordinates { lat: 18.5, lng: 73.8 }));
        assert_eq!(stored.amenities, vec!["WiFi", "Cafe"]);
        assert_eq!(stored.pricing["peak"], 12);
        assert_eq!(stored.ports.len(), 2);
        assert_eq!(stored.ports[0].id, 1);
        assert_eq!(stored.ports[1].status, PortStatus::Offline);
    }

    #[tokio::test]
    async fn update_replaces_ports() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;
        let mut s = create_station(repos.as_ref(), &op.id).await;

        s.ports = vec![port(7, "CCS2", PortStatus::Available)];
        s.name = "Renamed".into();
        repos.stations().update(&s).await.unwrap();

        let stored = repos.stations().find_by_id(&s.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.ports.len(), 1);
        assert_eq!(stored.ports[0].id, 7);
    }

    #[tokio::test]
    async fn port_status_reports_unknown_ports() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;
        let s = create_station(repos.as_ref(), &op.id).await;

        assert!(repos
            .stations()
            .set_port_status(&s.id, 1, PortStatus::Busy)
            .await
            .unwrap());
        assert!(!repos
            .stations()
            .set_port_status(&s.id, 99, PortStatus::Busy)
            .await
            .unwrap());
        assert!(!repos
            .stations()
            .set_port_status("missing", 1, PortStatus::Busy)
            .await
            .unwrap());

        let stored = repos.stations().find_by_id(&s.id).await.unwrap().unwrap();
        assert_eq!(stored.port(1).unwrap().status, PortStatus::Busy);
    }

    #[tokio::test]
    async fn list_filters_by_status_and_city_substring() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;
        create_station(repos.as_ref(), &op.id).await;
        let mut other = Station::new("Fort", "Mumbai", "Fort", &op.id);
        other.status = StationStatus::Offline;
        repos.stations().create(&other).await.unwrap();

        let in_pune = repos
            .stations()
            .list(&StationFilter {
                city: Some("pun".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(in_pune.len(), 1);

        let offline = repos
            .stations()
            .list(&StationFilter {
                status: Some(StationStatus::Offline),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(offline.len(), 1);
        assert_eq!(offline[0].city, "Mumbai");
    }

    #[tokio::test]
    async fn city_filter_treats_wildcards_literally() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;
        create_station(repos.as_ref(), &op.id).await;

        for city in ["%", "_", "P_ne", "p%e"] {
            let found = repos
                .stations()
                .list(&StationFilter {
                    city: Some(city.into()),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert!(found.is_empty(), "{} matched {} stations", city, found.len());
        }

        let odd = Station::new("Depot", "Zone_5", "Yard", &op.id);
        repos.stations().create(&odd).await.unwrap();
        let found = repos
            .stations()
            .list(&StationFilter {
                city: Some("e_5".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].city, "Zone_5");
    }

    #[tokio::test]
    async fn aggregates() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;
        let a = create_station(repos.as_ref(), &op.id).await;
        let b = create_station(repos.as_ref(), &op.id).await;
        let c = Station::new("Fort", "Mumbai", "Fort", &op.id);
        repos.stations().create(&c).await.unwrap();

        repos.stations().set_port_status(&a.id, 1, PortStatus::Offline).await.unwrap();
        repos.stations().update_rating(&a.id, 4.8, 3).await.unwrap();
        repos.stations().update_rating(&b.id, 2.5, 1).await.unwrap();

        assert_eq!(repos.stations().count().await.unwrap(), 3);
        assert_eq!(repos.stations().count_active_ports().await.unwrap(), 3);
        assert_eq!(
            repos.stations().count_by_city(6).await.unwrap(),
            vec![("Pune".to_string(), 2), ("Mumbai".to_string(), 1)]
        );
        assert_eq!(repos.stations().top_rated(1).await.unwrap()[0].id, a.id);

        let low = repos.stations().rated_below(3.5, 3).await.unwrap();
        assert_eq!(low.len(), 2);
        assert_eq!(low[0].id, c.id);
        assert_eq!(low[1].id, b.id);
    }
}
