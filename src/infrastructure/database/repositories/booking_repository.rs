//! SeaORM implementation of BookingRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::debug;

use super::{conflict_or_db_err, db_err};
use crate::domain::booking::{Booking, BookingRepository, BookingStatus, SLOT_TAKEN};
use crate::domain::{DomainResult, RecordScope};
use crate::infrastructure::database::entities::booking;

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: booking::Model) -> Booking {
    Booking {
        id: m.id,
        user_id: m.user_id,
        station_id: m.station_id,
        port_id: m.port_id,
        date: m.date,
        time_slot: m.time_slot,
        charging_type: m.charging_type,
        estimated_cost: m.estimated_cost,
        status: BookingStatus::from_str(&m.status),
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn holding_statuses() -> Vec<&'static str> {
    BookingStatus::HOLDING.iter().map(|s| s.as_str()).collect()
}

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn create(&self, b: &Booking) -> DomainResult<()> {
        debug!(booking_id = %b.id, station_id = %b.station_id, "Creating booking");

        let model = booking::ActiveModel {
            id: Set(b.id.clone()),
            user_id: Set(b.user_id.clone()),
            station_id: Set(b.station_id.clone()),
            port_id: Set(b.port_id),
            date: Set(b.date.clone()),
            time_slot: Set(b.time_slot.clone()),
            charging_type: Set(b.charging_type.clone()),
            estimated_cost: Set(b.estimated_cost),
            status: Set(b.status.as_str().to_string()),
            created_at: Set(b.created_at),
            updated_at: Set(b.updated_at),
        };
        model
            .insert(&self.db)
            .await
            .map_err(|e| conflict_or_db_err(e, SLOT_TAKEN))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(&self, scope: &RecordScope) -> DomainResult<Vec<Booking>> {
        let query = match scope {
            RecordScope::All => booking::Entity::find(),
            RecordScope::User(user_id) => {
                booking::Entity::find().filter(booking::Column::UserId.eq(user_id.as_str()))
            }
            RecordScope::Stations(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                booking::Entity::find().filter(booking::Column::StationId.is_in(ids.iter().cloned()))
            }
            // Bookings are not linked to sessions
            RecordScope::Sessions(_) => return Ok(Vec::new()),
        };
        let models = query
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_holding(
        &self,
        station_id: &str,
        port_id: i32,
        date: &str,
        time_slot: &str,
    ) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find()
            .filter(booking::Column::StationId.eq(station_id))
            .filter(booking::Column::PortId.eq(port_id))
            .filter(booking::Column::Date.eq(date))
            .filter(booking::Column::TimeSlot.eq(time_slot))
            .filter(booking::Column::Status.is_in(holding_statuses()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn held_slots(
        &self,
        station_id: &str,
        date: &str,
        port_id: Option<i32>,
    ) -> DomainResult<Vec<String>> {
        let mut query = booking::Entity::find()
            .select_only()
            .column(booking::Column::TimeSlot)
            .filter(booking::Column::StationId.eq(station_id))
            .filter(booking::Column::Date.eq(date))
            .filter(booking::Column::Status.is_in(holding_statuses()));
        if let Some(port_id) = port_id {
            query = query.filter(booking::Column::PortId.eq(port_id));
        }
        query
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn set_status(&self, id: &str, status: BookingStatus) -> DomainResult<()> {
        booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(status.as_str()))
            .col_expr(booking::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(booking::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::TIME_SLOTS;
    use crate::domain::user::UserRole;
    use crate::domain::DomainError;
    use crate::infrastructure::database::testing::{create_station, create_user, test_repos};

    #[tokio::test]
    async fn unique_index_rejects_a_second_holder_of_the_slot() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;
        let u1 = create_user(repos.as_ref(), "u1@x.io", UserRole::User).await;
        let u2 = create_user(repos.as_ref(), "u2@x.io", UserRole::User).await;
        let s = create_station(repos.as_ref(), &op.id).await;

        let first = Booking::confirmed(&u1.id, &s.id, 1, "2025-03-01", TIME_SLOTS[0], "Fast DC");
        repos.bookings().create(&first).await.unwrap();

        let second = Booking::confirmed(&u2.id, &s.id, 1, "2025-03-01", TIME_SLOTS[0], "Fast DC");
        let err = repos.bookings().create(&second).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ref m) if m == SLOT_TAKEN));

        // Same slot on another port is fine
        let other_port = Booking::confirmed(&u2.id, &s.id, 2, "2025-03-01", TIME_SLOTS[0], "AC");
        repos.bookings().create(&other_port).await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_booking_frees_the_slot() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;
        let u = create_user(repos.as_ref(), "u@x.io", UserRole::User).await;
        let s = create_station(repos.as_ref(), &op.id).await;

        let b = Booking::confirmed(&u.id, &s.id, 1, "2025-03-01", TIME_SLOTS[3], "AC");
        repos.bookings().create(&b).await.unwrap();
        assert!(repos
            .bookings()
            .find_holding(&s.id, 1, "2025-03-01", TIME_SLOTS[3])
            .await
            .unwrap()
            .is_some());

        repos
            .bookings()
            .set_status(&b.id, BookingStatus::Cancelled)
            .await
            .unwrap();
        assert!(repos
            .bookings()
            .held_slots(&s.id, "2025-03-01", None)
            .await
            .unwrap()
            .is_empty());

        let again = Booking::confirmed(&u.id, &s.id, 1, "2025-03-01", TIME_SLOTS[3], "AC");
        repos.bookings().create(&again).await.unwrap();
    }

    #[tokio::test]
    async fn held_slots_can_be_narrowed_to_a_port() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;
        let u = create_user(repos.as_ref(), "u@x.io", UserRole::User).await;
        let s = create_station(repos.as_ref(), &op.id).await;

        for (port, slot) in [(1, TIME_SLOTS[0]), (2, TIME_SLOTS[1])] {
            let b = Booking::confirmed(&u.id, &s.id, port, "2025-03-01", slot, "AC");
            repos.bookings().create(&b).await.unwrap();
        }

        assert_eq!(
            repos.bookings().held_slots(&s.id, "2025-03-01", None).await.unwrap().len(),
            2
        );
        assert_eq!(
            repos.bookings().held_slots(&s.id, "2025-03-01", Some(2)).await.unwrap(),
            vec![TIME_SLOTS[1].to_string()]
        );
        assert!(repos
            .bookings()
            .held_slots(&s.id, "2025-03-02", None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn list_respects_scope() {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@x.io", UserRole::Operator).await;
        let u1 = create_user(repos.as_ref(), "u1@x.io", UserRole::User).await;
        let u2 = create_user(repos.as_ref(), "u2@x.io", UserRole::User).await;
        let s = create_station(repos.as_ref(), &op.id).await;

        repos
            .bookings()
            .create(&Booking::confirmed(&u1.id, &s.id, 1, "2025-03-01", TIME_SLOTS[0], "AC"))
            .await
            .unwrap();
        repos
            .bookings()
            .create(&Booking::confirmed(&u2.id, &s.id, 1, "2025-03-01", TIME_SLOTS[1], "AC"))
            .await
            .unwrap();

        let all = repos.bookings().list(&RecordScope::All).await.unwrap();
        assert_eq!(all.len(), 2);
        let mine = repos
            .bookings()
            .list(&RecordScope::User(u1.id.clone()))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        let none = repos
            .bookings()
            .list(&RecordScope::Stations(vec![]))
            .await
            .unwrap();
        assert!(none.is_empty());
        let at_station = repos
            .bookings()
            .list(&RecordScope::Stations(vec![s.id.clone()]))
            .await
            .unwrap();
        assert_eq!(at_station.len(), 2);
    }
}
