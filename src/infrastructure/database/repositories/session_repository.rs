//! SeaORM implementation of SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use super::notification_repository::notification_to_active;
use super::transaction_repository::transaction_to_active;
use super::{conflict_or_db_err, db_err};
use crate::domain::notification::Notification;
use crate::domain::session::{
    ChargingSession, SessionRepository, SessionStatus, ALREADY_CHARGING, NOT_ACTIVE,
};
use crate::domain::station::PortStatus;
use crate::domain::transaction::Transaction;
use crate::domain::{DomainError, DomainResult, RecordScope};
use crate::infrastructure::database::entities::{charging_session, station_port};

pub struct SeaOrmSessionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: charging_session::Model) -> ChargingSession {
    ChargingSession {
        id: m.id,
        user_id: m.user_id,
        station_id: m.station_id,
        port_id: m.port_id,
        charging_type: m.charging_type,
        payment_method: m.payment_method,
        status: SessionStatus::from_str(&m.status),
        start_time: m.start_time,
        end_time: m.end_time,
        duration: m.duration,
        energy_delivered: m.energy_delivered,
        cost: m.cost,
        total_cost: m.total_cost,
        progress: m.progress,
        battery_start: m.battery_start,
        estimated_completion: m.estimated_completion,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(s: &ChargingSession) -> charging_session::ActiveModel {
    charging_session::ActiveModel {
        id: Set(s.id.clone()),
        user_id: Set(s.user_id.clone()),
        station_id: Set(s.station_id.clone()),
        port_id: Set(s.port_id),
        charging_type: Set(s.charging_type.clone()),
        payment_method: Set(s.payment_method.clone()),
        status: Set(s.status.as_str().to_string()),
        start_time: Set(s.start_time),
        end_time: Set(s.end_time),
        duration: Set(s.duration),
        energy_delivered: Set(s.energy_delivered),
        cost: Set(s.cost),
        total_cost: Set(s.total_cost),
        progress: Set(s.progress),
        battery_start: Set(s.battery_start),
        estimated_completion: Set(s.estimated_completion),
        created_at: Set(s.created_at),
        updated_at: Set(s.updated_at),
    }
}

fn port_status_update(
    station_id: &str,
    port_id: i32,
    status: PortStatus,
) -> sea_orm::UpdateMany<station_port::Entity> {
    station_port::Entity::update_many()
        .col_expr(station_port::Column::Status, Expr::value(status.as_str()))
        .filter(station_port::Column::StationId.eq(station_id))
        .filter(station_port::Column::PortId.eq(port_id))
}

// ── SessionRepository impl ──────────────────────────────────────

#[async_trait]
impl SessionRepository for SeaOrmSessionRepository {
    async fn start(&self, s: &ChargingSession) -> DomainResult<()> {
        debug!(session_id = %s.id, user_id = %s.user_id, "Starting session");

        let txn = self.db.begin().await.map_err(db_err)?;
        domain_to_active(s)
            .insert(&txn)
            .await
            .map_err(|e| conflict_or_db_err(e, ALREADY_CHARGING))?;
        port_status_update(&s.station_id, s.port_id, PortStatus::Busy)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn complete(
        &self,
        s: &ChargingSession,
        charge: &Transaction,
        notification: &Notification,
    ) -> DomainResult<()> {
        debug!(session_id = %s.id, cost = s.total_cost, "Completing session");

        let txn = self.db.begin().await.map_err(db_err)?;
        // Only the stop that flips the row out of `active` may bill it.
        let closed = charging_session::Entity::update_many()
            .col_expr(charging_session::Column::Status, Expr::value(s.status.as_str()))
            .col_expr(charging_session::Column::EndTime, Expr::value(s.end_time))
            .col_expr(charging_session::Column::Duration, Expr::value(s.duration))
            .col_expr(
                charging_session::Column::EnergyDelivered,
                Expr::value(s.energy_delivered),
            )
            .col_expr(charging_session::Column::Cost, Expr::value(s.cost))
            .col_expr(charging_session::Column::TotalCost, Expr::value(s.total_cost))
            .col_expr(charging_session::Column::Progress, Expr::value(s.progress))
            .col_expr(charging_session::Column::UpdatedAt, Expr::value(s.updated_at))
            .filter(charging_session::Column::Id.eq(s.id.as_str()))
            .filter(charging_session::Column::Status.eq(SessionStatus::Active.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if closed.rows_affected != 1 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::Validation(NOT_ACTIVE.into()));
        }
        port_status_update(&s.station_id, s.port_id, PortStatus::Available)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        transaction_to_active(charge)
            .insert(&txn)
            .await
            .map_err(db_err)?;
        notification_to_active(notification)
            .insert(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ChargingSession>> {
        let model = charging_session::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<ChargingSession>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = charging_session::Entity::find()
            .filter(charging_session::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_active_for_user(&self, user_id: &str) -> DomainResult<Option<ChargingSession>> {
        let model = charging_session::Entity::find()
            .filter(charging_session::Column::UserId.eq(user_id))
            .filter(charging_session::Column::Status.eq(SessionStatus::Active.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(&self, scope: &RecordScope) -> DomainResult<Vec<ChargingSession>> {
        let query = match scope {
            RecordScope::All => charging_session::Entity::find(),
            RecordScope::User(user_id) => charging_session::Entity::find()
                .filter(charging_session::Column::UserId.eq(user_id.as_str())),
            RecordScope::Stations(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                charging_session::Entity::find()
                    .filter(charging_session::Column::StationId.is_in(ids.iter().cloned()))
            }
            RecordScope::Sessions(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                charging_session::Entity::find()
                    .filter(charging_session::Column::Id.is_in(ids.iter().cloned()))
            }
        };
        let models = query
            .order_by_desc(charging_session::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list_completed_for_user(&self, user_id: &str) -> DomainResult<Vec<ChargingSession>> {
        let models = charging_session::Entity::find()
            .filter(charging_session::Column::UserId.eq(user_id))
            .filter(charging_session::Column::Status.eq(SessionStatus::Completed.as_str()))
            .order_by_desc(charging_session::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list_completed(&self) -> DomainResult<Vec<ChargingSession>> {
        let models = charging_session::Entity::find()
            .filter(charging_session::Column::Status.eq(SessionStatus::Completed.as_str()))
            .order_by_asc(charging_session::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list_started_since(
        &self,
        station_ids: &[String],
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<ChargingSession>> {
        if station_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = charging_session::Entity::find()
            .filter(charging_session::Column::StationId.is_in(station_ids.iter().cloned()))
            .filter(charging_session::Column::StartTime.gte(since))
            .order_by_asc(charging_session::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn count_active_at(&self, station_ids: &[String]) -> DomainResult<u64> {
        if station_ids.is_empty() {
            return Ok(0);
        }
        charging_session::Entity::find()
            .filter(charging_session::Column::StationId.is_in(station_ids.iter().cloned()))
            .filter(charging_session::Column::Status.eq(SessionStatus::Active.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn ids_at_stations(&self, station_ids: &[String]) -> DomainResult<Vec<String>> {
        if station_ids.is_empty() {
            return Ok(Vec::new());
        }
        charging_session::Entity::find()
            .select_only()
            .column(charging_session::Column::Id)
            .filter(charging_session::Column::StationId.is_in(station_ids.iter().cloned()))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn update_billing(&self, s: &ChargingSession) -> DomainResult<()> {
        charging_session::Entity::update_many()
            .col_expr(charging_session::Column::Duration, Expr::value(s.duration))
            .col_expr(
                charging_session::Column::EnergyDelivered,
                Expr::value(s.energy_delivered),
            )
            .col_expr(charging_session::Column::Cost, Expr::value(s.cost))
            .col_expr(charging_session::Column::TotalCost, Expr::value(s.total_cost))
            .col_expr(charging_session::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(charging_session::Column::Id.eq(s.id.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
