use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::application::access::{ensure_can_manage, ensure_self_or_admin, station_scope};
use crate::application::names::{name_or, station_names, UNKNOWN_STATION};
use crate::domain::pricing::CO2_KG_PER_KWH;
use crate::domain::session::{SessionOptions, ALREADY_CHARGING, NOT_ACTIVE};
use crate::domain::{
    Actor, ChargingSession, DomainError, DomainResult, Notification, RecordScope,
    RepositoryProvider, Transaction, UserRole,
};
use crate::shared::{round_energy, round_money};

#[derive(Debug, Clone)]
pub struct SessionView {
    pub session: ChargingSession,
    pub station_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct StartSession {
    pub station_id: Option<String>,
    pub port_id: Option<i32>,
    pub options: SessionOptions,
}

/// Lifetime figures over a driver's completed sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub total_energy: f64,
    pub total_cost: f64,
    pub total_sessions: u64,
    pub avg_session_duration: i64,
    pub co2_saved: f64,
}

impl SessionStats {
    pub fn from_sessions(sessions: &[ChargingSession]) -> Self {
        let total_energy: f64 = sessions.iter().map(|s| s.energy_delivered).sum();
        let total_cost: f64 = sessions.iter().map(|s| s.cost).sum();
        let total_minutes: i64 = sessions.iter().map(|s| s.duration as i64).sum();
        let avg = if sessions.is_empty() {
            0
        } else {
            (total_minutes as f64 / sessions.len() as f64).round() as i64
        };
        Self {
            total_energy: round_energy(total_energy),
            total_cost: round_money(total_cost),
            total_sessions: sessions.len() as u64,
            avg_session_duration: avg,
            co2_saved: round_energy(total_energy * CO2_KG_PER_KWH),
        }
    }
}

pub struct SessionService {
    repos: Arc<dyn RepositoryProvider>,
}

impl SessionService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    async fn with_station_names(
        &self,
        sessions: Vec<ChargingSession>,
    ) -> DomainResult<Vec<SessionView>> {
        let names = station_names(
            self.repos.as_ref(),
            sessions.iter().map(|s| s.station_id.clone()),
        )
        .await?;
        Ok(sessions
            .into_iter()
            .map(|session| SessionView {
                station_name: name_or(&names, &session.station_id, UNKNOWN_STATION),
                session,
            })
            .collect())
    }

    async fn load(&self, id: &str) -> DomainResult<ChargingSession> {
        self.repos
            .sessions()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Session", id))
    }

    /// Sessions visible to `actor`, latest start first.
    pub async fn list(&self, actor: &Actor) -> DomainResult<Vec<SessionView>> {
        let scope = station_scope(self.repos.as_ref(), actor).await?;
        let sessions = self.repos.sessions().list(&scope).await?;
        self.with_station_names(sessions).await
    }

    pub async fn active_for(
        &self,
        actor: &Actor,
        user_id: &str,
    ) -> DomainResult<Option<ChargingSession>> {
        ensure_self_or_admin(actor, user_id)?;
        self.repos.sessions().find_active_for_user(user_id).await
    }

    pub async fn for_station(&self, actor: &Actor, station_id: &str) -> DomainResult<Vec<SessionView>> {
        let station = self
            .repos
            .stations()
            .find_by_id(station_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", station_id))?;
        ensure_can_manage(actor, &station)?;

        let sessions = self
            .repos
            .sessions()
            .list(&RecordScope::Stations(vec![station.id.clone()]))
            .await?;
        Ok(sessions
            .into_iter()
            .map(|session| SessionView {
                session,
                station_name: station.name.clone(),
            })
            .collect())
    }

    pub async fn start(&self, actor: &Actor, input: StartSession) -> DomainResult<ChargingSession> {
        let station_id = input
            .station_id
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| DomainError::Validation("stationId is required".into()))?;
        let port_id = input
            .port_id
            .ok_or_else(|| DomainError::Validation("portId is required".into()))?;

        let station = self
            .repos
            .stations()
            .find_by_id(&station_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", &station_id))?;
        if station.port(port_id).is_none() {
            return Err(DomainError::not_found("Port", port_id.to_string()));
        }

        if self
            .repos
            .sessions()
            .find_active_for_user(&actor.user_id)
            .await?
            .is_some()
        {
            return Err(DomainError::Validation(ALREADY_CHARGING.into()));
        }

        let session = ChargingSession::start(&actor.user_id, &station.id, port_id, input.options);
        self.repos.sessions().start(&session).await.map_err(|e| match e {
            DomainError::Conflict(msg) => DomainError::Validation(msg),
            other => other,
        })?;

        info!(
            session_id = %session.id,
            user_id = %actor.user_id,
            station_id = %station.id,
            port_id,
            "Charging session started"
        );
        Ok(session)
    }

    /// Finish an active session: bill it, free the port, record the charge
    /// and notify the driver.
    pub async fn stop(&self, actor: &Actor, session_id: &str) -> DomainResult<ChargingSession> {
        let mut session = self.load(session_id).await?;

        let permitted = match actor.role {
            UserRole::Admin => true,
            UserRole::User => session.user_id == actor.user_id,
            UserRole::Operator => self
                .repos
                .stations()
                .find_by_id(&session.station_id)
                .await?
                .is_some_and(|s| s.is_operated_by(&actor.user_id)),
        };
        if !permitted {
            return Err(DomainError::forbidden());
        }
        if !session.is_active() {
            return Err(DomainError::Validation(NOT_ACTIVE.into()));
        }

        let charge = session.complete(Utc::now());
        let transaction = Transaction::session_charge(
            &session.user_id,
            &session.id,
            charge.cost,
            &session.payment_method,
        );
        let notification = Notification::charging_complete(&session.user_id, charge.cost);

        self.repos
            .sessions()
            .complete(&session, &transaction, &notification)
            .await?;

        info!(
            session_id = %session.id,
            user_id = %session.user_id,
            duration_minutes = charge.duration_minutes,
            energy_kwh = charge.energy_kwh,
            cost = charge.cost,
            "Charging session completed"
        );
        Ok(session)
    }

    pub async fn history(&self, actor: &Actor, user_id: &str) -> DomainResult<Vec<SessionView>> {
        ensure_self_or_admin(actor, user_id)?;
        let sessions = self.repos.sessions().list_completed_for_user(user_id).await?;
        self.with_station_names(sessions).await
    }

    pub async fn stats(&self, actor: &Actor, user_id: &str) -> DomainResult<SessionStats> {
        ensure_self_or_admin(actor, user_id)?;
        let sessions = self.repos.sessions().list_completed_for_user(user_id).await?;
        Ok(SessionStats::from_sessions(&sessions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PortStatus, SessionStatus, TransactionType};
    use crate::infrastructure::database::testing::{create_station, create_user, test_repos};

    struct Fixture {
        svc: SessionService,
        repos: Arc<dyn RepositoryProvider>,
        driver: Actor,
        operator: Actor,
        station_id: String,
    }

    async fn fixture() -> Fixture {
        let repos = test_repos().await;
        let op = create_user(repos.as_ref(), "op@example.com", UserRole::Operator).await;
        let driver = create_user(repos.as_ref(), "driver@example.com", UserRole::User).await;
        let station = create_station(repos.as_ref(), &op.id).await;
        Fixture {
            svc: SessionService::new(repos.clone()),
            repos,
            driver: Actor::new(driver.id, UserRole::User),
            operator: Actor::new(op.id, UserRole::Operator),
            station_id: station.id,
        }
    }

    fn start_on(station_id: &str, port_id: i32) -> StartSession {
        StartSession {
            station_id: Some(station_id.into()),
            port_id: Some(port_id),
            options: SessionOptions::default(),
        }
    }

    #[tokio::test]
    async fn start_marks_the_port_busy() {
        let f = fixture().await;
        let session = f.svc.start(&f.driver, start_on(&f.station_id, 1)).await.unwrap();
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.payment_method, "Wallet");

        let station = f.repos.stations().find_by_id(&f.station_id).await.unwrap().unwrap();
        assert_eq!(station.port(1).unwrap().status, PortStatus::Busy);

        let active = f.svc.active_for(&f.driver, &f.driver.user_id).await.unwrap();
        assert_eq!(active.map(|s| s.id), Some(session.id));
    }

    #[tokio::test]
    async fn one_active_session_per_driver() {
        let f = fixture().await;
        f.svc.start(&f.driver, start_on(&f.station_id, 1)).await.unwrap();
        let err = f.svc.start(&f.driver, start_on(&f.station_id, 2)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m == ALREADY_CHARGING));
    }

    #[tokio::test]
    async fn start_validation() {
        let f = fixture().await;
        let err = f
            .svc
            .start(&f.driver, StartSession { port_id: Some(1), ..Default::default() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "stationId is required");

        let err = f.svc.start(&f.driver, start_on("missing", 1)).await.unwrap_err();
        assert_eq!(err.to_string(), "Station not found");

        let err = f.svc.start(&f.driver, start_on(&f.station_id, 7)).await.unwrap_err();
        assert_eq!(err.to_string(), "Port not found");
    }

    #[tokio::test]
    async fn stop_bills_and_releases_everything() {
        let f = fixture().await;
        let session = f.svc.start(&f.driver, start_on(&f.station_id, 1)).await.unwrap();

        let done = f.svc.stop(&f.driver, &session.id).await.unwrap();
        assert_eq!(done.status, SessionStatus::Completed);
        assert_eq!(done.progress, 100);
        assert!(done.end_time.is_some());

        let station = f.repos.stations().find_by_id(&f.station_id).await.unwrap().unwrap();
        assert_eq!(station.port(1).unwrap().status, PortStatus::Available);

        let charges = f.repos.transactions().list_charges_for_session(&session.id).await.unwrap();
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].transaction_type, TransactionType::Charging);
        assert_eq!(charges[0].amount, done.cost);

        let notes = f.repos.notifications().list_for_user(&f.driver.user_id).await.unwrap();
        assert_eq!(notes[0].kind, "charging_complete");

        let err = f.svc.stop(&f.driver, &session.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Session is not active");

        // The driver may charge again.
        assert!(f.svc.start(&f.driver, start_on(&f.station_id, 2)).await.is_ok());
    }

    #[tokio::test]
    async fn stop_permissions() {
        let f = fixture().await;
        let session = f.svc.start(&f.driver, start_on(&f.station_id, 1)).await.unwrap();

        let stranger = create_user(f.repos.as_ref(), "s@example.com", UserRole::User).await;
        let other_op = create_user(f.repos.as_ref(), "op2@example.com", UserRole::Operator).await;
        for actor in [
            Actor::new(stranger.id, UserRole::User),
            Actor::new(other_op.id, UserRole::Operator),
        ] {
            assert!(matches!(
                f.svc.stop(&actor, &session.id).await,
                Err(DomainError::Forbidden(_))
            ));
        }

        // The station's operator may stop it.
        assert!(f.svc.stop(&f.operator, &session.id).await.is_ok());
        assert!(matches!(
            f.svc.stop(&f.operator, "missing").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn overlapping_stops_bill_once() {
        let f = fixture().await;
        let session = f.svc.start(&f.driver, start_on(&f.station_id, 1)).await.unwrap();

        let (by_driver, by_operator) = tokio::join!(
            f.svc.stop(&f.driver, &session.id),
            f.svc.stop(&f.operator, &session.id)
        );
        assert_eq!(
            [by_driver.is_ok(), by_operator.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
        let loser = by_driver.err().or(by_operator.err()).unwrap();
        assert_eq!(loser.to_string(), NOT_ACTIVE);

        let charges = f.repos.transactions().list_charges_for_session(&session.id).await.unwrap();
        assert_eq!(charges.len(), 1);
        let notes = f.repos.notifications().list_for_user(&f.driver.user_id).await.unwrap();
        assert_eq!(notes.iter().filter(|n| n.kind == "charging_complete").count(), 1);
    }

    #[tokio::test]
    async fn history_and_stats_cover_completed_sessions() {
        let f = fixture().await;
        let session = f.svc.start(&f.driver, start_on(&f.station_id, 1)).await.unwrap();
        f.svc.stop(&f.driver, &session.id).await.unwrap();
        f.svc.start(&f.driver, start_on(&f.station_id, 2)).await.unwrap();

        let history = f.svc.history(&f.driver, &f.driver.user_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].station_name, "Baner Hub");

        let stats = f.svc.stats(&f.driver, &f.driver.user_id).await.unwrap();
        assert_eq!(stats.total_sessions, 1);

        assert_eq!(f.svc.list(&f.driver).await.unwrap().len(), 2);
        assert_eq!(f.svc.list(&f.operator).await.unwrap().len(), 2);
        assert_eq!(f.svc.for_station(&f.operator, &f.station_id).await.unwrap().len(), 2);

        let stranger = Actor::new("nobody", UserRole::User);
        assert!(matches!(
            f.svc.stats(&stranger, &f.driver.user_id).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn stats_arithmetic() {
        let mut a = ChargingSession::start("u", "s", 1, SessionOptions::default());
        a.energy_delivered = 10.25;
        a.cost = 2.5;
        a.duration = 10;
        let mut b = a.clone();
        b.energy_delivered = 4.0;
        b.cost = 1.06;
        b.duration = 15;

        let stats = SessionStats::from_sessions(&[a, b]);
        assert_eq!(stats.total_energy, 14.3);
        assert_eq!(stats.total_cost, 3.56);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.avg_session_duration, 13);
        assert_eq!(stats.co2_saved, 5.7);

        assert_eq!(SessionStats::from_sessions(&[]).avg_session_duration, 0);
    }
}
