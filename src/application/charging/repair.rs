//! Reconcile billing of finished sessions with the transaction ledger.
//!
//! Sessions closed by older builds may carry zero or runaway costs, and
//! their charge may be missing or disagree with the session. Running the
//! repair twice changes nothing the second time.

use tracing::{info, warn};

use crate::application::names::stations_by_id;
use crate::domain::transaction::Transaction;
use crate::domain::{ChargingSession, DomainResult, RepositoryProvider, Station};
use crate::shared::{round_energy, round_money};

pub const DEFAULT_PRICE_PER_KWH: f64 = 8.0;
pub const DEFAULT_POWER_KW: f64 = 22.0;
pub const MIN_POWER_KW: f64 = 3.0;
/// Share of rated power assumed to be delivered on average.
pub const LOAD_FACTOR: f64 = 0.15;
pub const MIN_COST: f64 = 1.0;
pub const MAX_COST: f64 = 50.0;
/// Amounts closer than this to the session cost are left alone.
pub const AMOUNT_TOLERANCE: f64 = 0.009;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub sessions_repaired: u64,
    pub transactions_repaired: u64,
    pub transactions_created: u64,
    pub dry_run: bool,
}

/// Billing figures a completed session should carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Billing {
    pub duration: i32,
    pub energy_delivered: f64,
    pub cost: f64,
}

fn derive_duration(session: &ChargingSession) -> i32 {
    if session.duration > 0 {
        return session.duration;
    }
    match session.end_time {
        Some(end) => {
            let secs = (end - session.start_time).num_seconds().max(0) as f64;
            ((secs / 60.0).ceil() as i32).max(1)
        }
        None => 1,
    }
}

pub fn compute_billing(session: &ChargingSession, station: Option<&Station>) -> Billing {
    let duration = derive_duration(session);
    let port = station.and_then(|s| s.port(session.port_id));
    let price = port.map_or(DEFAULT_PRICE_PER_KWH, |p| p.price);
    let power = port.map_or(DEFAULT_POWER_KW, |p| p.power).max(MIN_POWER_KW);

    let energy_delivered = if session.energy_delivered > 0.0 {
        round_energy(session.energy_delivered)
    } else {
        round_energy((duration as f64 / 60.0 * power * LOAD_FACTOR).max(0.1))
    };
    let cost = round_money((energy_delivered * price).clamp(MIN_COST, MAX_COST));

    Billing {
        duration,
        energy_delivered,
        cost,
    }
}

pub fn needs_repair(session: &ChargingSession) -> bool {
    session.cost <= 0.0
        || session.total_cost <= 0.0
        || session.cost > MAX_COST
        || session.total_cost > MAX_COST
        || session.energy_delivered <= 0.0
        || session.duration <= 0
}

/// Walk every completed session and fix its billing and charge. With
/// `dry_run` nothing is written but the counts are the same.
pub async fn repair_charging(
    repos: &dyn RepositoryProvider,
    dry_run: bool,
) -> DomainResult<RepairReport> {
    let sessions = repos.sessions().list_completed().await?;
    let stations = stations_by_id(repos, sessions.iter().map(|s| s.station_id.clone())).await?;

    let mut report = RepairReport {
        dry_run,
        ..Default::default()
    };

    for mut session in sessions {
        let billing = compute_billing(&session, stations.get(&session.station_id));

        if needs_repair(&session) {
            session.duration = billing.duration;
            session.energy_delivered = billing.energy_delivered;
            session.cost = billing.cost;
            session.total_cost = billing.cost;
            if !dry_run {
                repos.sessions().update_billing(&session).await?;
            }
            report.sessions_repaired += 1;
        }

        let charges = repos
            .transactions()
            .list_charges_for_session(&session.id)
            .await?;

        if charges.is_empty() {
            if !dry_run {
                let tx = Transaction::session_charge(
                    &session.user_id,
                    &session.id,
                    billing.cost,
                    &session.payment_method,
                );
                repos.transactions().create(&tx).await?;
            }
            report.transactions_created += 1;
            continue;
        }

        for tx in charges {
            if (tx.amount - billing.cost).abs() > AMOUNT_TOLERANCE {
                if !dry_run {
                    repos.transactions().update_amount(&tx.id, billing.cost).await?;
                }
                report.transactions_repaired += 1;
            }
        }
    }

    if report.sessions_repaired + report.transactions_repaired + report.transactions_created > 0 {
        warn!(?report, "Charging records needed repair");
    }
    info!(
        sessions_repaired = report.sessions_repaired,
        transactions_repaired = report.transactions_repaired,
        transactions_created = report.transactions_created,
        dry_run,
        "Charging repair finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use sea_orm::EntityTrait;

    use crate::domain::session::SessionOptions;
    use crate::domain::{Notification, UserRole};
    use crate::infrastructure::database::entities::Transaction as TransactionEntity;
    use crate::infrastructure::database::testing::{create_station, create_user, test_db};
    use crate::infrastructure::SeaOrmRepositoryProvider;

    fn finished(duration: i32, energy: f64, cost: f64) -> ChargingSession {
        let mut s = ChargingSession::start("u", "st", 1, SessionOptions::default());
        s.start_time = Utc::now() - Duration::minutes(90);
        s.end_time = Some(s.start_time + Duration::seconds(61));
        s.duration = duration;
        s.energy_delivered = energy;
        s.cost = cost;
        s.total_cost = cost;
        s
    }

    #[test]
    fn billing_defaults_without_a_station() {
        let b = compute_billing(&finished(0, 0.0, 0.0), None);
        // 61 s rounds up to 2 minutes
        assert_eq!(b.duration, 2);
        // 2/60 h * 22 kW * 0.15 = 0.11 kWh
        assert_eq!(b.energy_delivered, 0.1);
        // 0.1 kWh * 8 = 0.8, raised to the minimum
        assert_eq!(b.cost, MIN_COST);
    }

    #[test]
    fn billing_keeps_good_values_and_caps_cost() {
        let b = compute_billing(&finished(30, 12.34, 0.0), None);
        assert_eq!(b.duration, 30);
        assert_eq!(b.energy_delivered, 12.3);
        assert_eq!(b.cost, 50.0);
    }

    #[test]
    fn missing_times_mean_one_minute() {
        let mut s = finished(0, 0.0, 0.0);
        s.end_time = None;
        assert_eq!(compute_billing(&s, None).duration, 1);
    }

    #[test]
    fn repair_criteria() {
        assert!(!needs_repair(&finished(10, 8.0, 2.8)));
        assert!(needs_repair(&finished(10, 8.0, 0.0)));
        assert!(needs_repair(&finished(10, 8.0, 50.01)));
        assert!(needs_repair(&finished(0, 8.0, 2.8)));
        assert!(needs_repair(&finished(10, 0.0, 2.8)));
    }

    async fn completed_session(repos: &dyn RepositoryProvider) -> ChargingSession {
        let op = create_user(repos, "op@example.com", UserRole::Operator).await;
        let driver = create_user(repos, "d@example.com", UserRole::User).await;
        let station = create_station(repos, &op.id).await;

        let mut session = ChargingSession::start(&driver.id, &station.id, 1, SessionOptions::default());
        repos.sessions().start(&session).await.unwrap();
        // Stopped immediately: zero duration and zero cost.
        session.complete(session.start_time);
        let tx = Transaction::session_charge(&driver.id, &session.id, 0.0, "Wallet");
        let note = Notification::charging_complete(&driver.id, 0.0);
        repos.sessions().complete(&session, &tx, &note).await.unwrap();
        session
    }

    #[tokio::test]
    async fn repairs_once_and_is_idempotent() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(test_db().await));
        let session = completed_session(repos.as_ref()).await;

        let dry = repair_charging(repos.as_ref(), true).await.unwrap();
        assert_eq!(dry.sessions_repaired, 1);
        assert_eq!(dry.transactions_repaired, 1);
        assert!(dry.dry_run);
        let untouched = repos.sessions().find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(untouched.cost, 0.0);

        let report = repair_charging(repos.as_ref(), false).await.unwrap();
        assert_eq!(
            (report.sessions_repaired, report.transactions_repaired, report.transactions_created),
            (1, 1, 0)
        );

        let fixed = repos.sessions().find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(fixed.duration, 1);
        assert_eq!(fixed.cost, MIN_COST);
        assert_eq!(fixed.total_cost, MIN_COST);
        let charges = repos.transactions().list_charges_for_session(&session.id).await.unwrap();
        assert_eq!(charges[0].amount, MIN_COST);

        let again = repair_charging(repos.as_ref(), false).await.unwrap();
        assert_eq!(again, RepairReport::default());
    }

    #[tokio::test]
    async fn creates_a_missing_charge() {
        let db = test_db().await;
        let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let session = completed_session(repos.as_ref()).await;
        TransactionEntity::delete_many().exec(&db).await.unwrap();

        let report = repair_charging(repos.as_ref(), false).await.unwrap();
        assert_eq!(report.transactions_created, 1);

        let charges = repos.transactions().list_charges_for_session(&session.id).await.unwrap();
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].payment_method, "Wallet");
        assert_eq!(charges[0].description, "Charging session at station");
    }
}
