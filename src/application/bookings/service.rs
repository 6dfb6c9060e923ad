use std::sync::Arc;

use tracing::{info, warn};

use crate::application::access::{ensure_can_manage, station_scope};
use crate::application::names::{name_or, station_names, UNKNOWN_STATION};
use crate::domain::booking::{is_valid_booking_date, is_valid_time_slot, SLOT_TAKEN, TIME_SLOTS};
use crate::domain::pricing::DEFAULT_CHARGING_TYPE;
use crate::domain::{
    Actor, Booking, BookingStatus, DomainError, DomainResult, Notification, RecordScope,
    RepositoryProvider,
};

#[derive(Debug, Clone)]
pub struct BookingView {
    pub booking: Booking,
    pub station_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewBooking {
    pub station_id: Option<String>,
    pub port_id: Option<i32>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
    pub charging_type: Option<String>,
}

fn require(value: Option<String>, field: &str) -> DomainResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| DomainError::Validation(format!("{} is required", field)))
}

pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
}

impl BookingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    async fn with_station_names(&self, bookings: Vec<Booking>) -> DomainResult<Vec<BookingView>> {
        let names = station_names(
            self.repos.as_ref(),
            bookings.iter().map(|b| b.station_id.clone()),
        )
        .await?;
        Ok(bookings
            .into_iter()
            .map(|booking| BookingView {
                station_name: name_or(&names, &booking.station_id, UNKNOWN_STATION),
                booking,
            })
            .collect())
    }

    /// Bookings visible to `actor`, newest first.
    pub async fn list(&self, actor: &Actor) -> DomainResult<Vec<BookingView>> {
        let scope = station_scope(self.repos.as_ref(), actor).await?;
        let bookings = self.repos.bookings().list(&scope).await?;
        self.with_station_names(bookings).await
    }

    /// Every booking on the platform, newest first.
    pub async fn list_all(&self) -> DomainResult<Vec<BookingView>> {
        let bookings = self.repos.bookings().list(&RecordScope::All).await?;
        self.with_station_names(bookings).await
    }

    pub async fn for_station(&self, actor: &Actor, station_id: &str) -> DomainResult<Vec<BookingView>> {
        let station = self
            .repos
            .stations()
            .find_by_id(station_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", station_id))?;
        ensure_can_manage(actor, &station)?;

        let bookings = self
            .repos
            .bookings()
            .list(&RecordScope::Stations(vec![station.id.clone()]))
            .await?;
        Ok(bookings
            .into_iter()
            .map(|booking| BookingView {
                booking,
                station_name: station.name.clone(),
            })
            .collect())
    }

    pub async fn create(&self, actor: &Actor, input: NewBooking) -> DomainResult<BookingView> {
        let station_id = require(input.station_id, "stationId")?;
        let port_id = input
            .port_id
            .ok_or_else(|| DomainError::Validation("portId is required".into()))?;
        let date = require(input.date, "date")?;
        let time_slot = require(input.time_slot, "timeSlot")?;

        if !is_valid_booking_date(&date) {
            return Err(DomainError::Validation(
                "date must be in YYYY-MM-DD format".into(),
            ));
        }
        if !is_valid_time_slot(&time_slot) {
            return Err(DomainError::Validation("Invalid time slot".into()));
        }

        let station = self
            .repos
            .stations()
            .find_by_id(&station_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", &station_id))?;

        if self
            .repos
            .bookings()
            .find_holding(&station.id, port_id, &date, &time_slot)
            .await?
            .is_some()
        {
            return Err(DomainError::Validation(SLOT_TAKEN.into()));
        }

        let charging_type = input
            .charging_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHARGING_TYPE.to_string());
        let booking = Booking::confirmed(
            &actor.user_id,
            &station.id,
            port_id,
            &date,
            &time_slot,
            charging_type,
        );

        // The partial unique index catches a booking that raced the pre-check.
        self.repos.bookings().create(&booking).await.map_err(|e| match e {
            DomainError::Conflict(msg) => DomainError::Validation(msg),
            other => other,
        })?;

        info!(
            booking_id = %booking.id,
            user_id = %actor.user_id,
            station_id = %station.id,
            port_id,
            date = %date,
            time_slot = %time_slot,
            "Booking confirmed"
        );

        let notification =
            Notification::booking_confirmed(&actor.user_id, &station.name, &date, &time_slot);
        if let Err(e) = self.repos.notifications().create(&notification).await {
            warn!(booking_id = %booking.id, error = %e, "Failed to store booking notification");
        }

        Ok(BookingView {
            booking,
            station_name: station.name,
        })
    }

    pub async fn cancel(&self, actor: &Actor, id: &str) -> DomainResult<Booking> {
        let mut booking = self
            .repos
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", id))?;

        if !actor.can_act_for(&booking.user_id) {
            return Err(DomainError::forbidden());
        }
        if booking.is_cancelled() {
            return Err(DomainError::Validation("Booking is already cancelled".into()));
        }

        self.repos
            .bookings()
            .set_status(id, BookingStatus::Cancelled)
            .await?;
        booking.status = BookingStatus::Cancelled;
        info!(booking_id = id, user_id = %actor.user_id, "Booking cancelled");
        Ok(booking)
    }

    /// Slots on `date` not held by a confirmed or pending booking.
    pub async fn available_slots(
        &self,
        station_id: Option<&str>,
        date: Option<&str>,
        port_id: Option<i32>,
    ) -> DomainResult<Vec<String>> {
        let (Some(station_id), Some(date)) = (
            station_id.filter(|s| !s.is_empty()),
            date.filter(|d| !d.is_empty()),
        ) else {
            return Err(DomainError::Validation(
                "stationId and date are required".into(),
            ));
        };

        let held = self
            .repos
            .bookings()
            .held_slots(station_id, date, port_id)
            .await?;
        Ok(TIME_SLOTS
            .iter()
            .filter(|slot| !held.iter().any(|h| h == *slot))
            .map(|slot| slot.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infrastructure::database::testing::{create_station, create_user, test_repos};

    struct Fixture {
        svc: BookingService,
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
            svc: BookingService::new(repos.clone()),
            repos,
            driver: Actor::new(driver.id, UserRole::User),
            operator: Actor::new(op.id, UserRole::Operator),
            station_id: station.id,
        }
    }

    fn request(station_id: &str, slot: &str) -> NewBooking {
        NewBooking {
            station_id: Some(station_id.into()),
            port_id: Some(1),
            date: Some("2030-05-01".into()),
            time_slot: Some(slot.into()),
            charging_type: None,
        }
    }

    #[tokio::test]
    async fn create_confirms_and_notifies() {
        let f = fixture().await;
        let view = f.svc.create(&f.driver, request(&f.station_id, TIME_SLOTS[0])).await.unwrap();

        assert_eq!(view.station_name, "Baner Hub");
        assert_eq!(view.booking.status, BookingStatus::Confirmed);
        assert_eq!(view.booking.charging_type, "Normal AC");
        assert_eq!(view.booking.estimated_cost, 7.5);

        let notes = f.repos.notifications().list_for_user(&f.driver.user_id).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(
            notes[0].message,
            "Your booking at Baner Hub for 2030-05-01, 08:00 - 09:00 has been confirmed."
        );
    }

    #[tokio::test]
    async fn create_validation() {
        let f = fixture().await;
        let mut req = request(&f.station_id, TIME_SLOTS[0]);
        req.date = None;
        assert_eq!(f.svc.create(&f.driver, req).await.unwrap_err().to_string(), "date is required");

        let mut req = request(&f.station_id, TIME_SLOTS[0]);
        req.date = Some("05/01/2030".into());
        assert!(matches!(f.svc.create(&f.driver, req).await, Err(DomainError::Validation(_))));

        let req = request(&f.station_id, "07:00 - 08:00");
        assert!(matches!(f.svc.create(&f.driver, req).await, Err(DomainError::Validation(_))));

        let req = request("missing", TIME_SLOTS[0]);
        assert!(matches!(f.svc.create(&f.driver, req).await, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn a_held_slot_cannot_be_booked_twice() {
        let f = fixture().await;
        f.svc.create(&f.driver, request(&f.station_id, TIME_SLOTS[3])).await.unwrap();

        let err = f
            .svc
            .create(&f.driver, request(&f.station_id, TIME_SLOTS[3]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m == SLOT_TAKEN));

        // Another port at the same time is free.
        let mut other_port = request(&f.station_id, TIME_SLOTS[3]);
        other_port.port_id = Some(2);
        assert!(f.svc.create(&f.driver, other_port).await.is_ok());
    }

    #[tokio::test]
    async fn unpadded_dates_cannot_sidestep_a_held_slot() {
        let f = fixture().await;
        let mut padded = request(&f.station_id, TIME_SLOTS[2]);
        padded.date = Some("2030-01-05".into());
        f.svc.create(&f.driver, padded).await.unwrap();

        let mut unpadded = request(&f.station_id, TIME_SLOTS[2]);
        unpadded.date = Some("2030-1-5".into());
        let err = f.svc.create(&f.driver, unpadded).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let slots = f
            .svc
            .available_slots(Some(&f.station_id), Some("2030-01-05"), Some(1))
            .await
            .unwrap();
        assert_eq!(slots.len(), TIME_SLOTS.len() - 1);
    }

    #[tokio::test]
    async fn cancelling_frees_the_slot() {
        let f = fixture().await;
        let view = f.svc.create(&f.driver, request(&f.station_id, TIME_SLOTS[5])).await.unwrap();

        let slots = f
            .svc
            .available_slots(Some(&f.station_id), Some("2030-05-01"), Some(1))
            .await
            .unwrap();
        assert_eq!(slots.len(), TIME_SLOTS.len() - 1);
        assert!(!slots.contains(&TIME_SLOTS[5].to_string()));

        f.svc.cancel(&f.driver, &view.booking.id).await.unwrap();
        let err = f.svc.cancel(&f.driver, &view.booking.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Booking is already cancelled");

        let slots = f
            .svc
            .available_slots(Some(&f.station_id), Some("2030-05-01"), None)
            .await
            .unwrap();
        assert_eq!(slots.len(), TIME_SLOTS.len());
        assert!(f.svc.create(&f.driver, request(&f.station_id, TIME_SLOTS[5])).await.is_ok());
    }

    #[tokio::test]
    async fn cancel_permissions() {
        let f = fixture().await;
        let view = f.svc.create(&f.driver, request(&f.station_id, TIME_SLOTS[1])).await.unwrap();
        let stranger = create_user(f.repos.as_ref(), "x@example.com", UserRole::User).await;

        let err = f
            .svc
            .cancel(&Actor::new(stranger.id, UserRole::User), &view.booking.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(matches!(
            f.svc.cancel(&f.driver, "missing").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn available_slots_needs_station_and_date() {
        let f = fixture().await;
        let err = f.svc.available_slots(Some(&f.station_id), None, None).await.unwrap_err();
        assert_eq!(err.to_string(), "stationId and date are required");
    }

    #[tokio::test]
    async fn listings_are_role_scoped() {
        let f = fixture().await;
        f.svc.create(&f.driver, request(&f.station_id, TIME_SLOTS[0])).await.unwrap();

        let other_op = create_user(f.repos.as_ref(), "op2@example.com", UserRole::Operator).await;
        let other_station = create_station(f.repos.as_ref(), &other_op.id).await;
        f.svc.create(&f.driver, request(&other_station.id, TIME_SLOTS[0])).await.unwrap();

        assert_eq!(f.svc.list(&f.driver).await.unwrap().len(), 2);
        assert_eq!(f.svc.list(&f.operator).await.unwrap().len(), 1);
        assert_eq!(f.svc.list_all().await.unwrap().len(), 2);

        let at_station = f.svc.for_station(&f.operator, &f.station_id).await.unwrap();
        assert_eq!(at_station.len(), 1);
        assert!(matches!(
            f.svc.for_station(&f.operator, &other_station.id).await,
            Err(DomainError::Forbidden(_))
        ));
    }
}
