//! Application layer: one service per feature, each holding the repository
//! provider and enforcing who may do what.

pub mod access;
pub mod bookings;
pub mod charging;
pub mod dashboards;
pub mod identity;
pub mod names;
pub mod notifications;
pub mod optimizer;
pub mod payments;
pub mod reviews;
pub mod stations;

pub use bookings::BookingService;
pub use charging::{repair_charging, RepairReport, SessionService};
pub use dashboards::{AdminService, OperatorService};
pub use identity::{seed_default_users, UserService};
pub use notifications::NotificationService;
pub use optimizer::OptimizerService;
pub use payments::PaymentService;
pub use reviews::ReviewService;
pub use stations::StationService;
