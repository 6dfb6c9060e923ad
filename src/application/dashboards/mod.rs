//! Aggregated views for the admin and operator consoles

pub mod admin;
pub mod operator;

pub use admin::{
    Activity, AdminService, AdminSessionView, AdminStats, CityCount, FeedbackStats, MonthRevenue,
    MonthlyGrowth, StationRating, TransactionView,
};
pub use operator::{
    HourCount, MaintenanceAlert, OperatorService, OperatorStats, RecentReview, StationFeedback,
    StationRevenue,
};
