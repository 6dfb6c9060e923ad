//! Station aggregate
//!
//! A station owns its ports; ports are never addressed without their station.

pub mod model;
pub mod repository;

pub use model::{
    format_display_address, haversine_km, Coordinates, Port, PortStatus, Station, StationStatus,
};
pub use repository::{StationFilter, StationRepository};
