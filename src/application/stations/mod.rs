//! Station inventory: discovery, creation and operator management

pub mod service;

pub use service::{
    NewStation, PortSpec, SortBy, StationChanges, StationListing, StationQuery, StationService,
};
