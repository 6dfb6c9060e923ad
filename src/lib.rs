//! # EVPulse
//!
//! Backend for an EV charging marketplace: drivers find stations, book
//! slots, charge and pay from a wallet; operators manage their stations;
//! admins oversee the whole platform.
//!
//! ## Architecture
//!
//! - **domain**: entities, status rules and repository traits
//! - **application**: services implementing the use cases
//! - **infrastructure**: SeaORM persistence, JWT/bcrypt, the AI client
//! - **interfaces**: the REST API with Swagger documentation
//! - **server**: startup, shutdown and tracing setup

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub use interfaces::http::{create_api_router, AppState};
