//! HTTP REST API
//!
//! - `common`: response envelope, error mapping, validated JSON extractor
//! - `middleware`: JWT authentication and role guards
//! - `modules`: handlers and DTOs per resource
//! - `router`: route table, shared state and Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use common::{ApiError, ApiResponse, ApiResult};
pub use router::{create_api_router, ApiDoc, AppState};
