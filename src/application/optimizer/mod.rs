//! Charging optimization reports produced by the generative AI backend

pub mod service;

pub use service::{build_prompt, ChargingPlan, OptimizerService};
