pub mod admin;
pub mod config;
pub mod errors;
pub mod telemetry;
