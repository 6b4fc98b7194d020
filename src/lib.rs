pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod protocols;
pub mod store;
pub mod tasks;
pub mod telemetry;
