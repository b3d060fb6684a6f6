//! courier-sync
//!
//! Pushes routing solver solutions into a courier-management backend and
//! keeps the backend's orders tidy.

pub mod cli;
pub mod client;
pub mod config;
pub mod delete;
pub mod error;
pub mod fixed_orders;
pub mod mvrp;
pub mod records;
pub mod refs;
pub mod retry;
pub mod service_duration;
pub mod solver_log;
pub mod time_intervals;
pub mod upload;
