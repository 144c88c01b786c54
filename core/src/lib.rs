//! NPS Desk core library.
//!
//! Turns per-advisor monthly survey distributions into Net Promoter Score
//! figures, keeps the working set in memory, persists it through a
//! gateway, and renders month exports as CSV.

pub mod aggregation;
pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod gateway;
pub mod metrics;
pub mod record;
pub mod session;
pub mod store;
pub mod types;
