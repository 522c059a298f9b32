//! Configuration module for alertgate.

mod app_config;
mod helpers;

pub use app_config::{
    AlertsConfig, AppConfig, AppInfo, EmailConfig, HttpClientConfig, TicketTargetConfig,
};
pub use helpers::{deserialize_duration_from_ms, deserialize_duration_from_seconds};
