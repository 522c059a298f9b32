#![warn(missing_docs)]
//! Alertgate turns application errors into operator notifications.
//!
//! An error reported through the [`engine::ErrorHandler`] becomes an
//! [`models::Alert`]. The [`engine::AlertDispatcher`] drops alerts that
//! repeat a recent one and fans the rest out to an email channel and any
//! number of ticket systems without ever blocking or failing the caller.

pub mod config;
pub mod engine;
pub mod http_client;
pub mod initialization;
pub mod models;
pub mod notification;
pub mod test_helpers;
