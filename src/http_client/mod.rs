//! This module provides a pool of shared HTTP clients for the ticket channel.

mod pool;

pub use pool::{HttpClientPool, HttpClientPoolError};
