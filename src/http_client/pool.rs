//! A reusable, thread-safe pool for managing HTTP clients.
//!
//! Ticket targets that share the same [`HttpClientConfig`] share one
//! `reqwest::Client` and with it one connection pool.

use std::{collections::HashMap, sync::Arc, time::Duration};

use reqwest::Client;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::HttpClientConfig;

/// Errors that can occur within the `HttpClientPool`.
#[derive(Debug, Error)]
pub enum HttpClientPoolError {
    /// An error occurred while building the underlying `reqwest::Client`.
    #[error("Failed to create HTTP client: {0}")]
    HttpClientBuildError(String),
}

/// A pool of HTTP clients keyed by their configuration.
pub struct HttpClientPool {
    clients: Arc<RwLock<HashMap<HttpClientConfig, Arc<Client>>>>,
}

impl HttpClientPool {
    /// Creates a new, empty `HttpClientPool`.
    pub fn new() -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Gets an existing HTTP client from the pool or creates a new one if none
    /// exists for the given configuration.
    ///
    /// Uses double-checked locking so that concurrent callers asking for the
    /// same configuration end up with the same client.
    pub async fn get_or_create(
        &self,
        config: &HttpClientConfig,
    ) -> Result<Arc<Client>, HttpClientPoolError> {
        // Fast path: Check if the client already exists with a read lock.
        if let Some(client) = self.clients.read().await.get(config) {
            return Ok(client.clone());
        }

        let mut clients = self.clients.write().await;
        // Another task might have created the client while we were waiting
        // for the write lock.
        if let Some(client) = clients.get(config) {
            return Ok(client.clone());
        }

        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| HttpClientPoolError::HttpClientBuildError(e.to_string()))?;

        let client = Arc::new(client);
        clients.insert(config.clone(), client.clone());

        Ok(client)
    }

    /// Returns the number of active HTTP clients in the pool.
    pub async fn active_client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

impl Default for HttpClientPool {
    fn default() -> Self {
        Self::new()
    }
}
