//! Wires the alerting pipeline from the application configuration.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{
    config::AppConfig,
    engine::{
        AlertDispatcher, Clock, ContentFingerprint, Deduplicator, DispatchSettings, ErrorHandler,
        FingerprintPolicy, SystemClock, TicketRoute,
    },
    http_client::{HttpClientPool, HttpClientPoolError},
    notification::{HttpTicketChannel, NotificationError, SmtpEmailChannel, TemplateService},
};

/// Errors that can occur during initialization.
#[derive(Debug, Error)]
pub enum InitializationError {
    /// The email channel could not be created.
    #[error("Failed to create email channel: {0}")]
    EmailChannelError(#[from] NotificationError),

    /// An HTTP client for a ticket target could not be created.
    #[error("Failed to create ticket channel: {0}")]
    TicketChannelError(#[from] HttpClientPoolError),
}

/// The assembled alerting pipeline.
///
/// The dedup sweeper runs for as long as this value is alive.
pub struct Alerting {
    /// Entry point for reporting errors.
    pub handler: ErrorHandler,
    /// The dispatcher behind `handler`.
    pub dispatcher: Arc<AlertDispatcher>,
    /// The dedup cache used by `dispatcher`.
    pub deduplicator: Arc<Deduplicator>,
    _sweeper: DropGuard,
}

/// Builds the alerting pipeline at startup.
pub struct InitializationService {
    config: AppConfig,
    client_pool: Arc<HttpClientPool>,
    fingerprint_policy: Arc<dyn FingerprintPolicy>,
    clock: Arc<dyn Clock>,
}

impl InitializationService {
    /// Creates a new `InitializationService` using the content fingerprint
    /// policy with the configured window and the system clock.
    pub fn new(config: AppConfig, client_pool: Arc<HttpClientPool>) -> Self {
        let fingerprint_policy = Arc::new(ContentFingerprint::new(config.alerts.dedup_window));
        Self {
            config,
            client_pool,
            fingerprint_policy,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the fingerprint policy.
    pub fn fingerprint_policy(mut self, policy: Arc<dyn FingerprintPolicy>) -> Self {
        self.fingerprint_policy = policy;
        self
    }

    /// Replaces the clock used for dedup bookkeeping.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Creates the channels, the deduplicator, the dispatcher and the error
    /// handler, and starts the dedup sweeper.
    pub async fn run(&self) -> Result<Alerting, InitializationError> {
        let config = &self.config;

        let deduplicator = Arc::new(
            Deduplicator::new(Arc::clone(&self.fingerprint_policy), Arc::clone(&self.clock))
                .with_purge_interval(config.alerts.sweep_interval),
        );

        let mut settings = DispatchSettings {
            app_name: config.app.name.clone(),
            email_recipients: config.alert_recipients(),
            email_template: Some(config.email_template_path()),
            ticket_message_limit: config.alerts.ticket_message_limit,
            ..Default::default()
        };

        let mut builder = AlertDispatcher::builder().suppression(deduplicator.clone());

        match &config.email {
            Some(email_config) => {
                if settings.email_recipients.is_empty() {
                    tracing::warn!(
                        "Email channel configured without recipients, alert emails will fail."
                    );
                }
                settings.email_from = email_config.from.clone();
                let channel =
                    SmtpEmailChannel::new(email_config, Arc::new(TemplateService::new()))?;
                builder = builder.email_channel(Arc::new(channel));
                tracing::info!(
                    host = %email_config.host,
                    recipients = settings.email_recipients.len(),
                    "Email channel initialized."
                );
            }
            None => tracing::info!("No email configuration, alert emails are disabled."),
        }

        for target in &config.ticket_targets {
            let client = self.client_pool.get_or_create(&config.http).await?;
            let channel = HttpTicketChannel::new(target.name.clone(), &target.url, client);
            builder = builder.ticket_route(
                TicketRoute::new(target.name.clone(), Arc::new(channel))
                    .min_level(target.min_level)
                    .developer_ids(target.developer_ids.clone()),
            );
            tracing::info!(
                ticket_target = %target.name,
                url = %target.url,
                min_level = target.min_level,
                "Ticket channel initialized."
            );
        }

        let dispatcher = Arc::new(builder.settings(settings).build());
        let handler = ErrorHandler::from_config(config, Arc::clone(&dispatcher));

        let cancel = CancellationToken::new();
        Arc::clone(&deduplicator).spawn_sweeper(config.alerts.sweep_interval, cancel.clone());

        Ok(Alerting {
            handler,
            dispatcher,
            deduplicator,
            _sweeper: cancel.drop_guard(),
        })
    }
}
