//! The alert dispatcher applies the suppression policy to an alert and fans
//! the surviving alert out to the delivery channels.
//!
//! Every delivery runs as its own task on a [`TaskTracker`]. The dispatcher
//! never waits for, retries or reports a delivery: a failing channel loses
//! that one notification and the failure is only logged. This keeps the
//! error path that raised the alert free of new failures.

use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use serde_json::json;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;

use crate::{
    engine::deduplicator::SuppressionPolicy,
    models::{Alert, EmailRequest, EmailTemplate, TicketPost},
    notification::{EmailChannel, TicketChannel},
};

/// A ticket target together with the alerts it accepts.
#[derive(Clone)]
pub struct TicketRoute {
    /// Name used in logs.
    pub name: String,
    /// Channel filing the reports.
    pub channel: Arc<dyn TicketChannel>,
    /// Alerts with a lower level are not routed here.
    pub min_level: i32,
    /// Ticket system users notified about the report.
    pub developer_ids: Vec<i64>,
}

impl TicketRoute {
    /// Creates a route accepting every alert.
    pub fn new(name: impl Into<String>, channel: Arc<dyn TicketChannel>) -> Self {
        Self {
            name: name.into(),
            channel,
            min_level: i32::MIN,
            developer_ids: Vec::new(),
        }
    }

    /// Sets the minimum alert level.
    pub fn min_level(mut self, min_level: i32) -> Self {
        self.min_level = min_level;
        self
    }

    /// Sets the notified ticket system users.
    pub fn developer_ids(mut self, developer_ids: Vec<i64>) -> Self {
        self.developer_ids = developer_ids;
        self
    }

    fn accepts(&self, alert: &Alert) -> bool {
        alert.level >= self.min_level
    }
}

/// Static inputs of the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Subject used for alerts that have none.
    pub app_name: String,
    /// Sender of alert emails.
    pub email_from: String,
    /// Recipients of alert emails.
    pub email_recipients: Vec<String>,
    /// Template rendered into the email body.
    pub email_template: Option<PathBuf>,
    /// Maximum number of message characters sent to ticket targets.
    pub ticket_message_limit: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            email_from: String::new(),
            email_recipients: Vec::new(),
            email_template: None,
            ticket_message_limit: 4000,
        }
    }
}

/// Sends alerts to their channels.
pub struct AlertDispatcher {
    settings: DispatchSettings,
    suppression: Option<Arc<dyn SuppressionPolicy>>,
    email: Option<Arc<dyn EmailChannel>>,
    tickets: Vec<TicketRoute>,
    tracker: TaskTracker,
}

impl AlertDispatcher {
    /// Creates a new `AlertDispatcherBuilder`.
    pub fn builder() -> AlertDispatcherBuilder {
        AlertDispatcherBuilder::default()
    }

    /// Dispatches an alert.
    ///
    /// Returns once every delivery has been submitted, not completed. The
    /// alert is suppressed in place when the suppression policy rejects it;
    /// an alert that arrives suppressed touches no channel.
    pub fn send_alert(&self, alert: &mut Alert) {
        if !alert.should_send() {
            tracing::debug!(subject = %alert.subject, "Alert disabled before dispatch.");
            return;
        }

        if alert.subject.is_empty() {
            alert.subject = self.settings.app_name.clone();
        }

        if let Some(policy) = &self.suppression {
            if policy.should_suppress(alert) {
                alert.suppress();
                tracing::debug!(subject = %alert.subject, "Alert suppressed.");
                return;
            }
        }

        if alert.by_email {
            self.submit_email(alert);
        }

        if alert.by_ticket {
            self.submit_tickets(alert);
        }
    }

    fn submit_email(&self, alert: &Alert) {
        let Some(channel) = &self.email else {
            tracing::debug!(
                subject = %alert.subject,
                "No email channel configured, skipping email."
            );
            return;
        };

        let request = EmailRequest {
            from: self.settings.email_from.clone(),
            to: self.settings.email_recipients.clone(),
            subject: alert.subject.clone(),
            body: alert.message.clone(),
            template: self
                .settings
                .email_template
                .clone()
                .map(|path| EmailTemplate {
                    path,
                    data: json!({ "msg": alert.message }),
                }),
        };

        let channel = Arc::clone(channel);
        self.submit("email", async move {
            let subject = request.subject.clone();
            if let Err(e) = channel.send(request).await {
                tracing::warn!(subject = %subject, error = %e, "Alert email was not delivered.");
            }
        });
    }

    fn submit_tickets(&self, alert: &Alert) {
        for route in self.tickets.iter().filter(|route| route.accepts(alert)) {
            let post = TicketPost::from_alert(
                alert,
                self.settings.ticket_message_limit,
                route.developer_ids.clone(),
            );

            let channel = Arc::clone(&route.channel);
            let name = route.name.clone();
            self.submit("ticket", async move {
                let project = post.project.clone();
                if let Err(e) = channel.post_message(post).await {
                    tracing::warn!(
                        ticket_target = %name,
                        project = %project,
                        error = %e,
                        "Alert report was not delivered."
                    );
                }
            });
        }
    }

    fn submit<F>(&self, channel: &'static str, delivery: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                self.tracker.spawn_on(delivery, &handle);
            }
            Err(_) => {
                tracing::warn!(channel, "No async runtime available, alert delivery dropped.");
            }
        }
    }

    /// Number of deliveries that have been submitted and not finished.
    pub fn pending_deliveries(&self) -> usize {
        self.tracker.len()
    }

    /// Waits up to `timeout` for submitted deliveries to finish and returns
    /// whether all of them did.
    ///
    /// Meant for process shutdown. Alerts dispatched while draining are still
    /// delivered and waited for.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok();
        self.tracker.reopen();
        if !drained {
            tracing::warn!(
                pending = self.tracker.len(),
                "Timed out waiting for alert deliveries."
            );
        }
        drained
    }
}

/// A builder for creating an `AlertDispatcher` instance.
#[derive(Default)]
pub struct AlertDispatcherBuilder {
    settings: DispatchSettings,
    suppression: Option<Arc<dyn SuppressionPolicy>>,
    email: Option<Arc<dyn EmailChannel>>,
    tickets: Vec<TicketRoute>,
}

impl AlertDispatcherBuilder {
    /// Sets the dispatcher settings.
    pub fn settings(mut self, settings: DispatchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the suppression policy. Without one no alert is suppressed.
    pub fn suppression(mut self, suppression: Arc<dyn SuppressionPolicy>) -> Self {
        self.suppression = Some(suppression);
        self
    }

    /// Sets the email channel. Without one emails are skipped.
    pub fn email_channel(mut self, channel: Arc<dyn EmailChannel>) -> Self {
        self.email = Some(channel);
        self
    }

    /// Adds a ticket target.
    pub fn ticket_route(mut self, route: TicketRoute) -> Self {
        self.tickets.push(route);
        self
    }

    /// Builds the dispatcher.
    pub fn build(self) -> AlertDispatcher {
        AlertDispatcher {
            settings: self.settings,
            suppression: self.suppression,
            email: self.email,
            tickets: self.tickets,
            tracker: TaskTracker::new(),
        }
    }
}
