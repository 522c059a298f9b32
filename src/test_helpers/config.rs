use std::time::Duration;

use url::Url;

use crate::config::{AppConfig, AppInfo, EmailConfig, TicketTargetConfig};

/// A builder for creating `AppConfig` instances for testing.
#[derive(Debug, Clone)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Starts from the defaults with the given application identity.
    pub fn new(name: &str, version: &str) -> Self {
        let config = AppConfig {
            app: AppInfo {
                name: name.to_string(),
                version: version.to_string(),
            },
            ..AppConfig::default()
        };
        Self { config }
    }

    /// Sets the profile.
    pub fn profile(mut self, profile: &str) -> Self {
        self.config.profile = profile.to_string();
        self
    }

    /// Sets the alert email recipients.
    pub fn emails(mut self, emails: &[&str]) -> Self {
        self.config.alerts.emails = emails.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Sets the dedup window.
    pub fn dedup_window(mut self, window: Duration) -> Self {
        self.config.alerts.dedup_window = window;
        self
    }

    /// Configures an SMTP relay.
    pub fn smtp(mut self, from: &str, host: &str) -> Self {
        self.config.email = Some(EmailConfig {
            from: from.to_string(),
            host: host.to_string(),
            port: 2525,
            username: String::new(),
            password: String::new(),
            starttls: false,
        });
        self
    }

    /// Adds a ticket target.
    pub fn ticket_target(mut self, name: &str, url: &str, min_level: i32) -> Self {
        self.config.ticket_targets.push(TicketTargetConfig {
            name: name.to_string(),
            url: Url::parse(url).unwrap(),
            min_level,
            developer_ids: Vec::new(),
        });
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> AppConfig {
        self.config
    }
}
