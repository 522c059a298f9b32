use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{deserialize_duration_from_ms, deserialize_duration_from_seconds};

/// Provides the default value for profile.
fn default_profile() -> String {
    "dev".to_string()
}

/// Provides the default value for resources_path.
fn default_resources_path() -> PathBuf {
    PathBuf::from("resources")
}

/// Provides the default value for email_template.
fn default_email_template() -> String {
    "developer_email.html".to_string()
}

/// Provides the default value for dedup_window.
fn default_dedup_window() -> Duration {
    Duration::from_secs(5 * 60)
}

/// Provides the default value for ticket_message_limit.
fn default_ticket_message_limit() -> usize {
    4000
}

/// Provides the default value for sweep_interval.
fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_smtp_port() -> u16 {
    587
}

fn default_starttls() -> bool {
    true
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Identity of the application raising alerts.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppInfo {
    /// Application name.
    pub name: String,
    /// Application version.
    #[serde(default)]
    pub version: String,
}

impl AppInfo {
    /// Returns `{name}-{version}`.
    pub fn full_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// Alerting policy inputs.
#[derive(Debug, Deserialize, Clone)]
pub struct AlertsConfig {
    /// Operator addresses that receive alert emails.
    #[serde(default)]
    pub emails: Vec<String>,

    /// Address used when `emails` is empty.
    #[serde(default)]
    pub fallback_email: Option<String>,

    /// Time window during which alerts sharing a fingerprint are suppressed.
    #[serde(
        rename = "dedup_window_secs",
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_dedup_window"
    )]
    pub dedup_window: Duration,

    /// Maximum number of characters forwarded to ticket targets.
    #[serde(default = "default_ticket_message_limit")]
    pub ticket_message_limit: usize,

    /// Interval of the background sweep over expired dedup entries.
    #[serde(
        rename = "sweep_interval_secs",
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_sweep_interval"
    )]
    pub sweep_interval: Duration,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            emails: Vec::new(),
            fallback_email: None,
            dedup_window: default_dedup_window(),
            ticket_message_limit: default_ticket_message_limit(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

/// SMTP settings for the email channel.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    /// Sender address of alert emails.
    pub from: String,
    /// SMTP relay host.
    pub host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// SMTP username.
    #[serde(default)]
    pub username: String,
    /// SMTP password.
    #[serde(default)]
    pub password: String,
    /// Whether to upgrade the connection with STARTTLS.
    #[serde(default = "default_starttls")]
    pub starttls: bool,
}

/// A remote ticket system receiving alert reports.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TicketTargetConfig {
    /// Name used in logs.
    pub name: String,
    /// Base URL of the ticket system. Reports are posted to `{url}/postMsg`.
    pub url: Url,
    /// Alerts with a lower level are not reported to this target.
    #[serde(default)]
    pub min_level: i32,
    /// Ticket system users notified about the report.
    #[serde(default)]
    pub developer_ids: Vec<i64>,
}

/// Settings for the HTTP clients used by ticket targets.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct HttpClientConfig {
    /// Connection timeout.
    #[serde(
        rename = "connect_timeout_ms",
        deserialize_with = "deserialize_duration_from_ms",
        default = "default_connect_timeout"
    )]
    pub connect_timeout: Duration,

    /// Whole-request timeout.
    #[serde(
        rename = "request_timeout_ms",
        deserialize_with = "deserialize_duration_from_ms",
        default = "default_request_timeout"
    )]
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Application configuration for alertgate.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Deployment profile, e.g. `dev` or `prod`.
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Application identity.
    pub app: AppInfo,

    /// Directory holding the email templates.
    #[serde(default = "default_resources_path")]
    pub resources_path: PathBuf,

    /// File name of the alert email template inside `resources_path`.
    #[serde(default = "default_email_template")]
    pub email_template: String,

    /// Alerting policy.
    #[serde(default)]
    pub alerts: AlertsConfig,

    /// SMTP settings. Email delivery is disabled when absent.
    #[serde(default)]
    pub email: Option<EmailConfig>,

    /// Ticket systems receiving alerts.
    #[serde(default)]
    pub ticket_targets: Vec<TicketTargetConfig>,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpClientConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            app: AppInfo::default(),
            resources_path: default_resources_path(),
            email_template: default_email_template(),
            alerts: AlertsConfig::default(),
            email: None,
            ticket_targets: Vec::new(),
            http: HttpClientConfig::default(),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading from the configuration directory.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `{dir}/app.yaml`, the optional `{dir}/app-{profile}.yaml` and
    /// `ALERTGATE__*` environment variables.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = Path::new(config_dir.unwrap_or("configs"));

        // The profile selects the overlay file, so it is resolved first.
        let profile = Config::builder()
            .add_source(File::from(config_dir.join("app.yaml")))
            .add_source(Self::environment())
            .build()?
            .get_string("profile")
            .unwrap_or_else(|_| default_profile());

        let s = Config::builder()
            .add_source(File::from(config_dir.join("app.yaml")))
            .add_source(File::from(config_dir.join(format!("app-{profile}.yaml"))).required(false))
            .add_source(Self::environment())
            .build()?;

        s.try_deserialize()
    }

    fn environment() -> Environment {
        Environment::with_prefix("ALERTGATE").separator("__")
    }

    /// Default alert subject: `{name}-{version}-[{profile}]`.
    pub fn alert_subject(&self) -> String {
        format!("{}-[{}]", self.app.full_name(), self.profile)
    }

    /// Full path of the alert email template.
    pub fn email_template_path(&self) -> PathBuf {
        self.resources_path.join(&self.email_template)
    }

    /// Recipients of alert emails, falling back to `fallback_email` when no
    /// address is configured.
    pub fn alert_recipients(&self) -> Vec<String> {
        if !self.alerts.emails.is_empty() {
            return self.alerts.emails.clone();
        }
        self.alerts.fallback_email.iter().cloned().collect()
    }
}
