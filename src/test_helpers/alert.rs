use std::path::PathBuf;

use crate::models::Alert;

/// A builder for creating `Alert` instances for testing.
#[derive(Debug, Clone)]
pub struct AlertBuilder {
    alert: Alert,
}

impl AlertBuilder {
    /// Creates a new `AlertBuilder` with the given message and subject.
    pub fn new(message: &str, subject: &str) -> Self {
        Self { alert: Alert::new(message, subject) }
    }

    /// Sets the level.
    pub fn level(mut self, level: i32) -> Self {
        self.alert.level = level;
        self
    }

    /// Restricts delivery to email.
    pub fn email_only(mut self) -> Self {
        self.alert.by_email = true;
        self.alert.by_ticket = false;
        self
    }

    /// Restricts delivery to ticket targets.
    pub fn ticket_only(mut self) -> Self {
        self.alert.by_email = false;
        self.alert.by_ticket = true;
        self
    }

    /// Adds an attachment.
    pub fn attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.alert.attachments.push(path.into());
        self
    }

    /// Builds the `Alert`.
    pub fn build(self) -> Alert {
        self.alert
    }
}
