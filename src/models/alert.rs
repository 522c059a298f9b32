//! The alert record produced for an application error.

use std::path::PathBuf;

use serde::Serialize;

/// A notification about an application error.
///
/// An alert is created and owned by the call that observed the error. The
/// caller may adjust any field before dispatch, with one restriction: once an
/// alert is suppressed it can never be re-enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// Full, operator-facing error description.
    pub message: String,
    /// Grouping title. Also used as the ticket project.
    pub subject: String,
    /// Files attached to the alert. Only the first one is forwarded to
    /// ticket targets.
    pub attachments: Vec<PathBuf>,
    /// Deliver by email.
    pub by_email: bool,
    /// Deliver to ticket targets.
    pub by_ticket: bool,
    /// Severity. Ticket targets ignore alerts below their threshold.
    pub level: i32,
    send: bool,
}

impl Alert {
    /// Creates an alert that will be delivered by email and to ticket
    /// targets with level 1.
    pub fn new(message: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            subject: subject.into(),
            attachments: Vec::new(),
            by_email: true,
            by_ticket: true,
            level: 1,
            send: true,
        }
    }

    /// Whether the alert is still eligible for delivery.
    pub fn should_send(&self) -> bool {
        self.send
    }

    /// Marks the alert as not to be delivered. Irreversible.
    pub fn suppress(&mut self) {
        self.send = false;
    }
}
