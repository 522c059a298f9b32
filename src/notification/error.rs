//! Error types for the notification channels.

use thiserror::Error;

/// Defines the possible errors that can occur within a notification channel.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// An error related to invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error indicating that the notification failed to be sent.
    #[error("Notification failed: {0}")]
    NotifyFailed(String),

    /// The ticket system accepted the request but reported an error.
    #[error("Ticket system rejected the report ({reason}): {message}")]
    Remote {
        /// Reason code reported by the ticket system.
        reason: String,
        /// Message reported by the ticket system.
        message: String,
    },

    /// An error building or sending an email.
    #[error("Email error: {0}")]
    EmailError(String),

    /// An attachment could not be read.
    #[error("Failed to read attachment: {0}")]
    AttachmentError(#[from] std::io::Error),

    /// An error from the underlying `reqwest` library.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
}
