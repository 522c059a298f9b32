use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    models::{EmailRequest, TicketPost, TicketResponse},
    notification::error::NotificationError,
};

/// A channel delivering alert emails.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmailChannel: Send + Sync {
    /// Sends one email. A failed delivery is not retried.
    async fn send(&self, request: EmailRequest) -> Result<(), NotificationError>;
}

/// A channel filing alert reports in a ticket system.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TicketChannel: Send + Sync {
    /// Posts one report and returns the ticket system's response.
    async fn post_message(&self, post: TicketPost) -> Result<TicketResponse, NotificationError>;
}
