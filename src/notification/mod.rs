//! # Notification Channels
//!
//! Delivery mechanisms for alerts. Each channel is a trait so the dispatcher
//! can be wired with real transports in production and recording doubles in
//! tests.
//!
//! - [`EmailChannel`], implemented by [`SmtpEmailChannel`]: renders the alert
//!   email template and sends the message through an SMTP relay.
//! - [`TicketChannel`], implemented by [`HttpTicketChannel`]: files a report
//!   with a remote ticket system over HTTP.
//!
//! Channels make exactly one delivery attempt. Callers decide what to do with
//! a failure; the dispatcher logs and drops it.

pub mod email;
pub mod error;
pub mod template;
pub mod ticket;
mod traits;

pub use email::SmtpEmailChannel;
pub use error::NotificationError;
pub use template::{TemplateService, TemplateServiceError};
pub use ticket::HttpTicketChannel;
#[cfg(test)]
pub use traits::{MockEmailChannel, MockTicketChannel};
pub use traits::{EmailChannel, TicketChannel};
