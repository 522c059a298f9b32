//! This module contains the data models for alertgate.

pub mod alert;
pub mod notification;

pub use alert::Alert;
pub use notification::{EmailRequest, EmailTemplate, TicketPost, TicketResponse};
