//! A set of helpers for testing

mod alert;
mod channels;
mod clock;
mod config;

pub use alert::AlertBuilder;
pub use channels::{RecordingEmailChannel, RecordingTicketChannel};
pub use clock::ManualClock;
pub use config::AppConfigBuilder;
