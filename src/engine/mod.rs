//! The alerting engine: builds alerts from errors, deduplicates them and
//! dispatches them to the notification channels.

pub mod clock;
pub mod deduplicator;
pub mod dispatcher;
pub mod error_handler;
pub mod fingerprint;

pub use clock::{Clock, SystemClock};
pub use deduplicator::{Deduplicator, SuppressionPolicy};
pub use dispatcher::{AlertDispatcher, AlertDispatcherBuilder, DispatchSettings, TicketRoute};
pub use error_handler::{ErrorHandler, describe_error};
pub use fingerprint::{ContentFingerprint, Fingerprint, FingerprintPolicy};
