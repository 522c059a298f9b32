//! Turns application errors into alerts.

use std::{error::Error, fmt::Write, sync::Arc};

use serde::Serialize;

use crate::{config::AppConfig, engine::dispatcher::AlertDispatcher, models::Alert};

/// Builds alerts for errors and hands them to the [`AlertDispatcher`].
///
/// The handler only observes errors: callers keep propagating their own
/// error unchanged after reporting it.
#[derive(Clone)]
pub struct ErrorHandler {
    subject: String,
    dispatcher: Arc<AlertDispatcher>,
}

impl ErrorHandler {
    /// Creates a handler whose alerts default to `subject`.
    pub fn new(subject: impl Into<String>, dispatcher: Arc<AlertDispatcher>) -> Self {
        Self {
            subject: subject.into(),
            dispatcher,
        }
    }

    /// Creates a handler whose alerts default to `{name}-{version}-[{profile}]`.
    pub fn from_config(config: &AppConfig, dispatcher: Arc<AlertDispatcher>) -> Self {
        Self::new(config.alert_subject(), dispatcher)
    }

    /// The dispatcher alerts are sent through.
    pub fn dispatcher(&self) -> &Arc<AlertDispatcher> {
        &self.dispatcher
    }

    /// Builds an alert for `error`, lets `customize` adjust it, dispatches it
    /// and returns it.
    ///
    /// The returned alert reports whether it was suppressed.
    pub fn handle_with<E, F>(&self, error: &E, customize: F) -> Alert
    where
        E: Error + ?Sized,
        F: FnOnce(&mut Alert),
    {
        let mut alert = Alert::new(describe_error(error), self.subject.clone());
        customize(&mut alert);
        self.dispatcher.send_alert(&mut alert);
        alert
    }

    /// Reports `error`, filing a ticket only if `by_ticket` is set.
    pub fn handle<E>(&self, error: &E, by_ticket: bool) -> Alert
    where
        E: Error + ?Sized,
    {
        self.handle_with(error, |alert| alert.by_ticket = by_ticket)
    }

    /// Reports `error` with `context` appended to the message as JSON.
    pub fn handle_with_context<E, C>(&self, error: &E, context: &C, by_ticket: bool) -> Alert
    where
        E: Error + ?Sized,
        C: Serialize + ?Sized,
    {
        self.handle_with(error, |alert| {
            alert.by_ticket = by_ticket;
            alert.message.push('\n');
            match serde_json::to_string(context) {
                Ok(json) => alert.message.push_str(&json),
                Err(e) => {
                    let _ = write!(alert.message, "<context unavailable: {e}>");
                }
            }
        })
    }
}

/// Describes an error together with its chain of sources, one per line.
pub fn describe_error<E>(error: &E) -> String
where
    E: Error + ?Sized,
{
    let mut description = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(description, "\nCaused by: {cause}");
        source = cause.source();
    }
    description
}
