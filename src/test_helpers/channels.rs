use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    models::{EmailRequest, TicketPost, TicketResponse},
    notification::{EmailChannel, NotificationError, TicketChannel},
};

/// An email channel that records every request it is given.
#[derive(Debug, Default)]
pub struct RecordingEmailChannel {
    sent: Mutex<Vec<EmailRequest>>,
    fail: bool,
}

impl RecordingEmailChannel {
    /// Creates a channel that accepts every email.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a channel that records every email and then fails it.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// The requests received so far.
    pub fn sent(&self) -> Vec<EmailRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailChannel for RecordingEmailChannel {
    async fn send(&self, request: EmailRequest) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(request);
        if self.fail {
            return Err(NotificationError::NotifyFailed("recording channel failure".to_string()));
        }
        Ok(())
    }
}

/// A ticket channel that records every report it is given.
#[derive(Debug, Default)]
pub struct RecordingTicketChannel {
    posted: Mutex<Vec<TicketPost>>,
    fail: bool,
}

impl RecordingTicketChannel {
    /// Creates a channel that accepts every report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a channel that records every report and then fails it.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// The reports received so far.
    pub fn posted(&self) -> Vec<TicketPost> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketChannel for RecordingTicketChannel {
    async fn post_message(&self, post: TicketPost) -> Result<TicketResponse, NotificationError> {
        self.posted.lock().unwrap().push(post);
        if self.fail {
            return Err(NotificationError::Remote {
                reason: "ERRCODE_TECHNICAL".to_string(),
                message: "recording channel failure".to_string(),
            });
        }
        Ok(TicketResponse::default())
    }
}
