//! Per-channel payloads derived from an [`Alert`](super::Alert).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::Alert;

/// A template the email channel renders into the message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    /// Path of the template file.
    pub path: PathBuf,
    /// Data made available to the template.
    pub data: serde_json::Value,
}

/// An alert email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRequest {
    /// Sender address.
    pub from: String,
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Email subject.
    pub subject: String,
    /// Plain-text body, used when there is no template or it fails to render.
    pub body: String,
    /// Optional HTML template for the body.
    pub template: Option<EmailTemplate>,
}

/// An alert report for a ticket system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketPost {
    /// Project the report is filed under.
    pub project: String,
    /// Report text, already truncated to the configured limit.
    pub message: String,
    /// Severity.
    pub level: i32,
    /// Ticket system users to notify.
    pub developer_ids: Vec<i64>,
    /// Optional file uploaded with the report.
    pub attachment: Option<PathBuf>,
}

impl TicketPost {
    /// Builds a report from an alert, keeping at most `message_limit`
    /// characters of its message and only its first attachment.
    pub fn from_alert(alert: &Alert, message_limit: usize, developer_ids: Vec<i64>) -> Self {
        Self {
            project: alert.subject.clone(),
            message: truncate_chars(&alert.message, message_limit),
            level: alert.level,
            developer_ids,
            attachment: alert.attachments.first().cloned(),
        }
    }
}

/// Error object returned by the ticket system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// Machine-readable reason code, e.g. `VALIDATION`.
    #[serde(default)]
    pub reason: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Optional details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Response envelope of the ticket system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TicketResponse {
    /// Result payload of a successful call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error of a failed call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
    /// Server-side processing time.
    #[serde(default, rename = "executionTimeMs")]
    pub execution_time_ms: i64,
}

/// Returns the first `limit` characters of `s`. Never splits a character.
pub fn truncate_chars(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("disk full", 4000), "disk full");
        assert_eq!(truncate_chars("disk full", 4), "disk");
        assert_eq!(truncate_chars("", 4), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_truncate_chars_counts_characters_not_bytes() {
        let message = "ошибка".repeat(1000);
        let truncated = truncate_chars(&message, 4000);
        assert_eq!(truncated.chars().count(), 4000);
        assert!(message.starts_with(&truncated));
    }

    #[test]
    fn test_ticket_post_from_alert() {
        let mut alert = Alert::new("x".repeat(5000), "billing-1.2.0-[prod]");
        alert.level = 3;
        alert.attachments = vec![PathBuf::from("/tmp/a.log"), PathBuf::from("/tmp/b.log")];

        let post = TicketPost::from_alert(&alert, 4000, vec![7]);

        assert_eq!(post.project, "billing-1.2.0-[prod]");
        assert_eq!(post.message.chars().count(), 4000);
        assert_eq!(post.level, 3);
        assert_eq!(post.developer_ids, vec![7]);
        assert_eq!(post.attachment, Some(PathBuf::from("/tmp/a.log")));
    }

    #[test]
    fn test_ticket_response_envelope() {
        let ok: TicketResponse =
            serde_json::from_value(json!({ "result": "42", "executionTimeMs": 5 })).unwrap();
        assert_eq!(ok.result, Some(json!("42")));
        assert!(ok.error.is_none());
        assert_eq!(ok.execution_time_ms, 5);

        let failed: TicketResponse = serde_json::from_value(json!({
            "error": { "reason": "VALIDATION", "message": "project is required" }
        }))
        .unwrap();
        let error = failed.error.unwrap();
        assert_eq!(error.reason, "VALIDATION");
        assert_eq!(error.message, "project is required");
        assert!(error.details.is_none());
    }
}
