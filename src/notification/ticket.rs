//! HTTP ticket channel.
//!
//! Reports are posted as `multipart/form-data` to `{url}/postMsg` with the
//! fields `msg`, `project`, `level`, `ids` and an optional `attachment` file.
//! The ticket system answers with a JSON envelope holding either a `result`
//! or an `error` object.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use url::Url;

use crate::{
    models::{TicketPost, TicketResponse},
    notification::{error::NotificationError, traits::TicketChannel},
};

/// A [`TicketChannel`] backed by the ticket system's HTTP API.
pub struct HttpTicketChannel {
    name: String,
    endpoint: String,
    client: Arc<Client>,
}

impl HttpTicketChannel {
    /// Creates a channel posting to `{url}/postMsg`.
    pub fn new(name: impl Into<String>, url: &Url, client: Arc<Client>) -> Self {
        let endpoint = format!("{}/postMsg", url.as_str().trim_end_matches('/'));
        Self {
            name: name.into(),
            endpoint,
            client,
        }
    }

    async fn build_form(post: &TicketPost) -> Result<Form, NotificationError> {
        let ids = post.developer_ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");

        let mut form = Form::new()
            .text("msg", post.message.clone())
            .text("project", post.project.clone())
            .text("level", post.level.to_string())
            .text("ids", ids);

        if let Some(path) = &post.attachment {
            let bytes = tokio::fs::read(path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            form = form.part("attachment", Part::bytes(bytes).file_name(file_name));
        }

        Ok(form)
    }
}

#[async_trait]
impl TicketChannel for HttpTicketChannel {
    async fn post_message(&self, post: TicketPost) -> Result<TicketResponse, NotificationError> {
        let form = Self::build_form(&post).await?;

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(NotificationError::NotifyFailed(format!(
                "Ticket target '{}' responded with status: {status}",
                self.name
            )));
        }

        let envelope = match serde_json::from_str::<TicketResponse>(&body) {
            Ok(envelope) => envelope,
            // Not every deployment wraps its answer in the envelope.
            Err(_) => TicketResponse {
                result: Some(serde_json::Value::String(body)),
                ..Default::default()
            },
        };

        if let Some(error) = envelope.error {
            return Err(NotificationError::Remote {
                reason: error.reason,
                message: error.message,
            });
        }

        tracing::debug!(target_name = %self.name, project = %post.project, "Ticket report posted.");
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = Arc::new(Client::new());
        let with_slash_url = Url::parse("http://fr.example.com/api/").unwrap();
        let without_slash_url = Url::parse("http://fr.example.com/api").unwrap();
        let with_slash = HttpTicketChannel::new("t", &with_slash_url, client.clone());
        let without_slash = HttpTicketChannel::new("t", &without_slash_url, client);

        assert_eq!(with_slash.endpoint, "http://fr.example.com/api/postMsg");
        assert_eq!(without_slash.endpoint, "http://fr.example.com/api/postMsg");
    }

    #[tokio::test]
    async fn test_missing_attachment_fails_before_sending() {
        let post = TicketPost {
            project: "billing".to_string(),
            message: "disk full".to_string(),
            level: 1,
            developer_ids: vec![],
            attachment: Some("/nonexistent/report.log".into()),
        };

        let result = HttpTicketChannel::build_form(&post).await;
        assert!(matches!(result, Err(NotificationError::AttachmentError(_))));
    }
}
