//! SMTP email channel.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::{
    config::EmailConfig,
    models::EmailRequest,
    notification::{error::NotificationError, template::TemplateService, traits::EmailChannel},
};

/// The body of an outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    /// Rendered HTML template.
    Html(String),
    /// Raw message.
    Text(String),
}

/// Renders the request's template, falling back to its plain-text body when
/// there is no template or rendering fails.
pub async fn render_body(request: &EmailRequest, templates: &TemplateService) -> EmailBody {
    let Some(template) = &request.template else {
        return EmailBody::Text(request.body.clone());
    };

    match templates.render_file(&template.path, &template.data).await {
        Ok(html) => EmailBody::Html(html),
        Err(e) => {
            tracing::warn!(
                template = %template.path.display(),
                error = %e,
                "Email template failed to render, sending plain text."
            );
            EmailBody::Text(request.body.clone())
        }
    }
}

/// Builds the MIME message for a request.
pub async fn build_message(
    request: &EmailRequest,
    templates: &TemplateService,
) -> Result<Message, NotificationError> {
    if request.to.is_empty() {
        return Err(NotificationError::ConfigError("No email recipients configured".to_string()));
    }

    let from: Mailbox = request
        .from
        .parse()
        .map_err(|e| NotificationError::EmailError(format!("Invalid from address: {e}")))?;

    let mut builder = Message::builder().from(from).subject(request.subject.clone());
    for to in &request.to {
        let mailbox: Mailbox = to
            .parse()
            .map_err(|e| NotificationError::EmailError(format!("Invalid to address {to}: {e}")))?;
        builder = builder.to(mailbox);
    }

    let (content_type, body) = match render_body(request, templates).await {
        EmailBody::Html(html) => (ContentType::TEXT_HTML, html),
        EmailBody::Text(text) => (ContentType::TEXT_PLAIN, text),
    };

    builder
        .header(content_type)
        .body(body)
        .map_err(|e| NotificationError::EmailError(format!("Failed to build email: {e}")))
}

/// An [`EmailChannel`] sending through an SMTP relay.
pub struct SmtpEmailChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    templates: Arc<TemplateService>,
}

impl SmtpEmailChannel {
    /// Creates a channel for the configured relay. No connection is opened
    /// until the first email is sent.
    pub fn new(
        config: &EmailConfig,
        templates: Arc<TemplateService>,
    ) -> Result<Self, NotificationError> {
        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host).map_err(|e| {
                NotificationError::ConfigError(format!("Failed to create SMTP transport: {e}"))
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder.port(config.port);
        if !config.username.is_empty() {
            builder = builder
                .credentials(Credentials::new(config.username.clone(), config.password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            templates,
        })
    }
}

#[async_trait]
impl EmailChannel for SmtpEmailChannel {
    async fn send(&self, request: EmailRequest) -> Result<(), NotificationError> {
        let message = build_message(&request, &self.templates).await?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::EmailError(format!("Failed to send email: {e}")))?;

        tracing::debug!(
            subject = %request.subject,
            recipients = request.to.len(),
            "Alert email sent."
        );
        Ok(())
    }
}
