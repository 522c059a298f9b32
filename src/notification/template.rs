//! This module provides a service for rendering email templates using the
//! minijinja templating engine.

use std::path::Path;

use minijinja::Environment;
use thiserror::Error;

/// A service for rendering templates using the minijinja templating engine.
pub struct TemplateService {
    env: Environment<'static>,
}

/// Error type for the TemplateService.
#[derive(Debug, Error)]
pub enum TemplateServiceError {
    /// The template file could not be read.
    #[error("Failed to read template {path}: {source}")]
    ReadError {
        /// Path of the template file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An error occurred while rendering the template.
    #[error("Failed to render template")]
    RenderError(#[from] minijinja::Error),
}

impl Default for TemplateService {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateService {
    /// Creates a new instance of `TemplateService`. Undefined variables are
    /// rendering errors.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);

        Self { env }
    }

    /// Renders a template source with the given context.
    ///
    /// `name` selects auto-escaping: names ending in `.html` are HTML-escaped.
    pub fn render(
        &self,
        name: &str,
        source: &str,
        context: &serde_json::Value,
    ) -> Result<String, TemplateServiceError> {
        tracing::debug!(template = name, context = %context, "Rendering template with context.");

        match self.env.render_named_str(name, source, context) {
            Ok(rendered) => Ok(rendered),
            Err(e) => {
                tracing::warn!("Failed to render template '{}': {}", name, e);
                Err(TemplateServiceError::RenderError(e))
            }
        }
    }

    /// Reads a template file and renders it with the given context.
    pub async fn render_file(
        &self,
        path: &Path,
        context: &serde_json::Value,
    ) -> Result<String, TemplateServiceError> {
        let source = tokio::fs::read_to_string(path).await.map_err(|source| {
            TemplateServiceError::ReadError {
                path: path.display().to_string(),
                source,
            }
        })?;
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("template");
        self.render(name, &source, context)
    }
}
