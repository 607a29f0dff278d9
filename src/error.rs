use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.hosts", "options.headers")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_config", "request_builder")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the search client.
///
/// Host-level failures (5xx, timeouts, network errors) are absorbed by the
/// failover loop; callers only ever see a terminal [`Error::Api`], an
/// [`Error::Unreachable`] once every host has been tried, or a local error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unreachable hosts: {}", .last_error.as_deref().unwrap_or("no host answered"))]
    Unreachable { last_error: Option<String> },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// HTTP status of a terminal API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Error::Unreachable { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_rendered_in_display() {
        let err = Error::configuration_with_context(
            "application id is empty",
            ErrorContext::new()
                .with_field_path("config.app_id")
                .with_source("client_config"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: application id is empty (field: config.app_id, source: client_config)"
        );
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("config.app_id")
        );
    }

    #[test]
    fn test_unreachable_display() {
        let err = Error::Unreachable {
            last_error: Some("connection refused".into()),
        };
        assert_eq!(err.to_string(), "Unreachable hosts: connection refused");
        assert!(err.is_unreachable());

        let err = Error::Unreachable { last_error: None };
        assert_eq!(err.to_string(), "Unreachable hosts: no host answered");
    }

    #[test]
    fn test_api_error_status() {
        let err = Error::Api {
            status: 404,
            message: "Index does not exist".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_unreachable());
        assert_eq!(err.to_string(), "API error: HTTP 404: Index does not exist");
    }
}
