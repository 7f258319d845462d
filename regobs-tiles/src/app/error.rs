//! Application error types.

use std::fmt;

use crate::cache::StoreError;
use crate::exclusion::GeometryError;
use crate::provider::{ProviderError, TemplateError};

/// Errors that can occur during application startup.
#[derive(Debug)]
pub enum AppError {
    /// Failed to open the offline store.
    StoreOpen(StoreError),

    /// Failed to create the HTTP client.
    HttpClient(ProviderError),

    /// A layer has an invalid URL template.
    Template { layer: String, source: TemplateError },

    /// A layer's exclusion region could not be loaded.
    Exclusion { layer: String, source: GeometryError },

    /// Configuration error.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StoreOpen(e) => {
                write!(f, "Failed to open offline store: {}", e)
            }
            AppError::HttpClient(e) => {
                write!(f, "Failed to create HTTP client: {}", e)
            }
            AppError::Template { layer, source } => {
                write!(f, "Layer '{}': {}", layer, source)
            }
            AppError::Exclusion { layer, source } => {
                write!(f, "Layer '{}' exclusion: {}", layer, source)
            }
            AppError::Config(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::StoreOpen(e) => Some(e),
            AppError::HttpClient(e) => Some(e),
            AppError::Template { source, .. } => Some(source),
            AppError::Exclusion { source, .. } => Some(source),
            AppError::Config(_) => None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::StoreOpen(e)
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::HttpClient(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config("no layers configured".to_string());
        assert_eq!(err.to_string(), "Configuration error: no layers configured");
    }

    #[test]
    fn test_template_error_names_layer() {
        let err = AppError::Template {
            layer: "topo".to_string(),
            source: TemplateError::Empty,
        };
        assert_eq!(err.to_string(), "Layer 'topo': URL template is empty");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_store_error() {
        let err: AppError = StoreError::Unavailable("locked".to_string()).into();
        assert!(matches!(err, AppError::StoreOpen(_)));
        assert!(err.to_string().contains("locked"));
    }
}
