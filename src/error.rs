//! Render error types.

use thiserror::Error;

/// Errors that can occur in the rendering subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Failed to initialize the graphics system.
    #[error("initialization failed: {0}")]
    InitializationFailed(String),
    /// Failed to create a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// A requested feature is not supported.
    #[error("feature not supported: {0}")]
    FeatureNotSupported(String),
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A named resource was not found.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
