//! Error types for the multimcp core.
//!
//! `McpError` is the request-level taxonomy: every failure a caller can
//! observe through the protocol maps onto one of these variants, and each
//! variant maps onto a fixed JSON-RPC error code. Capability internals
//! report through the boxed `ExecError` alias and are converted at the
//! queue/dispatcher boundary.

use std::time::Duration;

use thiserror::Error;

use crate::protocol::error_codes;

/// Boxed error type for capability (tool/resource) internals.
pub type ExecError = Box<dyn std::error::Error + Send + Sync>;

/// Request-level errors surfaced through the protocol dispatcher.
#[derive(Debug, Error)]
pub enum McpError {
    /// No capability registered under the requested name.
    #[error("capability '{0}' not found")]
    CapabilityNotFound(String),

    /// The capability exists but is not in this tenant's enabled-config map.
    #[error("tool '{0}' is not configured for this client")]
    NotConfiguredForTenant(String),

    /// Required parameter missing or argument validation failed.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The capability ran past the execution timeout.
    #[error("execution timed out after {}s", .0.as_secs())]
    ExecutionTimeout(Duration),

    /// The capability returned an error or panicked.
    #[error("execution failed: {0}")]
    ExecutionFailure(String),

    /// The task queue stayed full past the admission timeout.
    #[error("server busy - too many requests in queue")]
    QueueBusy,

    /// Credential did not resolve to a tenant.
    #[error("invalid API key")]
    InvalidCredential,

    /// Unknown protocol method.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Empty or malformed request body.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Failure in the storage collaborator.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl McpError {
    /// JSON-RPC error code for this variant.
    ///
    /// `NotConfiguredForTenant` deliberately shares the invalid-params code
    /// with `InvalidArguments`; that is the wire behavior existing clients
    /// already depend on.
    pub fn code(&self) -> i64 {
        match self {
            McpError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            McpError::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidArguments(_) | McpError::NotConfiguredForTenant(_) => {
                error_codes::INVALID_PARAMS
            }
            _ => error_codes::INTERNAL_ERROR,
        }
    }
}

/// Errors from the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A generic storage operation error.
    #[error("storage operation error: {message}")]
    OperationError { message: String },

    /// Backend unavailable.
    #[error("storage connection error: {message}")]
    ConnectionError { message: String },
}

impl StorageError {
    pub fn operation(message: impl Into<String>) -> Self {
        Self::OperationError {
            message: message.into(),
        }
    }
}
