//! Cloud provider error types

use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("No {kind} named '{name}' found")]
    ResourceNotFound { kind: &'static str, name: String },

    #[error("{count} {kind}s named '{name}' found, expected exactly one")]
    AmbiguousResource {
        kind: &'static str,
        name: String,
        count: usize,
    },

    #[error("Network '{0}' exists but is not flagged as external")]
    NotExternal(String),

    #[error("No flavor offers at least {ram_mb} MB of RAM")]
    FlavorNotFound { ram_mb: u32 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Cloud API error: {0}")]
    ApiError(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Timed out waiting for {address}:{port} after {waited_secs}s")]
    PortWaitTimeout {
        address: String,
        port: u16,
        waited_secs: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
