//! OpenStack provider error types

use lakeflow_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("openstack CLI not found. Please install python-openstackclient")]
    CliNotFound,

    #[error("openstack authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("openstack command failed: {0}")]
    CommandFailed(String),

    #[error("Unexpected CLI output: {0}")]
    UnexpectedOutput(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<OpenStackError> for CloudError {
    fn from(e: OpenStackError) -> Self {
        match e {
            OpenStackError::CliNotFound => {
                CloudError::CommandFailed("openstack CLI not found".to_string())
            }
            OpenStackError::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            OpenStackError::CommandFailed(msg) => CloudError::CommandFailed(msg),
            OpenStackError::UnexpectedOutput(msg) => CloudError::ApiError(msg),
            OpenStackError::Json(e) => CloudError::Json(e),
            OpenStackError::Io(e) => CloudError::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, OpenStackError>;
