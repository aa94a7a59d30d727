use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(
        "No deployment file found\nSearched from: {0}\nHint: create lakeflow.yaml or set LAKE_CONFIG_PATH"
    )]
    DeploymentFileNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
