//! Deployment file loading

use crate::error::Result;
use crate::model::Deployment;
use std::path::Path;

/// Load and validate a deployment file
pub fn load_deployment(path: impl AsRef<Path>) -> Result<Deployment> {
    let path = path.as_ref();
    tracing::debug!("Loading deployment file: {}", path.display());

    let content = std::fs::read_to_string(path)?;
    let deployment: Deployment = serde_yaml::from_str(&content)?;
    deployment.validate()?;

    Ok(deployment)
}
