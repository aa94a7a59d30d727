//! Deployment file discovery
//!
//! Search order:
//! 1. `LAKE_CONFIG_PATH` environment variable (direct path)
//! 2. Working directory: `lakeflow.yaml`, `.lakeflow.yaml`, `lakeflow.yml`
//! 3. `./.lakeflow/` with the same candidate names

use crate::error::{ConfigError, Result};
use std::path::PathBuf;

const CANDIDATES: &[&str] = &["lakeflow.yaml", ".lakeflow.yaml", "lakeflow.yml"];

/// Find the deployment file for the current working directory
pub fn find_deployment_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var("LAKE_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    for filename in CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let lake_dir = current_dir.join(".lakeflow");
    if lake_dir.is_dir() {
        for filename in CANDIDATES {
            let path = lake_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    Err(ConfigError::DeploymentFileNotFound(current_dir))
}
