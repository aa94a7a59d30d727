//! Per-host variable file materialization
//!
//! Renders one YAML variable file per host from a tera template, written
//! into the configured host_vars directory under the host's name.

use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tokio::fs;

/// Template used when the deployment does not configure one
const DEFAULT_TEMPLATE: &str = "\
---
ansible_host: {{ address }}
{% if login_user %}ansible_user: {{ login_user }}
{% endif %}";

/// Variables exposed to the template
#[derive(Debug, Clone, Serialize)]
pub struct HostVars {
    pub name: String,
    pub address: String,
    pub login_user: Option<String>,
}

/// Render the variable file for a host and return its path
pub async fn write_host_vars(
    dir: impl AsRef<Path>,
    template: Option<&Path>,
    vars: &HostVars,
) -> Result<PathBuf> {
    let template_str = match template {
        Some(path) => fs::read_to_string(path).await?,
        None => DEFAULT_TEMPLATE.to_string(),
    };

    let mut context = Context::new();
    context.insert("name", &vars.name);
    context.insert("address", &vars.address);
    context.insert("login_user", &vars.login_user);

    let rendered = Tera::one_off(&template_str, &context, false)?;

    let dir = dir.as_ref();
    if !dir.exists() {
        fs::create_dir_all(dir).await?;
    }
    let path = dir.join(format!("{}.yml", vars.name));
    fs::write(&path, rendered).await?;

    tracing::debug!(path = %path.display(), "Wrote host variable file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn default_template_renders_address_and_user() {
        let dir = tempdir().unwrap();
        let vars = HostVars {
            name: "dl-01".to_string(),
            address: "198.51.100.7".to_string(),
            login_user: Some("centos".to_string()),
        };

        let path = write_host_vars(dir.path(), None, &vars).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "dl-01.yml");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("ansible_host: 198.51.100.7"));
        assert!(content.contains("ansible_user: centos"));
    }

    #[tokio::test]
    async fn no_login_user_omits_the_line() {
        let dir = tempdir().unwrap();
        let vars = HostVars {
            name: "dl-01".to_string(),
            address: "198.51.100.7".to_string(),
            login_user: None,
        };

        let path = write_host_vars(dir.path(), None, &vars).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("ansible_user"));
    }

    #[tokio::test]
    async fn custom_template_is_used() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("host.yml.tera");
        std::fs::write(&template, "host: {{ name }} at {{ address }}\n").unwrap();

        let vars = HostVars {
            name: "dl-01".to_string(),
            address: "198.51.100.7".to_string(),
            login_user: None,
        };

        let out = dir.path().join("host_vars");
        let path = write_host_vars(&out, Some(template.as_path()), &vars)
            .await
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "host: dl-01 at 198.51.100.7\n");
    }
}
