//! openstack CLI wrapper
//!
//! Wraps the `openstack` CLI (python-openstackclient) with JSON output.
//! List commands return title-case column keys ("ID", "Name"); show/create
//! commands return lowercase attribute keys. The row types below carry the
//! serde renames for whichever shape each command emits.

use crate::error::{OpenStackError, Result};
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;

/// openstack CLI wrapper bound to one credential profile
pub struct OsCli {
    cloud: String,
}

impl OsCli {
    pub fn new(cloud: impl Into<String>) -> Self {
        Self {
            cloud: cloud.into(),
        }
    }

    /// Check the CLI is installed and the profile can issue a token
    pub async fn check_auth(&self) -> Result<TokenInfo> {
        let which = Command::new("which").arg("openstack").output().await?;
        if !which.status.success() {
            return Err(OpenStackError::CliNotFound);
        }

        let output = self
            .run(&["token", "issue", "-f", "json"])
            .await
            .map_err(|e| OpenStackError::AuthenticationFailed(e.to_string()))?;

        let token: TokenInfo = serde_json::from_str(&output)?;
        Ok(token)
    }

    /// Run an openstack command and return stdout
    pub async fn run(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("openstack");
        cmd.arg("--os-cloud").arg(&self.cloud);
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(
            "Running: openstack --os-cloud {} {}",
            self.cloud,
            args.join(" ")
        );

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OpenStackError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a command and parse its JSON stdout
    pub async fn run_json<T: serde::de::DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let output = self.run(args).await?;
        let parsed = serde_json::from_str(output.trim())?;
        Ok(parsed)
    }

    /// Run a list command, tolerating empty output
    pub async fn run_list<T: serde::de::DeserializeOwned>(&self, args: &[&str]) -> Result<Vec<T>> {
        let output = self.run(args).await?;
        let trimmed = output.trim();
        if trimmed.is_empty() || trimmed == "[]" {
            return Ok(Vec::new());
        }
        let rows: Vec<T> = serde_json::from_str(trimmed)?;
        Ok(rows)
    }
}

/// `token issue` output
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// `network list` row
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// `network show` / `network create` output
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkDetail {
    pub id: String,
    pub name: String,
    #[serde(rename = "router:external", default)]
    pub is_external: bool,
}

/// `image list` row
#[derive(Debug, Clone, Deserialize)]
pub struct ImageRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// `subnet list` row
#[derive(Debug, Clone, Deserialize)]
pub struct SubnetRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// `subnet show` / `subnet create` output
#[derive(Debug, Clone, Deserialize)]
pub struct SubnetDetail {
    pub id: String,
    pub name: String,
    pub network_id: String,
    pub cidr: String,
    #[serde(default)]
    pub gateway_ip: Option<String>,
}

/// `router list` row
#[derive(Debug, Clone, Deserialize)]
pub struct RouterRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// `router create` output
#[derive(Debug, Clone, Deserialize)]
pub struct RouterDetail {
    pub id: String,
    pub name: String,
}

/// `security group list` row
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityGroupRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

/// `security group create` output
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityGroupDetail {
    pub id: String,
    pub name: String,
}

/// `keypair list` row
#[derive(Debug, Clone, Deserialize)]
pub struct KeypairRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Fingerprint", default)]
    pub fingerprint: Option<String>,
}

/// `keypair create --public-key` output
#[derive(Debug, Clone, Deserialize)]
pub struct KeypairDetail {
    pub name: String,
    #[serde(default)]
    pub fingerprint: Option<String>,
}

/// `server list` row
#[derive(Debug, Clone, Deserialize)]
pub struct ServerRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Status")]
    pub status: String,
    /// Map of network name to addresses, or a preformatted string on older
    /// client versions
    #[serde(rename = "Networks", default)]
    pub networks: serde_json::Value,
}

impl ServerRow {
    /// Every address bound to the server, across all networks
    pub fn addresses(&self) -> Vec<String> {
        flatten_addresses(&self.networks)
    }
}

/// `server create` output
#[derive(Debug, Clone, Deserialize)]
pub struct ServerDetail {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub addresses: serde_json::Value,
}

impl ServerDetail {
    pub fn address_list(&self) -> Vec<String> {
        flatten_addresses(&self.addresses)
    }
}

/// Pull the plain addresses out of the Networks/addresses value, which is
/// either `{"net": ["ip", ...]}` or a `"net=ip, ip"` string
fn flatten_addresses(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Object(map) => map
            .values()
            .filter_map(|v| v.as_array())
            .flatten()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        serde_json::Value::String(s) => s
            .split(|c| c == ';' || c == ',')
            .filter_map(|part| part.trim().rsplit('=').next())
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// `flavor list` row
#[derive(Debug, Clone, Deserialize)]
pub struct FlavorRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "RAM")]
    pub ram_mb: u32,
}

/// `floating ip list` row
#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIpRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Floating IP Address")]
    pub address: String,
    #[serde(rename = "Fixed IP Address", default)]
    pub fixed_address: Option<String>,
    #[serde(rename = "Status", default = "unknown_status")]
    pub status: String,
}

/// `floating ip create` output
#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIpDetail {
    pub id: String,
    #[serde(rename = "floating_ip_address")]
    pub address: String,
    #[serde(rename = "fixed_ip_address", default)]
    pub fixed_address: Option<String>,
    #[serde(default = "unknown_status")]
    pub status: String,
}

fn unknown_status() -> String {
    "DOWN".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_rows_parse_title_case_keys() {
        let json = r#"[{"ID": "abc", "Name": "ext-net"}]"#;
        let rows: Vec<NetworkRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].id, "abc");
        assert_eq!(rows[0].name, "ext-net");
    }

    #[test]
    fn network_detail_parses_external_flag() {
        let json = r#"{"id": "abc", "name": "ext-net", "router:external": true}"#;
        let detail: NetworkDetail = serde_json::from_str(json).unwrap();
        assert!(detail.is_external);

        // Flag absent defaults to not-external
        let json = r#"{"id": "abc", "name": "private"}"#;
        let detail: NetworkDetail = serde_json::from_str(json).unwrap();
        assert!(!detail.is_external);
    }

    #[test]
    fn server_addresses_flatten_both_shapes() {
        let map = serde_json::json!({"dlaas_private": ["192.168.0.5", "203.0.113.7"]});
        assert_eq!(
            flatten_addresses(&map),
            vec!["192.168.0.5", "203.0.113.7"]
        );

        let string = serde_json::json!("dlaas_private=192.168.0.5, 203.0.113.7");
        assert_eq!(
            flatten_addresses(&string),
            vec!["192.168.0.5", "203.0.113.7"]
        );
    }

    #[test]
    fn floating_ip_row_tolerates_missing_status() {
        let json = r#"[{"ID": "f1", "Floating IP Address": "203.0.113.5",
                        "Fixed IP Address": null}]"#;
        let rows: Vec<FloatingIpRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].status, "DOWN");
        assert!(rows[0].fixed_address.is_none());
    }
}
