//! Deployment configuration model
//!
//! Every parameter the provisioning workflow consumes is a typed field
//! here: CIDRs parse into [`ipnet::IpNet`], ports are `u16`, sizes are
//! positive integers. [`Deployment::validate`] enforces the cross-field
//! rules YAML deserialization alone cannot express.

use crate::error::{ConfigError, Result};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// A full deployment description, loaded from `lakeflow.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    /// Cloud credential profile to target (e.g. a clouds.yaml entry)
    pub cloud: String,

    /// Name of the externally routable network (also the floating IP pool)
    pub external_network: String,

    /// Name of the base image to boot from
    pub image: String,

    pub network: NetworkConfig,
    pub security_group: SecurityGroupConfig,
    pub keypair: KeypairConfig,
    pub instance: InstanceConfig,
    pub inventory: InventoryConfig,
}

impl Deployment {
    /// Check the cross-field rules; returns the first violation found
    pub fn validate(&self) -> Result<()> {
        if self.cloud.is_empty() {
            return Err(ConfigError::Invalid("cloud must not be empty".into()));
        }
        if self.external_network.is_empty() {
            return Err(ConfigError::Invalid(
                "external_network must not be empty".into(),
            ));
        }
        if self.image.is_empty() {
            return Err(ConfigError::Invalid("image must not be empty".into()));
        }
        self.network.validate()?;
        self.security_group.validate()?;
        self.instance.validate()?;
        self.inventory.validate()?;
        Ok(())
    }
}

/// Private network addressing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,

    /// Subnet CIDR
    pub cidr: IpNet,

    /// Subnet gateway; must fall inside `cidr` when given
    pub gateway: Option<IpAddr>,
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("network.name must not be empty".into()));
        }
        if let Some(gateway) = self.gateway {
            if !self.cidr.contains(&gateway) {
                return Err(ConfigError::Invalid(format!(
                    "network.gateway {} is outside network.cidr {}",
                    gateway, self.cidr
                )));
            }
        }
        Ok(())
    }

    /// Derived subnet name
    pub fn subnet_name(&self) -> String {
        format!("{}_subnet", self.name)
    }

    /// Derived router name
    pub fn router_name(&self) -> String {
        format!("{}_router", self.name)
    }
}

/// Security group and its declared ingress rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroupConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl SecurityGroupConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::Invalid(
                "security_group.name must not be empty".into(),
            ));
        }
        for (i, rule) in self.rules.iter().enumerate() {
            rule.validate()
                .map_err(|e| ConfigError::Invalid(format!("security_group.rules[{}]: {}", i, e)))?;
        }
        Ok(())
    }
}

/// A single declared ingress rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub protocol: Protocol,

    /// Inclusive lower port bound; required for tcp/udp
    #[serde(default)]
    pub port_min: Option<u16>,

    /// Inclusive upper port bound; defaults to `port_min`
    #[serde(default)]
    pub port_max: Option<u16>,

    /// Source CIDR the rule admits
    pub cidr: IpNet,
}

impl RuleConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        match self.protocol {
            Protocol::Tcp | Protocol::Udp => {
                let min = self
                    .port_min
                    .ok_or_else(|| format!("port_min is required for {}", self.protocol))?;
                let max = self.port_max.unwrap_or(min);
                if max < min {
                    return Err(format!("port_max {} is below port_min {}", max, min));
                }
            }
            Protocol::Icmp => {
                if self.port_min.is_some() || self.port_max.is_some() {
                    return Err("icmp rules take no port range".to_string());
                }
            }
        }
        Ok(())
    }

    /// Effective inclusive port range, if the protocol has one
    pub fn port_range(&self) -> Option<(u16, u16)> {
        self.port_min.map(|min| (min, self.port_max.unwrap_or(min)))
    }
}

/// IP protocol of an ingress rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Icmp => write!(f, "icmp"),
        }
    }
}

/// SSH keypair naming and on-disk locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeypairConfig {
    pub name: String,

    /// Local public key path; if present, the key is imported instead of
    /// generated
    pub public_key: PathBuf,

    /// Where a freshly generated private key is persisted
    pub private_key: PathBuf,
}

/// Instance sizing and readiness settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub name: String,

    /// Minimum RAM in MB; the smallest flavor at or above this is chosen
    pub ram_mb: u32,

    /// Boot volume size in GB
    pub volume_gb: u32,

    /// Default OS login account, set via cloud-init when present
    #[serde(default)]
    pub login_user: Option<String>,

    /// Management port the readiness gate probes
    #[serde(default = "default_port")]
    pub port: u16,

    /// Overall readiness deadline in seconds
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
}

fn default_port() -> u16 {
    22
}

fn default_wait_timeout() -> u64 {
    300
}

impl InstanceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("instance.name must not be empty".into()));
        }
        if self.ram_mb == 0 {
            return Err(ConfigError::Invalid("instance.ram_mb must be positive".into()));
        }
        if self.volume_gb == 0 {
            return Err(ConfigError::Invalid(
                "instance.volume_gb must be positive".into(),
            ));
        }
        if self.wait_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "instance.wait_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Inventory hand-off settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// INI inventory file to upsert into
    pub path: PathBuf,

    /// Section (group) the host is registered under
    pub section: String,

    /// Directory the per-host variable file is written into
    pub host_vars_dir: PathBuf,

    /// Optional tera template for the host variable file
    #[serde(default)]
    pub template: Option<PathBuf>,
}

impl InventoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.section.is_empty() {
            return Err(ConfigError::Invalid(
                "inventory.section must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Deployment {
        serde_yaml::from_str(include_str!("../tests/fixtures/dlaas.yaml")).unwrap()
    }

    #[test]
    fn sample_parses_and_validates() {
        let deployment = sample();
        deployment.validate().unwrap();
        assert_eq!(deployment.network.name, "dlaas_private");
        assert_eq!(deployment.security_group.rules.len(), 5);
        assert_eq!(deployment.instance.ram_mb, 30000);
        assert_eq!(deployment.instance.port, 22);
    }

    #[test]
    fn gateway_outside_cidr_is_rejected() {
        let mut deployment = sample();
        deployment.network.gateway = Some("10.9.9.9".parse().unwrap());
        let err = deployment.validate().unwrap_err();
        assert!(err.to_string().contains("outside network.cidr"));
    }

    #[test]
    fn tcp_rule_requires_ports() {
        let mut deployment = sample();
        deployment.security_group.rules[0].port_min = None;
        deployment.security_group.rules[0].port_max = None;
        assert!(deployment.validate().is_err());
    }

    #[test]
    fn inverted_port_range_is_rejected() {
        let mut deployment = sample();
        deployment.security_group.rules[0].port_min = Some(443);
        deployment.security_group.rules[0].port_max = Some(80);
        assert!(deployment.validate().is_err());
    }

    #[test]
    fn zero_ram_is_rejected() {
        let mut deployment = sample();
        deployment.instance.ram_mb = 0;
        assert!(deployment.validate().is_err());
    }

    #[test]
    fn derived_names() {
        let deployment = sample();
        assert_eq!(deployment.network.subnet_name(), "dlaas_private_subnet");
        assert_eq!(deployment.network.router_name(), "dlaas_private_router");
    }
}
