//! Value types for cloud resources
//!
//! These are the provider-neutral shapes exchanged between the workflow and
//! a [`CloudProvider`](crate::provider::CloudProvider) implementation.

use serde::{Deserialize, Serialize};

/// A layer-2 network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub id: String,
    pub name: String,
    /// Whether the network is externally routable (`router:external`)
    pub is_external: bool,
}

/// A bootable image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: String,
    pub name: String,
}

/// A subnet under a network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetInfo {
    pub id: String,
    pub name: String,
    pub network_id: String,
    pub cidr: String,
    pub gateway_ip: Option<String>,
}

/// Request to create a subnet
#[derive(Debug, Clone)]
pub struct SubnetSpec {
    pub name: String,
    pub network: String,
    pub cidr: String,
    pub gateway: Option<String>,
}

/// A router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterInfo {
    pub id: String,
    pub name: String,
}

/// A security group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroupInfo {
    pub id: String,
    pub name: String,
}

/// A single ingress rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRule {
    /// "tcp", "udp" or "icmp"
    pub protocol: String,
    /// Inclusive port range; `None` for protocols without ports (icmp)
    pub port_range: Option<(u16, u16)>,
    /// Source CIDR the rule admits
    pub remote_cidr: String,
}

impl SecurityRule {
    pub fn tcp(port: u16, remote_cidr: impl Into<String>) -> Self {
        Self {
            protocol: "tcp".to_string(),
            port_range: Some((port, port)),
            remote_cidr: remote_cidr.into(),
        }
    }
}

impl std::fmt::Display for SecurityRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.port_range {
            Some((lo, hi)) if lo == hi => {
                write!(f, "{}/{} from {}", self.protocol, lo, self.remote_cidr)
            }
            Some((lo, hi)) => {
                write!(f, "{}/{}-{} from {}", self.protocol, lo, hi, self.remote_cidr)
            }
            None => write!(f, "{} from {}", self.protocol, self.remote_cidr),
        }
    }
}

/// Outcome of submitting a rule to a security group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Rule was added
    Added,
    /// Provider reported an identical rule already in place
    Duplicate,
}

/// A keypair known to the cloud
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeypairInfo {
    pub name: String,
    pub fingerprint: Option<String>,
}

/// A keypair freshly generated by the cloud
///
/// The private key is returned by the provider exactly once; the caller is
/// responsible for persisting it immediately.
#[derive(Debug, Clone)]
pub struct CreatedKeypair {
    pub name: String,
    pub public_key: String,
    pub private_key: String,
}

/// Request to create a volume-backed server
#[derive(Debug, Clone)]
pub struct ServerSpec {
    pub name: String,
    pub image: String,
    /// Minimum RAM; the provider selects the smallest matching flavor
    pub ram_mb: u32,
    /// Boot volume size in GB
    pub volume_gb: u32,
    pub network: String,
    pub security_group: String,
    pub keypair: String,
    /// Optional cloud-init user data
    pub user_data: Option<String>,
}

/// A compute instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: String,
    pub name: String,
    pub status: String,
    /// Every address bound to the instance, fixed and floating
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl ServerInfo {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

/// A floating (public) IP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingIpInfo {
    pub id: String,
    pub address: String,
    /// Fixed address the IP is bound to, if any
    pub fixed_address: Option<String>,
    pub status: String,
}

impl FloatingIpInfo {
    /// An IP is reusable when it is not bound to any port
    pub fn is_unattached(&self) -> bool {
        self.fixed_address.is_none() && self.status.eq_ignore_ascii_case("down")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_display() {
        assert_eq!(
            SecurityRule::tcp(22, "0.0.0.0/0").to_string(),
            "tcp/22 from 0.0.0.0/0"
        );
        let range = SecurityRule {
            protocol: "tcp".to_string(),
            port_range: Some((8000, 8100)),
            remote_cidr: "10.0.0.0/8".to_string(),
        };
        assert_eq!(range.to_string(), "tcp/8000-8100 from 10.0.0.0/8");
    }

    #[test]
    fn floating_ip_unattached() {
        let free = FloatingIpInfo {
            id: "1".into(),
            address: "198.51.100.7".into(),
            fixed_address: None,
            status: "DOWN".into(),
        };
        let bound = FloatingIpInfo {
            id: "2".into(),
            address: "198.51.100.8".into(),
            fixed_address: Some("192.168.0.5".into()),
            status: "ACTIVE".into(),
        };
        assert!(free.is_unattached());
        assert!(!bound.is_unattached());
    }
}
