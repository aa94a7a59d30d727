//! Cloud provider trait definition

use crate::error::Result;
use crate::types::{
    CreatedKeypair, FloatingIpInfo, ImageInfo, KeypairInfo, NetworkInfo, RouterInfo, RuleOutcome,
    SecurityGroupInfo, SecurityRule, ServerInfo, ServerSpec, SubnetInfo, SubnetSpec,
};
use crate::wait::WaitConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Cloud provider abstraction trait
///
/// The provisioning workflow only ever talks to this interface; the
/// OpenStack implementation lives in `lakeflow-cloud-openstack`, and an
/// in-memory [`mock`](crate::mock) implementation backs the tests.
///
/// Lookup methods return every match so callers can enforce uniqueness
/// themselves; ambiguity is never resolved by picking the first hit.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "openstack")
    fn name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    // --- read-only lookups ---

    /// All networks with the given name
    async fn list_networks(&self, name: &str) -> Result<Vec<NetworkInfo>>;

    /// All images with the given name
    async fn list_images(&self, name: &str) -> Result<Vec<ImageInfo>>;

    /// All subnets with the given name
    async fn list_subnets(&self, name: &str) -> Result<Vec<SubnetInfo>>;

    /// All routers with the given name
    async fn list_routers(&self, name: &str) -> Result<Vec<RouterInfo>>;

    /// All security groups with the given name
    async fn list_security_groups(&self, name: &str) -> Result<Vec<SecurityGroupInfo>>;

    /// Keypair by name, if registered
    async fn get_keypair(&self, name: &str) -> Result<Option<KeypairInfo>>;

    /// Server by name, if one exists
    async fn get_server(&self, name: &str) -> Result<Option<ServerInfo>>;

    /// Every floating IP in the project
    async fn list_floating_ips(&self) -> Result<Vec<FloatingIpInfo>>;

    // --- mutations ---

    /// Create a network
    async fn create_network(&self, name: &str) -> Result<NetworkInfo>;

    /// Create a subnet
    async fn create_subnet(&self, spec: &SubnetSpec) -> Result<SubnetInfo>;

    /// Create a router with an interface on `subnet` and an uplink to
    /// `external_network`
    async fn create_router(
        &self,
        name: &str,
        external_network: &str,
        subnet: &str,
    ) -> Result<RouterInfo>;

    /// Create a security group
    async fn create_security_group(
        &self,
        name: &str,
        description: &str,
    ) -> Result<SecurityGroupInfo>;

    /// Submit an ingress rule; an identical existing rule is not an error
    async fn add_security_rule(&self, group: &str, rule: &SecurityRule) -> Result<RuleOutcome>;

    /// Have the cloud generate a keypair and return the one-shot private key
    async fn generate_keypair(&self, name: &str) -> Result<CreatedKeypair>;

    /// Register an existing public key under the given name
    async fn import_keypair(&self, name: &str, public_key: &str) -> Result<KeypairInfo>;

    /// Boot a volume-backed server
    async fn create_server(&self, spec: &ServerSpec) -> Result<ServerInfo>;

    /// Allocate a fresh floating IP from the given external network
    async fn allocate_floating_ip(&self, pool: &str) -> Result<FloatingIpInfo>;

    /// Bind a floating IP to a server
    async fn attach_floating_ip(&self, server: &str, address: &str) -> Result<()>;

    /// Block until `address:port` accepts TCP connections, or time out
    async fn wait_port_open(&self, address: &str, port: u16, config: &WaitConfig) -> Result<()> {
        crate::wait::wait_for_port(address, port, config).await
    }
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/project information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
