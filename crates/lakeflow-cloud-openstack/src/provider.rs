//! OpenStack provider implementation

use crate::error::OpenStackError;
use crate::oscli::{
    FlavorRow, FloatingIpDetail, FloatingIpRow, ImageRow, KeypairDetail, KeypairRow,
    NetworkDetail, NetworkRow, OsCli, RouterDetail, RouterRow, SecurityGroupDetail,
    SecurityGroupRow, ServerDetail, ServerRow, SubnetDetail, SubnetRow,
};
use async_trait::async_trait;
use lakeflow_cloud::{
    AuthStatus, CloudError, CloudProvider, CreatedKeypair, FloatingIpInfo, ImageInfo, KeypairInfo,
    NetworkInfo, Result, RouterInfo, RuleOutcome, SecurityGroupInfo, SecurityRule, ServerInfo,
    ServerSpec, SubnetInfo, SubnetSpec,
};
use std::io::Write;

/// Provider-side messages that mark a rule as already present
const DUPLICATE_RULE_MARKERS: &[&str] = &["already exists", "ConflictException", "HTTP 409"];

/// OpenStack provider driving the `openstack` CLI
pub struct OpenStackProvider {
    cli: OsCli,
}

impl OpenStackProvider {
    /// `cloud` names a credential profile (a clouds.yaml entry)
    pub fn new(cloud: impl Into<String>) -> Self {
        Self {
            cli: OsCli::new(cloud),
        }
    }

    /// Smallest flavor offering at least `ram_mb` of RAM
    async fn pick_flavor(&self, ram_mb: u32) -> Result<String> {
        let flavors: Vec<FlavorRow> = self
            .cli
            .run_list(&["flavor", "list", "-f", "json"])
            .await
            .map_err(CloudError::from)?;

        flavors
            .into_iter()
            .filter(|f| f.ram_mb >= ram_mb)
            .min_by_key(|f| f.ram_mb)
            .map(|f| f.name)
            .ok_or(CloudError::FlavorNotFound { ram_mb })
    }

    async fn network_detail(&self, id: &str) -> Result<NetworkDetail> {
        let detail: NetworkDetail = self
            .cli
            .run_json(&["network", "show", id, "-f", "json"])
            .await
            .map_err(CloudError::from)?;
        Ok(detail)
    }

    async fn subnet_detail(&self, id: &str) -> Result<SubnetDetail> {
        let detail: SubnetDetail = self
            .cli
            .run_json(&["subnet", "show", id, "-f", "json"])
            .await
            .map_err(CloudError::from)?;
        Ok(detail)
    }
}

impl From<NetworkDetail> for NetworkInfo {
    fn from(d: NetworkDetail) -> Self {
        Self {
            id: d.id,
            name: d.name,
            is_external: d.is_external,
        }
    }
}

impl From<SubnetDetail> for SubnetInfo {
    fn from(d: SubnetDetail) -> Self {
        Self {
            id: d.id,
            name: d.name,
            network_id: d.network_id,
            cidr: d.cidr,
            gateway_ip: d.gateway_ip,
        }
    }
}

impl From<FloatingIpDetail> for FloatingIpInfo {
    fn from(d: FloatingIpDetail) -> Self {
        Self {
            id: d.id,
            address: d.address,
            fixed_address: d.fixed_address,
            status: d.status,
        }
    }
}

#[async_trait]
impl CloudProvider for OpenStackProvider {
    fn name(&self) -> &str {
        "openstack"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        match self.cli.check_auth().await {
            Ok(token) => {
                let project = token.project_id.unwrap_or_else(|| "unknown".to_string());
                Ok(AuthStatus::ok(format!("project {}", project)))
            }
            Err(OpenStackError::CliNotFound) => Ok(AuthStatus::failed(
                "openstack CLI not found. Please install python-openstackclient",
            )),
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn list_networks(&self, name: &str) -> Result<Vec<NetworkInfo>> {
        let rows: Vec<NetworkRow> = self
            .cli
            .run_list(&["network", "list", "--name", name, "-f", "json"])
            .await
            .map_err(CloudError::from)?;

        let mut networks = Vec::with_capacity(rows.len());
        for row in rows.into_iter().filter(|r| r.name == name) {
            networks.push(self.network_detail(&row.id).await?.into());
        }
        Ok(networks)
    }

    async fn list_images(&self, name: &str) -> Result<Vec<ImageInfo>> {
        let rows: Vec<ImageRow> = self
            .cli
            .run_list(&["image", "list", "--name", name, "-f", "json"])
            .await
            .map_err(CloudError::from)?;

        Ok(rows
            .into_iter()
            .filter(|r| r.name == name)
            .map(|r| ImageInfo {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn list_subnets(&self, name: &str) -> Result<Vec<SubnetInfo>> {
        let rows: Vec<SubnetRow> = self
            .cli
            .run_list(&["subnet", "list", "--name", name, "-f", "json"])
            .await
            .map_err(CloudError::from)?;

        let mut subnets = Vec::with_capacity(rows.len());
        for row in rows.into_iter().filter(|r| r.name == name) {
            subnets.push(self.subnet_detail(&row.id).await?.into());
        }
        Ok(subnets)
    }

    async fn list_routers(&self, name: &str) -> Result<Vec<RouterInfo>> {
        let rows: Vec<RouterRow> = self
            .cli
            .run_list(&["router", "list", "--name", name, "-f", "json"])
            .await
            .map_err(CloudError::from)?;

        Ok(rows
            .into_iter()
            .filter(|r| r.name == name)
            .map(|r| RouterInfo {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn list_security_groups(&self, name: &str) -> Result<Vec<SecurityGroupInfo>> {
        // No server-side name filter for security groups
        let rows: Vec<SecurityGroupRow> = self
            .cli
            .run_list(&["security", "group", "list", "-f", "json"])
            .await
            .map_err(CloudError::from)?;

        Ok(rows
            .into_iter()
            .filter(|r| r.name == name)
            .map(|r| SecurityGroupInfo {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn get_keypair(&self, name: &str) -> Result<Option<KeypairInfo>> {
        let rows: Vec<KeypairRow> = self
            .cli
            .run_list(&["keypair", "list", "-f", "json"])
            .await
            .map_err(CloudError::from)?;

        Ok(rows.into_iter().find(|r| r.name == name).map(|r| KeypairInfo {
            name: r.name,
            fingerprint: r.fingerprint,
        }))
    }

    async fn get_server(&self, name: &str) -> Result<Option<ServerInfo>> {
        // --name is a regex match; filter exact client-side
        let rows: Vec<ServerRow> = self
            .cli
            .run_list(&["server", "list", "--name", name, "-f", "json"])
            .await
            .map_err(CloudError::from)?;

        Ok(rows.into_iter().find(|r| r.name == name).map(|r| ServerInfo {
            addresses: r.addresses(),
            id: r.id,
            name: r.name,
            status: r.status,
        }))
    }

    async fn list_floating_ips(&self) -> Result<Vec<FloatingIpInfo>> {
        let rows: Vec<FloatingIpRow> = self
            .cli
            .run_list(&["floating", "ip", "list", "-f", "json"])
            .await
            .map_err(CloudError::from)?;

        Ok(rows
            .into_iter()
            .map(|r| FloatingIpInfo {
                id: r.id,
                address: r.address,
                fixed_address: r.fixed_address,
                status: r.status,
            })
            .collect())
    }

    async fn create_network(&self, name: &str) -> Result<NetworkInfo> {
        let detail: NetworkDetail = self
            .cli
            .run_json(&["network", "create", name, "-f", "json"])
            .await
            .map_err(CloudError::from)?;
        Ok(detail.into())
    }

    async fn create_subnet(&self, spec: &SubnetSpec) -> Result<SubnetInfo> {
        let mut args: Vec<&str> = vec![
            "subnet",
            "create",
            &spec.name,
            "--network",
            &spec.network,
            "--subnet-range",
            &spec.cidr,
        ];
        if let Some(ref gateway) = spec.gateway {
            args.push("--gateway");
            args.push(gateway);
        }
        args.extend(["-f", "json"]);

        let detail: SubnetDetail = self.cli.run_json(&args).await.map_err(CloudError::from)?;
        Ok(detail.into())
    }

    async fn create_router(
        &self,
        name: &str,
        external_network: &str,
        subnet: &str,
    ) -> Result<RouterInfo> {
        let detail: RouterDetail = self
            .cli
            .run_json(&["router", "create", name, "-f", "json"])
            .await
            .map_err(CloudError::from)?;

        self.cli
            .run(&["router", "set", name, "--external-gateway", external_network])
            .await
            .map_err(CloudError::from)?;
        self.cli
            .run(&["router", "add", "subnet", name, subnet])
            .await
            .map_err(CloudError::from)?;

        Ok(RouterInfo {
            id: detail.id,
            name: detail.name,
        })
    }

    async fn create_security_group(
        &self,
        name: &str,
        description: &str,
    ) -> Result<SecurityGroupInfo> {
        let detail: SecurityGroupDetail = self
            .cli
            .run_json(&[
                "security",
                "group",
                "create",
                name,
                "--description",
                description,
                "-f",
                "json",
            ])
            .await
            .map_err(CloudError::from)?;

        Ok(SecurityGroupInfo {
            id: detail.id,
            name: detail.name,
        })
    }

    async fn add_security_rule(&self, group: &str, rule: &SecurityRule) -> Result<RuleOutcome> {
        let port_arg = rule.port_range.map(|(lo, hi)| format!("{}:{}", lo, hi));

        let mut args: Vec<&str> = vec![
            "security",
            "group",
            "rule",
            "create",
            group,
            "--ingress",
            "--protocol",
            &rule.protocol,
            "--remote-ip",
            &rule.remote_cidr,
        ];
        if let Some(ref ports) = port_arg {
            args.push("--dst-port");
            args.push(ports);
        }
        args.extend(["-f", "json"]);

        match self.cli.run(&args).await {
            Ok(_) => Ok(RuleOutcome::Added),
            Err(OpenStackError::CommandFailed(stderr))
                if DUPLICATE_RULE_MARKERS.iter().any(|m| stderr.contains(m)) =>
            {
                Ok(RuleOutcome::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn generate_keypair(&self, name: &str) -> Result<CreatedKeypair> {
        // A bare `keypair create` prints the one-shot private key to stdout
        let private_key = self
            .cli
            .run(&["keypair", "create", name])
            .await
            .map_err(CloudError::from)?;

        if !private_key.contains("PRIVATE KEY") {
            return Err(CloudError::ApiError(format!(
                "keypair create for '{}' did not return a private key",
                name
            )));
        }

        let public_key = self
            .cli
            .run(&["keypair", "show", name, "--public-key"])
            .await
            .map_err(CloudError::from)?;

        Ok(CreatedKeypair {
            name: name.to_string(),
            public_key: public_key.trim().to_string(),
            private_key,
        })
    }

    async fn import_keypair(&self, name: &str, public_key: &str) -> Result<KeypairInfo> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(public_key.as_bytes())?;
        let path = file.path().to_string_lossy().into_owned();

        let detail: KeypairDetail = self
            .cli
            .run_json(&["keypair", "create", "--public-key", &path, name, "-f", "json"])
            .await
            .map_err(CloudError::from)?;

        Ok(KeypairInfo {
            name: detail.name,
            fingerprint: detail.fingerprint,
        })
    }

    async fn create_server(&self, spec: &ServerSpec) -> Result<ServerInfo> {
        let flavor = self.pick_flavor(spec.ram_mb).await?;
        let volume = spec.volume_gb.to_string();

        // --user-data only accepts a file path
        let user_data_file = match spec.user_data {
            Some(ref data) => {
                let mut file = tempfile::NamedTempFile::new()?;
                file.write_all(data.as_bytes())?;
                Some(file)
            }
            None => None,
        };
        let user_data_path = user_data_file
            .as_ref()
            .map(|f| f.path().to_string_lossy().into_owned());

        let mut args: Vec<&str> = vec![
            "server",
            "create",
            &spec.name,
            "--image",
            &spec.image,
            "--flavor",
            &flavor,
            "--boot-from-volume",
            &volume,
            "--network",
            &spec.network,
            "--security-group",
            &spec.security_group,
            "--key-name",
            &spec.keypair,
            "--wait",
        ];
        if let Some(ref path) = user_data_path {
            args.push("--user-data");
            args.push(path);
        }
        args.extend(["-f", "json"]);

        let detail: ServerDetail = self.cli.run_json(&args).await.map_err(CloudError::from)?;

        Ok(ServerInfo {
            addresses: detail.address_list(),
            id: detail.id,
            name: detail.name,
            status: detail.status,
        })
    }

    async fn allocate_floating_ip(&self, pool: &str) -> Result<FloatingIpInfo> {
        let detail: FloatingIpDetail = self
            .cli
            .run_json(&["floating", "ip", "create", pool, "-f", "json"])
            .await
            .map_err(CloudError::from)?;
        Ok(detail.into())
    }

    async fn attach_floating_ip(&self, server: &str, address: &str) -> Result<()> {
        self.cli
            .run(&["server", "add", "floating", "ip", server, address])
            .await
            .map_err(CloudError::from)?;
        Ok(())
    }
}
