//! The provisioning workflow
//!
//! Stage order is fixed: validate → network stack + keypair → instance →
//! readiness gate → inventory. Any failure aborts the remaining stages and
//! leaves partial state in place; every stage is independently resumable on
//! the next run. The inventory is only ever written after the readiness
//! gate has passed.

use crate::error::{ProvisionError, Result};
use crate::instance::{self, ProvisionedHost};
use crate::keypair;
use crate::network;
use crate::preflight::{self, Validated};
use crate::report::ProvisionReport;
use lakeflow_cloud::{CloudError, CloudProvider, WaitConfig};
use lakeflow_core::Deployment;
use lakeflow_inventory::{HostVars, InventoryStore, write_host_vars};
use std::path::PathBuf;
use std::time::Duration;

/// Result of a completed provision run
#[derive(Debug)]
pub struct ProvisionOutcome {
    pub host: ProvisionedHost,
    pub report: ProvisionReport,
    pub inventory_path: PathBuf,
    pub host_vars_path: PathBuf,
}

/// One deployment's provisioning workflow
pub struct Workflow<'a> {
    provider: &'a dyn CloudProvider,
    deployment: &'a Deployment,
}

impl<'a> Workflow<'a> {
    pub fn new(provider: &'a dyn CloudProvider, deployment: &'a Deployment) -> Self {
        Self {
            provider,
            deployment,
        }
    }

    /// Auth check plus the read-only precondition validation
    pub async fn preflight(&self) -> Result<Validated> {
        let auth = self.provider.check_auth().await?;
        if !auth.authenticated {
            return Err(ProvisionError::AuthenticationFailed(
                auth.error.unwrap_or_else(|| "unknown".to_string()),
            ));
        }
        tracing::debug!(
            account = auth.account_info.as_deref().unwrap_or("unknown"),
            "Provider authenticated"
        );

        preflight::validate(
            self.provider,
            &self.deployment.external_network,
            &self.deployment.image,
        )
        .await
    }

    /// Run the whole workflow
    pub async fn run(&self) -> Result<ProvisionOutcome> {
        let deployment = self.deployment;
        let validated = self.preflight().await?;
        let mut report = ProvisionReport::new();

        let stack = network::ensure_network_stack(
            self.provider,
            &deployment.network,
            &deployment.security_group,
            &validated.external_network,
            &mut report,
        )
        .await?;

        keypair::ensure_keypair(self.provider, &deployment.keypair, &mut report).await?;

        let host = instance::ensure_instance(
            self.provider,
            &deployment.instance,
            &deployment.image,
            &stack.network.name,
            &stack.security_group.name,
            &deployment.keypair.name,
            &validated.external_network.name,
            &mut report,
        )
        .await?;

        self.wait_for_host(&host).await?;

        let store = InventoryStore::new(&deployment.inventory.path);
        store
            .upsert_host(&deployment.inventory.section, &host.name, &host.address)
            .await?;

        let vars = HostVars {
            name: host.name.clone(),
            address: host.address.clone(),
            login_user: deployment.instance.login_user.clone(),
        };
        let host_vars_path = write_host_vars(
            &deployment.inventory.host_vars_dir,
            deployment.inventory.template.as_deref(),
            &vars,
        )
        .await?;

        tracing::info!(
            host = %host.name,
            address = %host.address,
            "Provisioning complete, host handed to inventory"
        );

        Ok(ProvisionOutcome {
            host,
            report,
            inventory_path: store.path().to_path_buf(),
            host_vars_path,
        })
    }

    /// Readiness gate: the host is only handed downstream once its
    /// management port accepts connections
    async fn wait_for_host(&self, host: &ProvisionedHost) -> Result<()> {
        let instance = &self.deployment.instance;
        let wait = WaitConfig {
            deadline: Duration::from_secs(instance.wait_timeout_secs),
            ..Default::default()
        };
        tracing::info!(
            address = %host.address,
            port = instance.port,
            timeout_secs = instance.wait_timeout_secs,
            "Waiting for management port"
        );

        self.provider
            .wait_port_open(&host.address, instance.port, &wait)
            .await
            .map_err(|e| match e {
                CloudError::PortWaitTimeout {
                    address,
                    port,
                    waited_secs,
                } => ProvisionError::ReadinessTimeout {
                    address,
                    port,
                    waited_secs,
                },
                other => other.into(),
            })
    }
}
