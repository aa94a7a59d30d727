//! Instance provisioning and floating IP binding
//!
//! Ensures the volume-backed instance exists (an existing instance with the
//! right name is a no-op), then binds a floating IP. Reuse is preferred over
//! allocation: an IP already bound to the instance wins, then any unattached
//! IP, and only then is a fresh one allocated from the pool.

use crate::error::Result;
use crate::report::{Ensured, ProvisionReport};
use lakeflow_cloud::{CloudProvider, ServerInfo, ServerSpec};
use lakeflow_core::InstanceConfig;

/// The hand-off value for all downstream stages
#[derive(Debug, Clone)]
pub struct ProvisionedHost {
    pub name: String,
    pub address: String,
}

/// Ensure the instance is up and publicly addressable
pub async fn ensure_instance(
    provider: &dyn CloudProvider,
    config: &InstanceConfig,
    image: &str,
    network: &str,
    security_group: &str,
    keypair: &str,
    pool: &str,
    report: &mut ProvisionReport,
) -> Result<ProvisionedHost> {
    let server = ensure_server(provider, config, image, network, security_group, keypair, report)
        .await?;
    let address = ensure_floating_ip(provider, &server, pool, report).await?;

    Ok(ProvisionedHost {
        name: server.name,
        address,
    })
}

async fn ensure_server(
    provider: &dyn CloudProvider,
    config: &InstanceConfig,
    image: &str,
    network: &str,
    security_group: &str,
    keypair: &str,
    report: &mut ProvisionReport,
) -> Result<ServerInfo> {
    if let Some(existing) = provider.get_server(&config.name).await? {
        report.add("instance", &config.name, Ensured::Reused);
        return Ok(existing);
    }

    let spec = ServerSpec {
        name: config.name.clone(),
        image: image.to_string(),
        ram_mb: config.ram_mb,
        volume_gb: config.volume_gb,
        network: network.to_string(),
        security_group: security_group.to_string(),
        keypair: keypair.to_string(),
        user_data: config.login_user.as_deref().map(login_user_data),
    };
    let server = provider.create_server(&spec).await?;
    report.add("instance", &config.name, Ensured::Created);
    Ok(server)
}

/// cloud-init payload that sets the default OS login account
fn login_user_data(user: &str) -> String {
    format!(
        "#cloud-config\nsystem_info:\n  default_user:\n    name: {}\n",
        user
    )
}

async fn ensure_floating_ip(
    provider: &dyn CloudProvider,
    server: &ServerInfo,
    pool: &str,
    report: &mut ProvisionReport,
) -> Result<String> {
    let floating_ips = provider.list_floating_ips().await?;

    // Already bound to this instance
    if let Some(bound) = floating_ips
        .iter()
        .find(|f| server.addresses.contains(&f.address))
    {
        report.add("floating ip", &bound.address, Ensured::Reused);
        return Ok(bound.address.clone());
    }

    // Reuse an unattached IP before allocating a fresh one
    let ip = match floating_ips.into_iter().find(|f| f.is_unattached()) {
        Some(free) => {
            report.add("floating ip", &free.address, Ensured::Reused);
            free
        }
        None => {
            let fresh = provider.allocate_floating_ip(pool).await?;
            report.add("floating ip", &fresh.address, Ensured::Created);
            fresh
        }
    };

    provider.attach_floating_ip(&server.name, &ip.address).await?;
    tracing::info!(server = %server.name, address = %ip.address, "Floating IP bound");
    Ok(ip.address)
}
