//! Network stack provisioning
//!
//! Ensures network, subnet, router, and security group exist, in that
//! order. Each step is create-if-absent: an existing resource with the
//! right name is returned unchanged, more than one match is a hard failure.
//! Declared ingress rules are appended afterwards; rules removed from the
//! configuration are never pruned.

use crate::error::Result;
use crate::report::{Ensured, ProvisionReport};
use lakeflow_cloud::{
    CloudError, CloudProvider, NetworkInfo, RouterInfo, RuleOutcome, SecurityGroupInfo,
    SecurityRule, SubnetInfo, SubnetSpec,
};
use lakeflow_core::{NetworkConfig, RuleConfig, SecurityGroupConfig};

/// The ensured network-side resources
#[derive(Debug, Clone)]
pub struct NetworkStack {
    pub network: NetworkInfo,
    pub subnet: SubnetInfo,
    pub router: RouterInfo,
    pub security_group: SecurityGroupInfo,
}

/// Exactly-one-or-none lookup; more than one match is fatal
fn unique<T>(mut matches: Vec<T>, kind: &'static str, name: &str) -> Result<Option<T>> {
    match matches.len() {
        0 => Ok(None),
        1 => Ok(Some(matches.remove(0))),
        count => Err(CloudError::AmbiguousResource {
            kind,
            name: name.to_string(),
            count,
        }
        .into()),
    }
}

/// Declared rule to the provider-neutral shape
fn to_security_rule(cfg: &RuleConfig) -> SecurityRule {
    SecurityRule {
        protocol: cfg.protocol.to_string(),
        port_range: cfg.port_range(),
        remote_cidr: cfg.cidr.to_string(),
    }
}

/// Ensure the whole network stack for a deployment
pub async fn ensure_network_stack(
    provider: &dyn CloudProvider,
    network: &NetworkConfig,
    security_group: &SecurityGroupConfig,
    external: &NetworkInfo,
    report: &mut ProvisionReport,
) -> Result<NetworkStack> {
    let net = ensure_network(provider, network, report).await?;
    let subnet = ensure_subnet(provider, network, &net, report).await?;
    let router = ensure_router(provider, network, external, &subnet, report).await?;
    let group = ensure_security_group(provider, security_group, report).await?;
    apply_rules(provider, security_group, report).await?;

    Ok(NetworkStack {
        network: net,
        subnet,
        router,
        security_group: group,
    })
}

async fn ensure_network(
    provider: &dyn CloudProvider,
    config: &NetworkConfig,
    report: &mut ProvisionReport,
) -> Result<NetworkInfo> {
    let existing = unique(
        provider.list_networks(&config.name).await?,
        "network",
        &config.name,
    )?;
    match existing {
        Some(net) => {
            report.add("network", &config.name, Ensured::Reused);
            Ok(net)
        }
        None => {
            let net = provider.create_network(&config.name).await?;
            report.add("network", &config.name, Ensured::Created);
            Ok(net)
        }
    }
}

async fn ensure_subnet(
    provider: &dyn CloudProvider,
    config: &NetworkConfig,
    network: &NetworkInfo,
    report: &mut ProvisionReport,
) -> Result<SubnetInfo> {
    let name = config.subnet_name();
    let existing = unique(provider.list_subnets(&name).await?, "subnet", &name)?;
    match existing {
        Some(subnet) => {
            report.add("subnet", &name, Ensured::Reused);
            Ok(subnet)
        }
        None => {
            let spec = SubnetSpec {
                name: name.clone(),
                network: network.name.clone(),
                cidr: config.cidr.to_string(),
                gateway: config.gateway.map(|g| g.to_string()),
            };
            let subnet = provider.create_subnet(&spec).await?;
            report.add("subnet", &name, Ensured::Created);
            Ok(subnet)
        }
    }
}

async fn ensure_router(
    provider: &dyn CloudProvider,
    config: &NetworkConfig,
    external: &NetworkInfo,
    subnet: &SubnetInfo,
    report: &mut ProvisionReport,
) -> Result<RouterInfo> {
    let name = config.router_name();
    let existing = unique(provider.list_routers(&name).await?, "router", &name)?;
    match existing {
        Some(router) => {
            report.add("router", &name, Ensured::Reused);
            Ok(router)
        }
        None => {
            let router = provider
                .create_router(&name, &external.name, &subnet.name)
                .await?;
            report.add("router", &name, Ensured::Created);
            Ok(router)
        }
    }
}

async fn ensure_security_group(
    provider: &dyn CloudProvider,
    config: &SecurityGroupConfig,
    report: &mut ProvisionReport,
) -> Result<SecurityGroupInfo> {
    let existing = unique(
        provider.list_security_groups(&config.name).await?,
        "security group",
        &config.name,
    )?;
    match existing {
        Some(group) => {
            tracing::warn!(
                group = %config.name,
                "Security group already exists; rules are append-only, \
                 rules removed from the configuration are not pruned"
            );
            report.add("security group", &config.name, Ensured::Reused);
            Ok(group)
        }
        None => {
            let description = config.description.as_deref().unwrap_or("Managed by lakeflow");
            let group = provider
                .create_security_group(&config.name, description)
                .await?;
            report.add("security group", &config.name, Ensured::Created);
            Ok(group)
        }
    }
}

async fn apply_rules(
    provider: &dyn CloudProvider,
    config: &SecurityGroupConfig,
    report: &mut ProvisionReport,
) -> Result<()> {
    for rule_config in &config.rules {
        let rule = to_security_rule(rule_config);
        match provider.add_security_rule(&config.name, &rule).await? {
            RuleOutcome::Added => report.add("rule", rule.to_string(), Ensured::Created),
            RuleOutcome::Duplicate => report.add("rule", rule.to_string(), Ensured::Reused),
        }
    }
    Ok(())
}
