use colored::Colorize;
use lakeflow_cloud::CloudProvider;
use lakeflow_cloud_openstack::OpenStackProvider;
use lakeflow_core::Deployment;
use lakeflow_inventory::InventoryStore;

/// Read-only report of what exists for the deployment
pub async fn handle(deployment: &Deployment) -> anyhow::Result<()> {
    let provider = OpenStackProvider::new(&deployment.cloud);

    let auth = provider.check_auth().await?;
    if !auth.authenticated {
        println!(
            "{} not authenticated: {}",
            "✗".red(),
            auth.error.as_deref().unwrap_or("unknown")
        );
        return Ok(());
    }

    print_presence(
        "network",
        &deployment.network.name,
        !provider.list_networks(&deployment.network.name).await?.is_empty(),
    );
    print_presence(
        "subnet",
        &deployment.network.subnet_name(),
        !provider
            .list_subnets(&deployment.network.subnet_name())
            .await?
            .is_empty(),
    );
    print_presence(
        "router",
        &deployment.network.router_name(),
        !provider
            .list_routers(&deployment.network.router_name())
            .await?
            .is_empty(),
    );
    print_presence(
        "security group",
        &deployment.security_group.name,
        !provider
            .list_security_groups(&deployment.security_group.name)
            .await?
            .is_empty(),
    );
    print_presence(
        "keypair",
        &deployment.keypair.name,
        provider.get_keypair(&deployment.keypair.name).await?.is_some(),
    );

    match provider.get_server(&deployment.instance.name).await? {
        Some(server) => {
            let floating_ips = provider.list_floating_ips().await?;
            let bound = floating_ips
                .iter()
                .find(|f| server.addresses.contains(&f.address));
            println!(
                "{} instance {} is {}",
                "✓".green(),
                server.name.cyan(),
                server.status.to_lowercase()
            );
            match bound {
                Some(fip) => {
                    println!("{} floating ip {} bound", "✓".green(), fip.address.cyan())
                }
                None => println!("{} no floating ip bound", "✗".red()),
            }
        }
        None => println!("{} instance {} absent", "✗".red(), deployment.instance.name),
    }

    let store = InventoryStore::new(&deployment.inventory.path);
    match store
        .lookup_host(&deployment.inventory.section, &deployment.instance.name)
        .await?
    {
        Some(address) => println!(
            "{} inventoried in [{}] as {}",
            "✓".green(),
            deployment.inventory.section,
            address.cyan()
        ),
        None => println!(
            "{} not in inventory section [{}]",
            "✗".red(),
            deployment.inventory.section
        ),
    }

    Ok(())
}

fn print_presence(kind: &str, name: &str, present: bool) {
    if present {
        println!("{} {} {} exists", "✓".green(), kind, name.cyan());
    } else {
        println!("{} {} {} absent", "✗".red(), kind, name);
    }
}
