use colored::Colorize;
use lakeflow_cloud_openstack::OpenStackProvider;
use lakeflow_core::Deployment;
use lakeflow_provision::{Ensured, Workflow};
use std::io::Write;

pub async fn handle(deployment: &Deployment, yes: bool) -> anyhow::Result<()> {
    println!(
        "Provisioning {} on cloud {}",
        deployment.instance.name.cyan(),
        deployment.cloud.cyan()
    );
    println!("  network:        {}", deployment.network.name);
    println!(
        "  security group: {} ({} rules)",
        deployment.security_group.name,
        deployment.security_group.rules.len()
    );
    println!("  keypair:        {}", deployment.keypair.name);
    println!(
        "  instance:       {} MB RAM, {} GB volume",
        deployment.instance.ram_mb, deployment.instance.volume_gb
    );
    println!();

    if !yes && !confirm("Proceed?")? {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    let provider = OpenStackProvider::new(&deployment.cloud);
    let outcome = Workflow::new(&provider, deployment).run().await?;

    println!();
    for entry in outcome.report.entries() {
        let marker = match entry.ensured {
            Ensured::Created => "+".green(),
            Ensured::Reused => "=".dimmed(),
        };
        println!("  {} {} {}", marker, entry.kind, entry.name);
    }
    println!();
    println!(
        "{} {} ({})",
        "✓".green(),
        outcome.host.name.bold(),
        outcome.host.address.cyan()
    );
    println!("  {}", outcome.report);
    println!(
        "  inventory: {}",
        outcome.inventory_path.display().to_string().cyan()
    );
    println!(
        "  host vars: {}",
        outcome.host_vars_path.display().to_string().cyan()
    );

    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
