use colored::Colorize;
use lakeflow_cloud_openstack::OpenStackProvider;
use lakeflow_core::Deployment;
use lakeflow_provision::Workflow;

/// Read-only precondition check; issues no mutating call
pub async fn handle(deployment: &Deployment) -> anyhow::Result<()> {
    let provider = OpenStackProvider::new(&deployment.cloud);
    let validated = Workflow::new(&provider, deployment).preflight().await?;

    println!("{} deployment file is valid", "✓".green());
    println!(
        "{} external network {} is unique and external",
        "✓".green(),
        validated.external_network.name.cyan()
    );
    println!("{} image {} found", "✓".green(), validated.image.name.cyan());

    Ok(())
}
