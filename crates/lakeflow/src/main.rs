mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lake")]
#[command(about = "Provision a cloud host and hand it to your inventory", long_about = None)]
struct Cli {
    /// Deployment file (default: lakeflow.yaml in the working directory)
    #[arg(short, long, env = "LAKE_CONFIG_PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the deployment end to end
    Provision {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Check preconditions without mutating anything
    Validate,
    /// Show the current state of the deployment's resources
    Status,
    /// Show version information
    Version,
}

/// Resolve and load the deployment file for commands that need one
fn load_deployment(config: Option<PathBuf>) -> anyhow::Result<lakeflow_core::Deployment> {
    let path = match config {
        Some(path) => path,
        None => lakeflow_core::find_deployment_file()?,
    };
    Ok(lakeflow_core::load_deployment(&path)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Provision { yes } => {
            let deployment = load_deployment(cli.config)?;
            commands::provision::handle(&deployment, yes).await?;
        }
        Commands::Validate => {
            let deployment = load_deployment(cli.config)?;
            commands::validate::handle(&deployment).await?;
        }
        Commands::Status => {
            let deployment = load_deployment(cli.config)?;
            commands::status::handle(&deployment).await?;
        }
        // Version needs no deployment file
        Commands::Version => {
            println!("lakeflow {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
