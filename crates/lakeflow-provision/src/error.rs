//! Provisioning workflow error types

use lakeflow_cloud::CloudError;
use lakeflow_inventory::InventoryError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("Provider authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error(
        "Keypair '{name}' already exists in the cloud but no local public key was found.\n\
         Remove the cloud keypair or restore the local key files, then re-run."
    )]
    KeypairConflict { name: String },

    #[error(
        "Failed to persist key material to {path}: {source}\n\
         The cloud-side keypair was already created and its private key cannot be\n\
         retrieved again. Delete the cloud keypair by hand before re-running."
    )]
    KeyPersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Host {address}:{port} did not become reachable within {waited_secs}s.\n\
         The instance and its floating IP are left in place for inspection."
    )]
    ReadinessTimeout {
        address: String,
        port: u16,
        waited_secs: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
