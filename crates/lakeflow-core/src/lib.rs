//! lakeflow deployment configuration
//!
//! Typed model of a deployment (`lakeflow.yaml`), its loader, and the
//! file-discovery rules.

pub mod discovery;
pub mod error;
pub mod loader;
pub mod model;

pub use discovery::find_deployment_file;
pub use error::{ConfigError, Result};
pub use loader::load_deployment;
pub use model::{
    Deployment, InstanceConfig, InventoryConfig, KeypairConfig, NetworkConfig, Protocol,
    RuleConfig, SecurityGroupConfig,
};
