//! lakeflow cloud infrastructure
//!
//! This crate provides the cloud provider abstraction for lakeflow: the
//! [`CloudProvider`] capability trait the provisioning workflow talks to,
//! the value types exchanged over it, and the bounded TCP readiness wait.
//!
//! The concrete OpenStack implementation lives in
//! `lakeflow-cloud-openstack`; [`mock::MockCloud`] is the in-memory
//! implementation used by the workflow tests.

pub mod error;
pub mod mock;
pub mod provider;
pub mod types;
pub mod wait;

// Re-exports
pub use error::{CloudError, Result};
pub use provider::{AuthStatus, CloudProvider};
pub use types::{
    CreatedKeypair, FloatingIpInfo, ImageInfo, KeypairInfo, NetworkInfo, RouterInfo, RuleOutcome,
    SecurityGroupInfo, SecurityRule, ServerInfo, ServerSpec, SubnetInfo, SubnetSpec,
};
pub use wait::{WaitConfig, wait_for_port};
