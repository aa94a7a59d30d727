//! OpenStack provider for lakeflow
//!
//! Implements the `lakeflow-cloud` provider trait by shelling out to the
//! `openstack` CLI (python-openstackclient) with JSON output.

pub mod error;
pub mod oscli;
pub mod provider;

pub use error::{OpenStackError, Result};
pub use provider::OpenStackProvider;
