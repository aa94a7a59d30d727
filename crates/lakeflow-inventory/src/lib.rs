//! lakeflow inventory store
//!
//! The hand-off boundary between provisioning and configuration: an
//! Ansible-style INI inventory with exclusive per-host upsert, and per-host
//! variable files rendered from tera templates.

pub mod error;
pub mod hostvars;
pub mod store;

pub use error::{InventoryError, Result};
pub use hostvars::{HostVars, write_host_vars};
pub use store::InventoryStore;
