//! lakeflow provisioning workflow
//!
//! The idempotent create-or-reuse workflow that turns a deployment
//! description into a reachable, inventoried host:
//!
//! validate → network stack + keypair → instance + floating IP →
//! readiness gate → inventory hand-off
//!
//! Everything here talks to the cloud through the `lakeflow-cloud` provider
//! trait; no provider specifics leak into the workflow.

pub mod error;
pub mod instance;
pub mod keypair;
pub mod network;
pub mod preflight;
pub mod report;
pub mod workflow;

pub use error::{ProvisionError, Result};
pub use instance::ProvisionedHost;
pub use keypair::KeypairOutcome;
pub use network::NetworkStack;
pub use preflight::Validated;
pub use report::{Ensured, ProvisionReport, ReportEntry};
pub use workflow::{ProvisionOutcome, Workflow};
