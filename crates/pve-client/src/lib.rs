//! Asynchronous client for the Proxmox VE REST API.
//!
//! Supports password (ticket) and API-token authentication. In password mode the client logs
//! in on first use, attaches the ticket cookie and CSRF token to every call, and logs in again
//! once the ticket ages past the configured expiry. Concurrent calls share a single login.
//!
//! ```no_run
//! use pve_client::{NodeName, PveClient, PveClientConfig};
//!
//! # async fn run() -> pve_client::Result<()> {
//! let config = PveClientConfig::token("https://pve.example.com:8006", "root@pam!ci", "secret")?;
//! let client = PveClient::new(config)?;
//! for vm in client.list_vms(&NodeName::new("pve01")?, false).await? {
//!     println!("{} {:?}", vm.vmid, vm.name);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod auth;
pub mod client;
mod cluster;
pub mod context;
pub mod envelope;
mod lxc;
pub mod models;
mod nodes;
mod qemu;
pub mod session;
mod storage;

#[cfg(test)]
mod test_support;

pub use auth::Credentials;
pub use client::{ApiRequest, PveClient, PveClientBuilder, RequestBody};
pub use context::CallContext;
pub use models::{
    ClusterResource, ClusterResourceType, LxcContainer, LxcSummary, NodeSummary, QemuVm,
    QemuVmConfig, StorageContent, StorageStatus, StorageType, VersionInfo,
};
pub use pve_core::{
    ApiErrors, ApiParams, ApiPath, AuthMethod, Error, NodeName, PveClientConfig, StorageId, VmId,
};
pub use session::SessionState;
pub use tokio_util::sync::CancellationToken;

/// Convenient result alias that reuses the shared error type.
pub type Result<T> = pve_core::Result<T>;
