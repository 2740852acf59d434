//! # pve-core
//!
//! Core types and utilities for working with the Proxmox VE API.
//!
//! This crate provides foundational types, error handling, configuration, and HTTP client
//! utilities for building Proxmox VE integrations.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy shared by every client operation
//! - [`config`] - Connection and authentication configuration
//! - [`client`] - HTTP transport construction and wire constants
//! - [`ids`] - Strongly-typed guest IDs and node/storage names
//! - [`path`] - API path builder with per-segment escaping
//! - [`params`] - Query/form parameter builder

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod params;
pub mod path;

// Re-export commonly used types
pub use config::{AuthMethod, PveClientConfig};
pub use error::{ApiErrors, Error, Result};
pub use ids::{NodeName, StorageId, VmId};
pub use params::ApiParams;
pub use path::ApiPath;
