//! Strongly-typed identifiers for Proxmox VE resources.
//!
//! Guest IDs and node/storage names are distinct types so a node name can never be passed
//! where a storage ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Numeric guest ID shared by QEMU VMs and LXC containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawVmId", into = "u32")]
pub struct VmId(u32);

/// Listing endpoints report the VMID as a number or as a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawVmId {
    Number(i64),
    Text(String),
}

impl TryFrom<RawVmId> for VmId {
    type Error = Error;

    fn try_from(raw: RawVmId) -> Result<Self> {
        match raw {
            RawVmId::Number(id) => Self::try_from(id),
            RawVmId::Text(text) => text.parse(),
        }
    }
}

impl VmId {
    /// Creates a guest ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for zero.
    pub fn new(id: u32) -> Result<Self> {
        if id == 0 {
            return Err(Error::InvalidRequest(format!("invalid VMID: {id}")));
        }
        Ok(Self(id))
    }

    /// Returns the raw numeric ID.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for VmId {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self> {
        Self::new(id)
    }
}

impl TryFrom<i64> for VmId {
    type Error = Error;

    fn try_from(id: i64) -> Result<Self> {
        u32::try_from(id)
            .map_err(|_| Error::InvalidRequest(format!("invalid VMID: {id}")))
            .and_then(Self::new)
    }
}

impl From<VmId> for u32 {
    fn from(id: VmId) -> Self {
        id.0
    }
}

impl FromStr for VmId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u32>()
            .map_err(|_| Error::InvalidRequest(format!("invalid VMID: {s}")))
            .and_then(Self::new)
    }
}

impl fmt::Display for VmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Macro to generate non-empty name wrapper types.
macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident, $doc:expr, $what:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates the name, rejecting empty or whitespace-only input and the
            /// relative path names `.` and `..`.
            ///
            /// # Errors
            ///
            /// Returns [`Error::InvalidRequest`] if the name is empty or a dot segment.
            pub fn new(name: impl Into<String>) -> Result<Self> {
                let name = name.into();
                if name.trim().is_empty() {
                    return Err(Error::InvalidRequest(format!("{} must not be empty", $what)));
                }
                if crate::path::is_dot_segment(&name) {
                    return Err(Error::InvalidRequest(format!("{} must not be `{name}`", $what)));
                }
                Ok(Self(name))
            }

            /// Returns the name as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(name: String) -> Result<Self> {
                Self::new(name)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(name: &str) -> Result<Self> {
                Self::new(name)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> Self {
                name.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

name_type!(NodeName, "Cluster node name (e.g. `pve01`)", "node name");
name_type!(StorageId, "Storage identifier (e.g. `local-lvm`)", "storage id");
