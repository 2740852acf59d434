//! API path construction.
//!
//! Paths are kept as unescaped segments and only percent-encoded when joined onto the base
//! URL, so a node or storage name can never smuggle in extra path components.

use crate::ids::{NodeName, VmId};
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Versioned API root.
pub const API_ROOT: &str = "/api2/json";

/// Password login endpoint.
pub const TICKET_PATH: &str = "/api2/json/access/ticket";

/// Cluster-wide resource listing.
pub const CLUSTER_RESOURCES_PATH: &str = "/api2/json/cluster/resources";

/// Node listing.
pub const NODES_PATH: &str = "/api2/json/nodes";

/// Path below the API base URL, held as unescaped segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    /// `/api2/json`
    #[must_use]
    pub fn root() -> Self {
        Self {
            segments: vec!["api2".to_string(), "json".to_string()],
        }
    }

    /// `/api2/json/access/ticket`
    #[must_use]
    pub fn ticket() -> Self {
        Self::root().push("access").push("ticket")
    }

    /// `/api2/json/version`
    #[must_use]
    pub fn version() -> Self {
        Self::root().push("version")
    }

    /// `/api2/json/cluster/resources`
    #[must_use]
    pub fn cluster_resources() -> Self {
        Self::root().push("cluster").push("resources")
    }

    /// `/api2/json/nodes`
    #[must_use]
    pub fn nodes() -> Self {
        Self::root().push("nodes")
    }

    /// `/api2/json/nodes/{node}`
    #[must_use]
    pub fn node(node: &NodeName) -> Self {
        Self::nodes().push(node)
    }

    /// `/api2/json/nodes/{node}/qemu/{vmid}`
    #[must_use]
    pub fn qemu(node: &NodeName, vmid: VmId) -> Self {
        Self::node(node).push("qemu").push(vmid)
    }

    /// `/api2/json/nodes/{node}/lxc/{vmid}`
    #[must_use]
    pub fn lxc(node: &NodeName, vmid: VmId) -> Self {
        Self::node(node).push("lxc").push(vmid)
    }

    /// Append one segment. The value is escaped as a single segment when the URL is built.
    #[must_use]
    pub fn push(mut self, segment: impl fmt::Display) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// The unescaped segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve this path against a base URL, keeping any path prefix the base carries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if a segment is `.` or `..`, which URL resolution
    /// would drop or apply instead of escaping, and [`Error::InvalidConfiguration`] if the
    /// base URL cannot carry a path.
    pub fn join_onto(&self, base: &Url) -> Result<Url> {
        if let Some(segment) = self
            .segments
            .iter()
            .find(|segment| is_dot_segment(segment))
        {
            return Err(Error::InvalidRequest(format!(
                "path segment `{segment}` not allowed in `{self}`"
            )));
        }

        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| {
                Error::InvalidConfiguration(format!("base URL `{base}` cannot carry API paths"))
            })?
            .pop_if_empty()
            .extend(&self.segments);
        Ok(url)
    }
}

/// True for `.` and `..`, including their `%2e` spellings, which URL resolution treats alike.
pub(crate) fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

impl FromStr for ApiPath {
    type Err = Error;

    /// Split a `/`-separated path into segments. Segments are taken as unescaped text.
    fn from_str(s: &str) -> Result<Self> {
        let segments: Vec<String> = s
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        if segments.is_empty() {
            return Err(Error::InvalidRequest(format!("empty API path `{s}`")));
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
