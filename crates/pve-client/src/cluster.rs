//! Cluster-wide endpoints.

use crate::models::{ClusterResource, ClusterResourceType, VersionInfo};
use crate::PveClient;
use pve_core::{ApiParams, ApiPath, Error, Result};

impl PveClient {
    /// API and package version of the node answering the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the response carries no version.
    pub async fn version(&self) -> Result<VersionInfo> {
        self.get(ApiPath::version(), ApiParams::new())
            .await?
            .ok_or_else(|| Error::Decode("empty version response".into()))
    }

    /// Every guest, node and storage in the cluster, optionally narrowed to one kind.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn cluster_resources(
        &self,
        kind: Option<ClusterResourceType>,
    ) -> Result<Vec<ClusterResource>> {
        let mut query = ApiParams::new();
        query.set_opt("type", kind);
        Ok(self
            .get(ApiPath::cluster_resources(), query)
            .await?
            .unwrap_or_default())
    }
}
