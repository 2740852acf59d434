//! LXC container endpoints.

use crate::client::ApiRequest;
use crate::models::{LxcContainer, LxcSummary};
use crate::PveClient;
use pve_core::{ApiParams, ApiPath, Error, NodeName, Result, VmId};
use serde_json::{Map, Value};
use tracing::info;

impl PveClient {
    /// Containers on `node`.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn list_containers(&self, node: &NodeName) -> Result<Vec<LxcSummary>> {
        Ok(self
            .get(ApiPath::node(node).push("lxc"), ApiParams::new())
            .await?
            .unwrap_or_default())
    }

    /// Container configuration as returned by the API.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn get_container_config(&self, node: &NodeName, vmid: VmId) -> Result<Value> {
        Ok(self
            .get(ApiPath::lxc(node, vmid).push("config"), ApiParams::new())
            .await?
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    /// Create a container. Returns the task UPID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] without contacting the server when the container has
    /// no VMID or a blank SSH key.
    /// Otherwise as [`PveClient::execute`].
    pub async fn create_container(
        &self,
        node: &NodeName,
        container: &LxcContainer,
    ) -> Result<Option<String>> {
        let Some(vmid) = container.vmid else {
            return Err(Error::InvalidRequest("container vmid is required".into()));
        };
        let form = container.to_params()?;
        info!(node = %node, vmid = %vmid, "Creating container");
        self.post(ApiPath::node(node).push("lxc"), form).await
    }

    /// Apply `params` to a container's configuration.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute_discard`].
    pub async fn update_container_config(
        &self,
        node: &NodeName,
        vmid: VmId,
        params: &ApiParams,
    ) -> Result<()> {
        let request =
            ApiRequest::put(ApiPath::lxc(node, vmid).push("config")).with_form(params.clone());
        self.execute_discard(request).await
    }

    /// Start a container. Returns the task UPID.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn start_container(&self, node: &NodeName, vmid: VmId) -> Result<Option<String>> {
        info!(node = %node, vmid = %vmid, "Starting container");
        self.post(
            ApiPath::lxc(node, vmid).push("status").push("start"),
            ApiParams::new(),
        )
        .await
    }

    /// Stop a container immediately. Returns the task UPID.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn stop_container(&self, node: &NodeName, vmid: VmId) -> Result<Option<String>> {
        info!(node = %node, vmid = %vmid, "Stopping container");
        self.post(
            ApiPath::lxc(node, vmid).push("status").push("stop"),
            ApiParams::new(),
        )
        .await
    }

    /// Destroy a container. Returns the task UPID.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn delete_container(&self, node: &NodeName, vmid: VmId) -> Result<Option<String>> {
        info!(node = %node, vmid = %vmid, "Deleting container");
        self.delete(ApiPath::lxc(node, vmid), ApiParams::new()).await
    }
}
