//! QEMU virtual machine endpoints.

use crate::client::ApiRequest;
use crate::models::{QemuVm, QemuVmConfig};
use crate::PveClient;
use pve_core::{ApiParams, ApiPath, NodeName, Result, VmId};
use tracing::info;

/// Power actions under `/status/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PowerAction {
    Start,
    Stop,
    Shutdown,
    Reboot,
}

impl PowerAction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Shutdown => "shutdown",
            Self::Reboot => "reboot",
        }
    }
}

impl PveClient {
    /// VMs on `node`. With `full`, the server includes the detailed status fields.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn list_vms(&self, node: &NodeName, full: bool) -> Result<Vec<QemuVm>> {
        let mut query = ApiParams::new();
        query.set_bool("full", full);
        Ok(self
            .get(ApiPath::node(node).push("qemu"), query)
            .await?
            .unwrap_or_default())
    }

    /// Current configuration of a VM.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn get_vm_config(&self, node: &NodeName, vmid: VmId) -> Result<QemuVmConfig> {
        Ok(self
            .get(ApiPath::qemu(node, vmid).push("config"), ApiParams::new())
            .await?
            .unwrap_or_default())
    }

    /// Create a VM with the given ID. Returns the task UPID.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn create_vm(
        &self,
        node: &NodeName,
        vmid: VmId,
        config: &QemuVmConfig,
    ) -> Result<Option<String>> {
        let mut form = config.to_params();
        form.set("vmid", vmid);
        info!(node = %node, vmid = %vmid, "Creating VM");
        self.post(ApiPath::node(node).push("qemu"), form).await
    }

    /// Apply the non-empty fields of `config` to a VM.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute_discard`].
    pub async fn update_vm_config(
        &self,
        node: &NodeName,
        vmid: VmId,
        config: &QemuVmConfig,
    ) -> Result<()> {
        let request =
            ApiRequest::put(ApiPath::qemu(node, vmid).push("config")).with_form(config.to_params());
        self.execute_discard(request).await
    }

    /// Set VM memory in MiB.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute_discard`].
    pub async fn set_memory(&self, node: &NodeName, vmid: VmId, memory_mb: u64) -> Result<()> {
        self.update_vm_config(node, vmid, &QemuVmConfig::with_memory(memory_mb))
            .await
    }

    /// Set the VM core count.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute_discard`].
    pub async fn set_cores(&self, node: &NodeName, vmid: VmId, cores: u64) -> Result<()> {
        self.update_vm_config(node, vmid, &QemuVmConfig::with_cores(cores))
            .await
    }

    /// Power on. Returns the task UPID.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn start_vm(&self, node: &NodeName, vmid: VmId) -> Result<Option<String>> {
        self.vm_power(node, vmid, PowerAction::Start).await
    }

    /// Hard stop. Returns the task UPID.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn stop_vm(&self, node: &NodeName, vmid: VmId) -> Result<Option<String>> {
        self.vm_power(node, vmid, PowerAction::Stop).await
    }

    /// ACPI shutdown. Returns the task UPID.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn shutdown_vm(&self, node: &NodeName, vmid: VmId) -> Result<Option<String>> {
        self.vm_power(node, vmid, PowerAction::Shutdown).await
    }

    /// ACPI reboot. Returns the task UPID.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn reboot_vm(&self, node: &NodeName, vmid: VmId) -> Result<Option<String>> {
        self.vm_power(node, vmid, PowerAction::Reboot).await
    }

    /// Destroy a VM and its disks. Returns the task UPID.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn delete_vm(&self, node: &NodeName, vmid: VmId) -> Result<Option<String>> {
        info!(node = %node, vmid = %vmid, "Deleting VM");
        self.delete(ApiPath::qemu(node, vmid), ApiParams::new()).await
    }

    async fn vm_power(
        &self,
        node: &NodeName,
        vmid: VmId,
        action: PowerAction,
    ) -> Result<Option<String>> {
        let path = ApiPath::qemu(node, vmid).push("status").push(action.as_str());
        info!(node = %node, vmid = %vmid, action = action.as_str(), "Sending VM power action");
        self.post(path, ApiParams::new()).await
    }
}
