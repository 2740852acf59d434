//! Typed payloads for the node, guest, storage and cluster endpoints.
//!
//! Numeric fields the API reports inconsistently (integer vs. float, number vs. string) are
//! decoded leniently; boolean flags arrive as `0`/`1` and are exposed as `bool`.

use pve_core::{ApiParams, Error, NodeName, Result, StorageId, VmId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// `GET /version`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionInfo {
    /// Full package version, e.g. `8.2.4`.
    pub version: String,
    /// Major.minor release.
    #[serde(default)]
    pub release: String,
    /// Source repository commit.
    #[serde(default)]
    pub repoid: String,
    /// Default console viewer, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<String>,
}

/// Filter for `GET /cluster/resources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterResourceType {
    /// QEMU VMs and LXC containers.
    Vm,
    /// Storage definitions per node.
    Storage,
    /// Cluster nodes.
    Node,
    /// Software-defined network zones.
    Sdn,
}

impl ClusterResourceType {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vm => "vm",
            Self::Storage => "storage",
            Self::Node => "node",
            Self::Sdn => "sdn",
        }
    }
}

impl fmt::Display for ClusterResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `GET /cluster/resources`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterResource {
    /// Resource ID such as `qemu/100`, `node/pve01` or `storage/pve01/local`.
    pub id: String,
    /// Resource kind as reported (`qemu`, `lxc`, `node`, `storage`, `pool`, `sdn`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Owning node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeName>,
    /// Guest ID, for VMs and containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmid: Option<VmId>,
    /// Guest name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Status string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Storage ID, for storage entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageId>,
    /// Resource pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
    /// Semicolon-separated tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// CPU utilisation (0.0 - 1.0 per core count).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Available CPUs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxcpu: Option<f64>,
    /// Used memory in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Memory limit in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Used disk in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
    /// Disk size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxdisk: Option<u64>,
    /// Uptime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Whether the guest is a template.
    #[serde(default, deserialize_with = "flag::optional", skip_serializing_if = "Option::is_none")]
    pub template: Option<bool>,
    /// HA manager state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hastate: Option<String>,
    /// Storage plugin type, for storage entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugintype: Option<String>,
}

/// One entry of `GET /nodes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSummary {
    /// Node name.
    pub node: NodeName,
    /// `online`, `offline` or `unknown`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// CPU utilisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// CPU count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxcpu: Option<u32>,
    /// Used memory in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Total memory in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Used root disk in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
    /// Root disk size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxdisk: Option<u64>,
    /// Uptime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Support subscription level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// SHA-256 fingerprint of the node certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_fingerprint: Option<String>,
}

/// One entry of `GET /nodes/{node}/qemu`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QemuVm {
    /// Guest ID.
    pub vmid: VmId,
    /// VM name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `running` or `stopped`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Detailed QEMU status (only with `full=1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qmstatus: Option<String>,
    /// Hosting node (present in some responses).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeName>,
    /// CPU utilisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Configured vCPUs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<f64>,
    /// Used memory in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Memory as seen by the host in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memhost: Option<u64>,
    /// Memory limit in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Used disk in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
    /// Boot disk size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxdisk: Option<u64>,
    /// Bytes received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netin: Option<u64>,
    /// Bytes sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netout: Option<u64>,
    /// Bytes read from disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diskread: Option<u64>,
    /// Bytes written to disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diskwrite: Option<u64>,
    /// QEMU process ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u64>,
    /// Uptime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Machine type in use.
    #[serde(rename = "running-machine", default, skip_serializing_if = "Option::is_none")]
    pub running_machine: Option<String>,
    /// QEMU version in use.
    #[serde(rename = "running-qemu", default, skip_serializing_if = "Option::is_none")]
    pub running_qemu: Option<String>,
    /// Whether a serial console is configured.
    #[serde(default, deserialize_with = "flag::optional", skip_serializing_if = "Option::is_none")]
    pub serial: Option<bool>,
    /// Whether the VM is a template.
    #[serde(default, deserialize_with = "flag::optional", skip_serializing_if = "Option::is_none")]
    pub template: Option<bool>,
    /// Semicolon-separated tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Pressure stall information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressurecpusome: Option<f64>,
    /// Pressure stall information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressurecpufull: Option<f64>,
    /// Pressure stall information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressureiosome: Option<f64>,
    /// Pressure stall information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressureiofull: Option<f64>,
    /// Pressure stall information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressurememorysome: Option<f64>,
    /// Pressure stall information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressurememoryfull: Option<f64>,
}

/// QEMU VM configuration.
///
/// Only the commonly edited keys are typed; every other key of `GET .../config` lands in
/// [`QemuVmConfig::raw`] as text and is sent back unchanged by [`QemuVmConfig::to_params`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Map<String, Value>")]
pub struct QemuVmConfig {
    /// VM name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Memory in MiB.
    #[serde(rename = "memory", skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u64>,
    /// CPU sockets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sockets: Option<u64>,
    /// Cores per socket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<u64>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remaining keys (`net0`, `scsi0`, `boot`, ...) as text.
    #[serde(flatten)]
    pub raw: BTreeMap<String, String>,
}

impl QemuVmConfig {
    /// Config carrying only a memory change.
    #[must_use]
    pub fn with_memory(memory_mb: u64) -> Self {
        Self {
            memory_mb: Some(memory_mb),
            ..Self::default()
        }
    }

    /// Config carrying only a core-count change.
    #[must_use]
    pub fn with_cores(cores: u64) -> Self {
        Self {
            cores: Some(cores),
            ..Self::default()
        }
    }

    /// Form parameters for create/update. Empty values are omitted.
    #[must_use]
    pub fn to_params(&self) -> ApiParams {
        let mut params = ApiParams::new();
        params.set_non_empty("name", self.name.as_deref().unwrap_or_default());
        params.set_opt("memory", self.memory_mb);
        params.set_opt("sockets", self.sockets);
        params.set_opt("cores", self.cores);
        params.set_non_empty("description", self.description.as_deref().unwrap_or_default());
        for (key, value) in &self.raw {
            params.set_non_empty(key.as_str(), value);
        }
        params
    }
}

impl TryFrom<Map<String, Value>> for QemuVmConfig {
    type Error = Error;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        let mut config = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "name" => config.name = Some(text(&value)),
                "memory" => config.memory_mb = Some(whole_number(&key, &value)?),
                "sockets" => config.sockets = Some(whole_number(&key, &value)?),
                "cores" => config.cores = Some(whole_number(&key, &value)?),
                "description" => config.description = Some(text(&value)),
                _ => {
                    config.raw.insert(key, text(&value));
                }
            }
        }
        Ok(config)
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_number(key: &str, value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.round() as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::Decode(format!("`{key}` is not a whole number: {value}")))
}

/// One entry of `GET /nodes/{node}/lxc`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LxcSummary {
    /// Guest ID.
    pub vmid: VmId,
    /// Hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `running` or `stopped`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Always `lxc`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// CPU utilisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// CPU limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<f64>,
    /// Used memory in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Memory limit in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Used swap in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<u64>,
    /// Swap limit in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxswap: Option<u64>,
    /// Used root disk in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
    /// Root disk size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxdisk: Option<u64>,
    /// Bytes received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netin: Option<u64>,
    /// Bytes sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netout: Option<u64>,
    /// Uptime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Semicolon-separated tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Whether the container is a template.
    #[serde(default, deserialize_with = "flag::optional", skip_serializing_if = "Option::is_none")]
    pub template: Option<bool>,
}

/// Parameters for `POST /nodes/{node}/lxc`.
///
/// Unset fields are left to the server's defaults.
#[derive(Debug, Clone, Default)]
pub struct LxcContainer {
    /// Guest ID (required by the API).
    pub vmid: Option<VmId>,
    /// Hostname.
    pub hostname: Option<String>,
    /// Root password. Required unless SSH keys are given.
    pub password: Option<SecretString>,
    /// Template volume, e.g. `local:vztmpl/debian-12-standard_12.7-1_amd64.tar.zst`.
    pub ostemplate: Option<String>,
    /// Storage for the root filesystem.
    pub storage: Option<StorageId>,
    /// Root filesystem size in GiB, combined with `storage` into `rootfs`.
    pub rootfs_size: Option<String>,
    /// Public keys installed for root.
    pub ssh_public_keys: Vec<String>,
    /// Memory in MiB.
    pub memory: Option<u32>,
    /// Swap in MiB.
    pub swap: Option<u32>,
    /// CPU cores.
    pub cores: Option<u32>,
    /// CPU limit.
    pub cpulimit: Option<u32>,
    /// Relative CPU weight.
    pub cpuunits: Option<u32>,
    /// First network interface, e.g. `name=eth0,bridge=vmbr0,ip=dhcp`.
    pub net0: Option<String>,
    /// DNS server.
    pub nameserver: Option<String>,
    /// DNS search domain.
    pub searchdomain: Option<String>,
    /// Resource pool.
    pub pool: Option<String>,
    /// Notes.
    pub description: Option<String>,
    /// Run as an unprivileged container.
    pub unprivileged: Option<bool>,
    /// Start after creation.
    pub start: Option<bool>,
    /// Restore/clone I/O limit in KiB/s.
    pub bwlimit: Option<u32>,
    /// OS architecture (`amd64`, `arm64`, ...).
    pub arch: Option<String>,
    /// Console mode (`tty`, `console`, `shell`).
    pub cmode: Option<String>,
    /// Attach a console device.
    pub console: Option<bool>,
    /// Verbose container start logging.
    pub debug: Option<bool>,
    /// Feature list, e.g. `nesting=1,keyctl=1`.
    pub features: Option<String>,
    /// Startup order, e.g. `order=2,up=30`.
    pub startup: Option<String>,
    /// Semicolon-separated tags.
    pub tags: Option<String>,
}

impl LxcContainer {
    /// SSH keys as the newline-separated value the API expects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if no keys are set or one of them is blank.
    pub fn ssh_public_keys_param(&self) -> Result<String> {
        if self.ssh_public_keys.is_empty() {
            return Err(Error::InvalidRequest("no SSH public keys provided".into()));
        }
        if self.ssh_public_keys.iter().any(|key| key.trim().is_empty()) {
            return Err(Error::InvalidRequest("SSH public key must not be blank".into()));
        }
        Ok(self.ssh_public_keys.join("\n"))
    }

    /// Form parameters for the create call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if a configured SSH key is blank.
    pub fn to_params(&self) -> Result<ApiParams> {
        let mut params = ApiParams::new();
        params.set_opt("vmid", self.vmid);
        params.set_opt("hostname", self.hostname.as_deref());
        if let Some(password) = &self.password {
            params.set_non_empty("password", password.expose_secret());
        }
        params.set_opt("ostemplate", self.ostemplate.as_deref());
        if !self.ssh_public_keys.is_empty() {
            params.set("ssh-public-keys", self.ssh_public_keys_param()?);
        }
        params.set_opt("storage", self.storage.as_ref());
        if let (Some(storage), Some(size)) = (&self.storage, &self.rootfs_size) {
            params.set("rootfs", format!("{storage}:{size}"));
        }
        params.set_opt("memory", self.memory);
        params.set_opt("swap", self.swap);
        params.set_opt("cores", self.cores);
        params.set_opt("cpulimit", self.cpulimit);
        params.set_opt("cpuunits", self.cpuunits);
        params.set_opt("net0", self.net0.as_deref());
        params.set_opt("nameserver", self.nameserver.as_deref());
        params.set_opt("searchdomain", self.searchdomain.as_deref());
        params.set_opt("pool", self.pool.as_deref());
        params.set_opt("description", self.description.as_deref());
        params.set_opt("arch", self.arch.as_deref());
        params.set_opt("cmode", self.cmode.as_deref());
        params.set_opt("features", self.features.as_deref());
        params.set_opt("startup", self.startup.as_deref());
        params.set_opt("tags", self.tags.as_deref());
        params.set_opt("bwlimit", self.bwlimit);
        for (key, flag) in [
            ("start", self.start),
            ("console", self.console),
            ("unprivileged", self.unprivileged),
            ("debug", self.debug),
        ] {
            if let Some(flag) = flag {
                params.set_bool(key, flag);
            }
        }
        Ok(params)
    }
}

/// Storage backend type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageType {
    /// `dir`
    Directory,
    /// `lvm`
    Lvm,
    /// `lvmthin`
    LvmThin,
    /// `btrfs`
    Btrfs,
    /// `nfs`
    Nfs,
    /// `cifs`
    Cifs,
    /// `glusterfs`
    GlusterFs,
    /// `cephfs`
    CephFs,
    /// `rbd`
    Rbd,
    /// `zfspool`
    ZfsPool,
    /// `zfs` (ZFS over iSCSI)
    ZfsOverIscsi,
    /// `iscsi`
    Iscsi,
    /// `pbs`
    ProxmoxBackupServer,
    /// Anything else, kept verbatim.
    Other(String),
}

impl StorageType {
    /// Wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Directory => "dir",
            Self::Lvm => "lvm",
            Self::LvmThin => "lvmthin",
            Self::Btrfs => "btrfs",
            Self::Nfs => "nfs",
            Self::Cifs => "cifs",
            Self::GlusterFs => "glusterfs",
            Self::CephFs => "cephfs",
            Self::Rbd => "rbd",
            Self::ZfsPool => "zfspool",
            Self::ZfsOverIscsi => "zfs",
            Self::Iscsi => "iscsi",
            Self::ProxmoxBackupServer => "pbs",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for StorageType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "dir" | "directory" => Self::Directory,
            "lvm" => Self::Lvm,
            "lvmthin" | "lvm-thin" => Self::LvmThin,
            "btrfs" => Self::Btrfs,
            "nfs" => Self::Nfs,
            "cifs" => Self::Cifs,
            "glusterfs" => Self::GlusterFs,
            "cephfs" => Self::CephFs,
            "rbd" => Self::Rbd,
            "zfspool" => Self::ZfsPool,
            "zfs" | "zfs-iscsi" => Self::ZfsOverIscsi,
            "iscsi" => Self::Iscsi,
            "pbs" => Self::ProxmoxBackupServer,
            _ => Self::Other(value),
        }
    }
}

impl From<StorageType> for String {
    fn from(value: StorageType) -> Self {
        match value {
            StorageType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for StorageType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content a storage may hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageContent {
    /// `backup`
    Backup,
    /// `iso`
    Iso,
    /// `images` (VM disks)
    Images,
    /// `snippets` (hook scripts, cloud-init)
    Snippets,
    /// `vztmpl` (container templates)
    ContainerTemplates,
    /// `rootdir` (container volumes)
    RootDir,
    /// `import`
    Import,
    /// Anything else, kept verbatim.
    Other(String),
}

impl StorageContent {
    /// Wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Backup => "backup",
            Self::Iso => "iso",
            Self::Images => "images",
            Self::Snippets => "snippets",
            Self::ContainerTemplates => "vztmpl",
            Self::RootDir => "rootdir",
            Self::Import => "import",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for StorageContent {
    fn from(value: String) -> Self {
        match value.as_str() {
            "backup" => Self::Backup,
            "iso" => Self::Iso,
            "images" | "image" => Self::Images,
            "snippets" => Self::Snippets,
            "vztmpl" => Self::ContainerTemplates,
            "rootdir" => Self::RootDir,
            "import" => Self::Import,
            _ => Self::Other(value),
        }
    }
}

impl From<StorageContent> for String {
    fn from(value: StorageContent) -> Self {
        match value {
            StorageContent::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for StorageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `GET /nodes/{node}/storage`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageStatus {
    /// Storage ID.
    pub storage: StorageId,
    /// Backend type.
    #[serde(rename = "type")]
    pub kind: StorageType,
    /// Allowed content types.
    #[serde(default, deserialize_with = "content_list")]
    pub content: Vec<StorageContent>,
    /// Whether the storage is usable on this node.
    #[serde(default, deserialize_with = "flag::optional", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Whether the storage is enabled.
    #[serde(default, deserialize_with = "flag::optional", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Whether the storage is shared between nodes.
    #[serde(default, deserialize_with = "flag::optional", skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    /// Capacity in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Used bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
    /// Free bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avail: Option<u64>,
    /// `used / total`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_fraction: Option<f64>,
}

impl StorageStatus {
    /// Whether the storage accepts `content`.
    #[must_use]
    pub fn supports(&self, content: &StorageContent) -> bool {
        self.content.contains(content)
    }
}

/// Content arrives as `"images,rootdir"`.
fn content_list<'de, D>(deserializer: D) -> std::result::Result<Vec<StorageContent>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<String>),
        Joined(String),
    }

    let items = match Option::<Repr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Repr::List(items)) => items,
        Some(Repr::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    };
    Ok(items.into_iter().map(StorageContent::from).collect())
}

mod flag {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    /// `0`/`1`, booleans and their string forms.
    pub(super) fn optional<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Repr::Bool(value)) => Ok(Some(value)),
            Some(Repr::Int(value)) => Ok(Some(value != 0)),
            Some(Repr::Text(text)) => match text.as_str() {
                "1" | "true" | "yes" | "on" => Ok(Some(true)),
                "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
                other => Err(D::Error::custom(format!("invalid flag `{other}`"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn qemu_config_splits_typed_and_raw() {
        let config: QemuVmConfig = serde_json::from_value(json!({
            "name": "web01",
            "memory": "2048",
            "sockets": 1,
            "cores": 2.0,
            "description": "front end",
            "net0": "virtio=BC:24:11:2A:3B:4C,bridge=vmbr0",
            "onboot": 1,
            "digest": "6f1c"
        }))
        .unwrap();

        assert_eq!(config.name.as_deref(), Some("web01"));
        assert_eq!(config.memory_mb, Some(2048));
        assert_eq!(config.sockets, Some(1));
        assert_eq!(config.cores, Some(2));
        assert_eq!(config.description.as_deref(), Some("front end"));
        assert_eq!(config.raw["onboot"], "1");
        assert_eq!(config.raw["net0"], "virtio=BC:24:11:2A:3B:4C,bridge=vmbr0");
        assert!(!config.raw.contains_key("memory"));
    }

    #[test]
    fn qemu_config_rejects_non_numeric_memory() {
        let err = serde_json::from_value::<QemuVmConfig>(json!({"memory": "lots"})).unwrap_err();
        assert!(err.to_string().contains("memory"));
    }

    #[test]
    fn qemu_config_params_skip_empty() {
        let mut config = QemuVmConfig {
            name: Some("web01".into()),
            memory_mb: Some(4096),
            description: Some(String::new()),
            ..QemuVmConfig::default()
        };
        config.raw.insert("net0".into(), "virtio,bridge=vmbr0".into());
        config.raw.insert("ide2".into(), String::new());

        let params = config.to_params();
        assert_eq!(params.get("name"), Some("web01"));
        assert_eq!(params.get("memory"), Some("4096"));
        assert_eq!(params.get("net0"), Some("virtio,bridge=vmbr0"));
        assert_eq!(params.get("description"), None);
        assert_eq!(params.get("ide2"), None);
        assert_eq!(params.get("cores"), None);
    }

    #[test]
    fn lxc_params_follow_form_mapping() {
        let container = LxcContainer {
            vmid: Some(VmId::new(201).unwrap()),
            hostname: Some("ct01".into()),
            password: Some(SecretString::from("pw".to_string())),
            ostemplate: Some("local:vztmpl/debian-12-standard_12.7-1_amd64.tar.zst".into()),
            storage: Some(StorageId::new("local-lvm").unwrap()),
            rootfs_size: Some("8".into()),
            ssh_public_keys: vec!["ssh-ed25519 AAAA one".into(), "ssh-ed25519 BBBB two".into()],
            memory: Some(512),
            unprivileged: Some(true),
            start: Some(false),
            nameserver: Some("10.0.0.1".into()),
            ..LxcContainer::default()
        };

        let params = container.to_params().unwrap();
        assert_eq!(params.get("vmid"), Some("201"));
        assert_eq!(params.get("hostname"), Some("ct01"));
        assert_eq!(params.get("password"), Some("pw"));
        assert_eq!(params.get("storage"), Some("local-lvm"));
        assert_eq!(params.get("rootfs"), Some("local-lvm:8"));
        assert_eq!(
            params.get("ssh-public-keys"),
            Some("ssh-ed25519 AAAA one\nssh-ed25519 BBBB two")
        );
        assert_eq!(params.get("memory"), Some("512"));
        assert_eq!(params.get("unprivileged"), Some("1"));
        assert_eq!(params.get("start"), Some("0"));
        assert_eq!(params.get("nameserver"), Some("10.0.0.1"));
        assert_eq!(params.get("swap"), None);
    }

    #[test]
    fn lxc_rootfs_needs_storage_and_size() {
        let container = LxcContainer {
            rootfs_size: Some("8".into()),
            ..LxcContainer::default()
        };
        let params = container.to_params().unwrap();
        assert_eq!(params.get("rootfs"), None);
        assert!(params.is_empty());
    }

    #[test]
    fn lxc_ssh_keys() {
        let mut container = LxcContainer::default();
        assert!(matches!(
            container.ssh_public_keys_param(),
            Err(Error::InvalidRequest(_))
        ));

        container.ssh_public_keys = vec!["ssh-rsa AAAA".into()];
        assert_eq!(container.ssh_public_keys_param().unwrap(), "ssh-rsa AAAA");

        container.ssh_public_keys.push("  ".into());
        assert!(container.to_params().is_err());
    }

    #[test]
    fn storage_type_names() {
        assert_eq!(StorageType::from("dir".to_string()), StorageType::Directory);
        assert_eq!(StorageType::from("lvm-thin".to_string()), StorageType::LvmThin);
        assert_eq!(StorageType::LvmThin.to_string(), "lvmthin");
        assert_eq!(
            "esxi".parse::<StorageType>().unwrap(),
            StorageType::Other("esxi".into())
        );
        assert_eq!(String::from(StorageType::Other("esxi".into())), "esxi");
    }

    #[test]
    fn storage_status_decodes_flags_and_content() {
        let status: StorageStatus = serde_json::from_value(json!({
            "storage": "local",
            "type": "dir",
            "content": "iso,vztmpl,backup,image",
            "active": 1,
            "enabled": 1,
            "shared": 0,
            "total": 100_000,
            "used": 25_000,
            "avail": 75_000,
            "used_fraction": 0.25
        }))
        .unwrap();

        assert_eq!(status.kind, StorageType::Directory);
        assert_eq!(status.content.len(), 4);
        assert!(status.supports(&StorageContent::Images));
        assert!(!status.supports(&StorageContent::RootDir));
        assert_eq!(status.active, Some(true));
        assert_eq!(status.shared, Some(false));
    }

    #[test]
    fn invalid_flag_is_rejected() {
        let err = serde_json::from_value::<StorageStatus>(json!({
            "storage": "local",
            "type": "dir",
            "active": "maybe"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn cluster_resource_type_query_value() {
        assert_eq!(ClusterResourceType::Vm.as_str(), "vm");
        assert_eq!(
            serde_json::to_string(&ClusterResourceType::Storage).unwrap(),
            "\"storage\""
        );
    }
}
