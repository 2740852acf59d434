//! Integration tests for parsing Proxmox VE response data.
//!
//! These tests validate that the pve-client models can deserialize full API responses,
//! envelope included.

use pve_client::envelope::decode_data;
use pve_client::models::{
    ClusterResource, LxcSummary, NodeSummary, QemuVm, QemuVmConfig, StorageContent,
    StorageStatus, StorageType,
};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load a fixture and decode its `data` member.
fn load<T: DeserializeOwned>(name: &str) -> T {
    let fixture_path = fixtures_dir().join(name);
    let body = fs::read(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });

    decode_data(&body, name)
        .unwrap_or_else(|e| panic!("Failed to decode {name}: {e}"))
        .unwrap_or_else(|| panic!("{name} has no data"))
}

#[test]
fn test_deserialize_qemu_list() {
    let vms: Vec<QemuVm> = load("qemu_list.json");
    assert_eq!(vms.len(), 3, "Expected 3 VMs in test data");

    let web = &vms[0];
    assert_eq!(web.vmid.get(), 100);
    assert_eq!(web.name.as_deref(), Some("web01"));
    assert_eq!(web.status.as_deref(), Some("running"));
    assert_eq!(web.maxmem, Some(4_294_967_296));
    assert_eq!(web.running_machine.as_deref(), Some("pc-i440fx-9.0+pve0"));
    assert_eq!(web.serial, Some(true));
    assert_eq!(web.template, None);
    assert!(web.pressurecpusome.is_some());

    let stopped = &vms[1];
    assert_eq!(stopped.pid, None);
    assert_eq!(stopped.uptime, Some(0));
}

#[test]
fn test_qemu_template_flag() {
    let vms: Vec<QemuVm> = load("qemu_list.json");
    let templates: Vec<_> = vms.iter().filter(|vm| vm.template == Some(true)).collect();

    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].vmid.get(), 9000);
}

#[test]
fn test_deserialize_qemu_config() {
    let config: QemuVmConfig = load("qemu_config.json");

    assert_eq!(config.name.as_deref(), Some("web01"));
    assert_eq!(config.memory_mb, Some(4096));
    assert_eq!(config.sockets, Some(1));
    assert_eq!(config.cores, Some(4));
    assert_eq!(config.description.as_deref(), Some("Frontend pool member\n"));

    // Untyped keys survive as text, numbers included
    assert_eq!(config.raw["onboot"], "1");
    assert_eq!(config.raw["numa"], "0");
    assert_eq!(config.raw["scsihw"], "virtio-scsi-single");
    assert_eq!(config.raw.len(), 12);

    // Sending the config back reproduces every non-empty key
    let params = config.to_params();
    assert_eq!(params.get("memory"), Some("4096"));
    assert_eq!(params.get("net0"), config.raw.get("net0").map(String::as_str));
    assert_eq!(params.len(), 17);
}

#[test]
fn test_deserialize_lxc_list() {
    let containers: Vec<LxcSummary> = load("lxc_list.json");
    assert_eq!(containers.len(), 2);

    assert_eq!(containers[0].vmid.get(), 201);
    assert_eq!(containers[0].tags.as_deref(), Some("infra"));
    assert_eq!(containers[0].maxswap, Some(536_870_912));
    assert_eq!(containers[1].template, Some(false));
}

#[test]
fn test_deserialize_storage_list() {
    let storages: Vec<StorageStatus> = load("storage_list.json");
    assert_eq!(storages.len(), 4);

    let local = &storages[0];
    assert_eq!(local.storage.as_str(), "local");
    assert_eq!(local.kind, StorageType::Directory);
    assert_eq!(
        local.content,
        vec![
            StorageContent::ContainerTemplates,
            StorageContent::Iso,
            StorageContent::Backup,
            StorageContent::Snippets,
        ]
    );

    let nfs = &storages[2];
    assert_eq!(nfs.kind, StorageType::Nfs);
    assert_eq!(nfs.shared, Some(true));
    assert!(nfs.supports(&StorageContent::Import));

    // Unknown plugin types are preserved
    let esxi = &storages[3];
    assert_eq!(esxi.kind, StorageType::Other("esxi".to_string()));
    assert_eq!(esxi.enabled, Some(false));
    assert_eq!(esxi.total, None);
}

#[test]
fn test_storage_for_guest_disks() {
    let storages: Vec<StorageStatus> = load("storage_list.json");
    let disk_capable: Vec<_> = storages
        .iter()
        .filter(|s| s.active == Some(true) && s.supports(&StorageContent::Images))
        .map(|s| s.storage.as_str())
        .collect();

    assert_eq!(disk_capable, ["local-lvm"]);
}

#[test]
fn test_deserialize_nodes() {
    let nodes: Vec<NodeSummary> = load("nodes.json");
    assert_eq!(nodes.len(), 2);

    assert_eq!(nodes[0].node.as_str(), "pve01");
    assert_eq!(nodes[0].maxcpu, Some(32));
    assert!(nodes[0].ssl_fingerprint.is_some());

    assert_eq!(nodes[1].status.as_deref(), Some("offline"));
    assert_eq!(nodes[1].mem, None);
}

#[test]
fn test_deserialize_cluster_resources() {
    let resources: Vec<ClusterResource> = load("cluster_resources.json");
    assert_eq!(resources.len(), 5);

    let guests: Vec<_> = resources.iter().filter_map(|r| r.vmid).collect();
    assert_eq!(guests.len(), 2);

    let storage = resources
        .iter()
        .find(|r| r.kind == "storage")
        .expect("Should have a storage resource");
    assert_eq!(storage.storage.as_ref().map(|s| s.as_str()), Some("local-lvm"));
    assert_eq!(storage.plugintype.as_deref(), Some("lvmthin"));

    let pool = resources.iter().find(|r| r.kind == "pool").unwrap();
    assert_eq!(pool.node, None);
    assert_eq!(pool.pool.as_deref(), Some("infra"));
}
