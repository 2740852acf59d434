//! Storage endpoints.

use crate::models::StorageStatus;
use crate::PveClient;
use pve_core::{ApiParams, ApiPath, NodeName, Result};

impl PveClient {
    /// Storages visible from `node`, with usage.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn list_storage(&self, node: &NodeName) -> Result<Vec<StorageStatus>> {
        Ok(self
            .get(ApiPath::node(node).push("storage"), ApiParams::new())
            .await?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{StorageContent, StorageType};
    use crate::test_support::{node, token_client};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_storage_decodes_types_and_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api2/json/nodes/pve01/storage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"storage": "local", "type": "dir", "content": "iso,vztmpl,backup",
                     "active": 1, "enabled": 1, "shared": 0,
                     "total": 100_861_726_720_u64, "used": 9_395_240_960_u64,
                     "avail": 86_303_944_704_u64, "used_fraction": 0.0932},
                    {"storage": "local-lvm", "type": "lvmthin", "content": "rootdir,images",
                     "active": 1, "enabled": 1, "shared": 0},
                    {"storage": "backups", "type": "pbs", "content": "backup",
                     "active": 0, "enabled": 1, "shared": 1}
                ]
            })))
            .mount(&server)
            .await;

        let storages = token_client(&server).list_storage(&node()).await.unwrap();
        assert_eq!(storages.len(), 3);
        assert_eq!(storages[0].kind, StorageType::Directory);
        assert!(storages[0].supports(&StorageContent::Iso));
        assert_eq!(storages[1].kind, StorageType::LvmThin);
        assert!(storages[1].supports(&StorageContent::RootDir));
        assert_eq!(storages[2].kind, StorageType::ProxmoxBackupServer);
        assert_eq!(storages[2].active, Some(false));
        assert_eq!(storages[2].shared, Some(true));
    }
}
