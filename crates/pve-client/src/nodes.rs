//! Node endpoints.

use crate::models::NodeSummary;
use crate::PveClient;
use pve_core::{ApiParams, ApiPath, NodeName, Result};
use serde_json::Value;

impl PveClient {
    /// Cluster members with their load and capacity.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn list_nodes(&self) -> Result<Vec<NodeSummary>> {
        Ok(self
            .get(ApiPath::nodes(), ApiParams::new())
            .await?
            .unwrap_or_default())
    }

    /// `GET /nodes/{node}/status`, undecoded.
    ///
    /// # Errors
    ///
    /// See [`PveClient::execute`].
    pub async fn node_status(&self, node: &NodeName) -> Result<Value> {
        Ok(self
            .get(ApiPath::node(node).push("status"), ApiParams::new())
            .await?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::ApiRequest;
    use crate::test_support::{node, token_client};
    use pve_core::{ApiPath, Error, NodeName};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_nodes_decodes_summaries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api2/json/nodes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "node": "pve01", "status": "online", "cpu": 0.031, "maxcpu": 16,
                    "mem": 12_884_901_888_u64, "maxmem": 67_430_002_688_u64,
                    "uptime": 864_000, "level": "", "type": "node", "id": "node/pve01"
                }]
            })))
            .mount(&server)
            .await;

        let nodes = token_client(&server).list_nodes().await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].node, node());
        assert_eq!(nodes[0].maxcpu, Some(16));
        assert_eq!(nodes[0].status.as_deref(), Some("online"));
    }

    #[tokio::test]
    async fn node_status_returns_raw_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api2/json/nodes/pve01/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"uptime": 42, "pveversion": "pve-manager/8.2.4"}
            })))
            .mount(&server)
            .await;

        let status = token_client(&server).node_status(&node()).await.unwrap();
        assert_eq!(status["pveversion"], "pve-manager/8.2.4");
    }

    #[tokio::test]
    async fn node_name_is_escaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .mount(&server)
            .await;

        let client = token_client(&server);
        let odd = NodeName::new("../../access").unwrap();
        client.node_status(&odd).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].url.path(),
            "/api2/json/nodes/..%2F..%2Faccess/status"
        );
    }

    #[tokio::test]
    async fn dot_segment_is_rejected_before_io() {
        let server = MockServer::start().await;
        let client = token_client(&server);

        assert!(matches!(NodeName::new(".."), Err(Error::InvalidRequest(_))));

        let request = ApiRequest::delete(ApiPath::nodes().push("..").push("qemu"));
        let err = client.execute_discard(request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
