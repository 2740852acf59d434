use crate::PveClient;
use pve_core::{NodeName, PveClientConfig, VmId};
use wiremock::MockServer;

pub(crate) const TOKEN_HEADER: &str = "PVEAPIToken=root@pam!ci=0a1b2c3d";

pub(crate) fn token_client(server: &MockServer) -> PveClient {
    let config = PveClientConfig::token(server.uri(), "root@pam!ci", "0a1b2c3d").unwrap();
    PveClient::new(config).unwrap()
}

pub(crate) fn node() -> NodeName {
    NodeName::new("pve01").unwrap()
}

pub(crate) fn vmid(id: u32) -> VmId {
    VmId::new(id).unwrap()
}
