//! Neutron (network service) endpoint

use openstack::session::Session;
use osauth::services::NETWORK;

use super::{locate, ClientError};

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkClient {
    endpoint: String,
}

impl NetworkClient {
    /// Resolve the network endpoint for `region`, following version discovery.
    pub async fn new(session: &Session, region: &str) -> Result<Self, ClientError> {
        let endpoint = locate(session, NETWORK, region).await?;
        Ok(Self { endpoint })
    }

    /// Base URL for network API calls
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
