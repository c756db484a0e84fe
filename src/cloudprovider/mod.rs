//! Capability contract a cloud provider exposes to the cluster orchestrator
//!
//! A provider advertises optional capabilities through accessor methods:
//! each one returns `Some(capability)` when supported and `None` otherwise. All
//! operations are async and take `&self`; implementations hold no per-call
//! mutable state, so they can be shared across tasks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ClientError;
use crate::config::ConfigError;
use crate::openstack::MetadataError;

/// Errors surfaced to the host. Lookup errors are flat; transport and API
/// failures pass through unchanged.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Failed to find object")]
    NotFound,

    #[error("Multiple results where only one expected")]
    MultipleResults,

    #[error("No address found for host")]
    NoAddressFound,

    #[error("Expected attribute not found")]
    AttributeNotFound,

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to find {service} endpoint for region '{region}'")]
    EndpointResolution { service: String, region: String },

    #[error("{0} is not implemented")]
    Unimplemented(&'static str),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),
}

impl CloudError {
    /// Like `From<ClientError>`, but catalog lookup failures become `EndpointResolution`.
    pub fn from_endpoint_error(err: ClientError) -> Self {
        match err {
            ClientError::EndpointNotFound {
                service_type,
                region,
            } => CloudError::EndpointResolution {
                service: service_type,
                region,
            },
            other => CloudError::Client(other),
        }
    }
}

/// Locality of the running provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub region: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeAddressType {
    InternalIP,
    ExternalIP,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeAddress {
    #[serde(rename = "type")]
    pub kind: NodeAddressType,
    pub address: String,
}

impl NodeAddress {
    pub fn new(kind: NodeAddressType, address: impl Into<String>) -> Self {
        Self {
            kind,
            address: address.into(),
        }
    }
}

/// Append each address unless it is empty or an equal (kind, address) pair
/// is already present. Existing order is kept.
pub fn add_to_node_addresses(
    addresses: &mut Vec<NodeAddress>,
    new: impl IntoIterator<Item = NodeAddress>,
) {
    for addr in new {
        if addr.address.is_empty() || addresses.contains(&addr) {
            continue;
        }
        addresses.push(addr);
    }
}

// ============================================================================
// Capability traits
// ============================================================================

#[async_trait]
pub trait Zones: Send + Sync {
    async fn get_zone(&self) -> Result<Zone, CloudError>;
}

#[async_trait]
pub trait Instances: Send + Sync {
    /// Addresses of the named instance, internal before external.
    async fn node_addresses(&self, name: &str) -> Result<Vec<NodeAddress>, CloudError>;

    /// Provider id of the named instance (deprecated form).
    async fn external_id(&self, name: &str) -> Result<String, CloudError>;

    /// Provider id of the named instance.
    async fn instance_id(&self, name: &str) -> Result<String, CloudError>;

    /// Names of running instances matching `filter`.
    async fn list(&self, filter: &str) -> Result<Vec<String>, CloudError>;

    async fn add_ssh_key_to_all_instances(
        &self,
        user: &str,
        key_data: &[u8],
    ) -> Result<(), CloudError>;

    /// Node name for the host this process runs on.
    async fn current_node_name(&self, hostname: &str) -> Result<String, CloudError>;
}

#[async_trait]
pub trait Clusters: Send + Sync {
    async fn list_clusters(&self) -> Result<Vec<String>, CloudError>;

    async fn master(&self, cluster_name: &str) -> Result<String, CloudError>;
}

/// Entry point the host talks to
pub trait CloudProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    fn zones(&self) -> Option<&dyn Zones>;

    fn instances(&self) -> Option<&dyn Instances>;

    fn clusters(&self) -> Option<&dyn Clusters>;

    /// Adjust the DNS nameservers and search domains handed to nodes.
    fn scrub_dns(&self, nameservers: Vec<String>, searches: Vec<String>)
        -> (Vec<String>, Vec<String>);
}
