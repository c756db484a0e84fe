//! Instance capability of the OpenStack provider

use async_trait::async_trait;
use tracing::{debug, trace};

use super::addresses::node_addresses;
use super::locator::{find_instances, get_server_by_name};
use super::OpenStack;
use crate::client::ComputeApi;
use crate::cloudprovider::{CloudError, Instances, NodeAddress};

#[async_trait]
impl<C: ComputeApi> Instances for OpenStack<C> {
    async fn node_addresses(&self, name: &str) -> Result<Vec<NodeAddress>, CloudError> {
        trace!("NodeAddresses({})", name);

        let server = get_server_by_name(&self.compute, name).await?;
        let addrs = node_addresses(&server);

        debug!("NodeAddresses({}) => {:?}", name, addrs);
        Ok(addrs)
    }

    async fn external_id(&self, name: &str) -> Result<String, CloudError> {
        let server = get_server_by_name(&self.compute, name).await?;
        Ok(server.id)
    }

    async fn instance_id(&self, name: &str) -> Result<String, CloudError> {
        let server = get_server_by_name(&self.compute, name).await?;
        // Hosts expect a path-like id.
        Ok(format!("/{}", server.id))
    }

    async fn list(&self, filter: &str) -> Result<Vec<String>, CloudError> {
        trace!("List({})", filter);
        find_instances(&self.compute, filter).await
    }

    async fn add_ssh_key_to_all_instances(
        &self,
        _user: &str,
        _key_data: &[u8],
    ) -> Result<(), CloudError> {
        Err(CloudError::Unimplemented("AddSSHKeyToAllInstances"))
    }

    async fn current_node_name(&self, hostname: &str) -> Result<String, CloudError> {
        Ok(hostname.to_string())
    }
}
