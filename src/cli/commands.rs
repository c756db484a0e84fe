//! Command implementations for the CLI
//!
//! SBIO pattern: Commands return Results, I/O is handled by caller

use std::path::Path;

use thiserror::Error;

use crate::cloudprovider::{CloudError, CloudProvider, Instances, NodeAddress, Zone, Zones};
use crate::config::{load_config_file, Config, ConfigError};
use crate::openstack::metadata::{INSTANCE_ID_FILE, METADATA_URL};
use crate::openstack::{InstanceIdResolver, MetadataError};

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Cloud(#[from] CloudError),

    #[error("Provider does not support {0}")]
    Unsupported(&'static str),

    #[error("Cannot determine hostname: {0}")]
    Hostname(String),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),
}

/// Result type for commands
pub type CommandResult<T> = Result<T, CommandError>;

/// Who this host is, as seen by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// Empty when not running on an OpenStack instance
    pub instance_id: String,
    pub node_name: String,
}

// ============================================================================
// Config Commands
// ============================================================================

/// Load a config file without contacting the cloud.
pub fn validate_config(path: &Path) -> CommandResult<Config> {
    Ok(load_config_file(path)?)
}

/// Resolver honouring optional location overrides.
pub fn instance_id_resolver(
    marker_path: Option<&Path>,
    metadata_url: Option<&str>,
) -> CommandResult<InstanceIdResolver> {
    Ok(InstanceIdResolver::with_locations(
        marker_path.unwrap_or(Path::new(INSTANCE_ID_FILE)),
        metadata_url.unwrap_or(METADATA_URL),
    )?)
}

// ============================================================================
// Provider Commands
// ============================================================================

fn zones(provider: &dyn CloudProvider) -> CommandResult<&dyn Zones> {
    provider.zones().ok_or(CommandError::Unsupported("zones"))
}

fn instances(provider: &dyn CloudProvider) -> CommandResult<&dyn Instances> {
    provider.instances().ok_or(CommandError::Unsupported("instances"))
}

pub async fn get_zone(provider: &dyn CloudProvider) -> CommandResult<Zone> {
    Ok(zones(provider)?.get_zone().await?)
}

pub async fn list_instances(provider: &dyn CloudProvider, filter: &str) -> CommandResult<Vec<String>> {
    Ok(instances(provider)?.list(filter).await?)
}

pub async fn node_addresses(
    provider: &dyn CloudProvider,
    name: &str,
) -> CommandResult<Vec<NodeAddress>> {
    Ok(instances(provider)?.node_addresses(name).await?)
}

pub async fn external_id(provider: &dyn CloudProvider, name: &str) -> CommandResult<String> {
    Ok(instances(provider)?.external_id(name).await?)
}

pub async fn instance_id(provider: &dyn CloudProvider, name: &str) -> CommandResult<String> {
    Ok(instances(provider)?.instance_id(name).await?)
}

/// Node name for `hostname` plus the already resolved local instance id.
pub async fn whoami(
    provider: &dyn CloudProvider,
    local_instance_id: &str,
    hostname: &str,
) -> CommandResult<Identity> {
    let node_name = instances(provider)?.current_node_name(hostname).await?;
    Ok(Identity {
        instance_id: local_instance_id.to_string(),
        node_name,
    })
}

/// Hostname of this machine.
pub fn system_hostname() -> CommandResult<String> {
    hostname::get()
        .map_err(|e| CommandError::Hostname(e.to_string()))?
        .into_string()
        .map_err(|raw| CommandError::Hostname(format!("not valid UTF-8: {:?}", raw)))
}
