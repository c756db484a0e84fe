//! OpenStack cloud provider for cluster orchestrators
//!
//! Loads an INI-style config, authenticates against Keystone, and answers
//! instance, address and zone questions from Nova.

pub mod cli;
pub mod client;
pub mod cloudprovider;
pub mod config;
pub mod openstack;

pub use cloudprovider::{CloudError, CloudProvider, Instances, NodeAddress, NodeAddressType, Zone, Zones};
pub use config::{load_config_file, read_config, Config, ConfigError};
pub use openstack::{InstanceIdResolver, OpenStack, PROVIDER_NAME};
