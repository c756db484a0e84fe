//! OpenStack cloud provider
//!
//! `OpenStack` ties the config, the authenticated session, and the lookup
//! helpers together behind the [`CloudProvider`] capability traits.
//!
//! All operations take `&self` and every server lookup queries the compute
//! API afresh, so one provider can be shared across tasks behind an `Arc`.
//! The SDK session renews the token before it expires.

pub mod addresses;
pub mod instances;
pub mod locator;
pub mod metadata;

pub use metadata::{InstanceIdResolver, MetadataError};

use std::io::Read;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::client::{ComputeApi, ComputeClient, NetworkClient, ProviderHandle};
use crate::cloudprovider::{CloudError, CloudProvider, Clusters, Instances, Zone, Zones};
use crate::config::{read_config, Config, LoadBalancerOpts, RouteOpts};

pub const PROVIDER_NAME: &str = "openstack";

pub struct OpenStack<C: ComputeApi = ComputeClient> {
    compute: C,
    network: Option<NetworkClient>,
    region: String,
    lb_opts: LoadBalancerOpts,
    route_opts: RouteOpts,
    local_instance_id: String,
}

impl OpenStack<ComputeClient> {
    /// Authenticate, resolve endpoints and look up the local instance id.
    pub async fn new(cfg: Config) -> Result<Self, CloudError> {
        let resolver = InstanceIdResolver::new()?;
        Self::with_resolver(cfg, &resolver).await
    }

    /// Like [`OpenStack::new`] with an explicit instance id resolver.
    ///
    /// Failing to resolve the local instance id is not fatal: the provider
    /// is built with an empty id.
    pub async fn with_resolver(
        cfg: Config,
        resolver: &InstanceIdResolver,
    ) -> Result<Self, CloudError> {
        let region = cfg.global.region.clone();
        let handle = ProviderHandle::connect(&cfg.to_auth_options(), &region)
            .await
            .map_err(CloudError::from_endpoint_error)?;

        let local_instance_id = match resolver.resolve().await {
            Ok(id) => id,
            Err(e) => {
                info!("Not running on an OpenStack instance: {}", e);
                String::new()
            }
        };

        debug!(
            region = %region,
            compute = handle.compute.endpoint(),
            network = handle.network.endpoint(),
            "OpenStack provider ready"
        );

        Ok(Self {
            compute: handle.compute,
            network: Some(handle.network),
            region,
            lb_opts: cfg.load_balancer,
            route_opts: cfg.route,
            local_instance_id,
        })
    }

    /// Build a provider from a config stream. `None` means no config was given.
    pub async fn from_reader<R: Read>(config: Option<R>) -> Result<Self, CloudError> {
        let cfg = read_config(config)?;
        Self::new(cfg).await
    }
}

impl<C: ComputeApi> OpenStack<C> {
    /// Provider over an already constructed compute API, without a network
    /// endpoint or local instance id.
    pub fn with_compute(compute: C, cfg: &Config) -> Self {
        Self {
            compute,
            network: None,
            region: cfg.global.region.clone(),
            lb_opts: cfg.load_balancer.clone(),
            route_opts: cfg.route.clone(),
            local_instance_id: String::new(),
        }
    }

    pub fn with_local_instance_id(mut self, id: impl Into<String>) -> Self {
        self.local_instance_id = id.into();
        self
    }

    pub fn compute(&self) -> &C {
        &self.compute
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn lb_opts(&self) -> &LoadBalancerOpts {
        &self.lb_opts
    }

    pub fn route_opts(&self) -> &RouteOpts {
        &self.route_opts
    }

    /// Versioned network endpoint, when one was resolved
    pub fn network_endpoint(&self) -> Option<&str> {
        self.network.as_ref().map(NetworkClient::endpoint)
    }

    /// Id of the instance this process runs on; empty when unknown.
    pub fn local_instance_id(&self) -> &str {
        &self.local_instance_id
    }
}

impl<C: ComputeApi> CloudProvider for OpenStack<C> {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn zones(&self) -> Option<&dyn Zones> {
        info!("Claiming to support Zones");
        Some(self)
    }

    fn instances(&self) -> Option<&dyn Instances> {
        Some(self)
    }

    fn clusters(&self) -> Option<&dyn Clusters> {
        None
    }

    fn scrub_dns(
        &self,
        nameservers: Vec<String>,
        searches: Vec<String>,
    ) -> (Vec<String>, Vec<String>) {
        (nameservers, searches)
    }
}

#[async_trait]
impl<C: ComputeApi> Zones for OpenStack<C> {
    async fn get_zone(&self) -> Result<Zone, CloudError> {
        let zone = Zone {
            region: self.region.clone(),
        };
        info!("Current zone is {:?}", zone);
        Ok(zone)
    }
}
