pub mod auth;
pub mod compute;
pub mod network;

pub use auth::AuthOptions;
pub use compute::{AddressDescriptor, Addresses, ComputeApi, ComputeClient, ListOpts, Server};
pub use network::NetworkClient;

use openstack::session::Session;
use openstack::ErrorKind;
use osauth::services::ServiceType;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid credentials: {0}")]
    InvalidAuth(String),

    #[error("Authentication failed: {0}")]
    Auth(#[source] openstack::Error),

    #[error("No {service_type} endpoint found in region '{region}'")]
    EndpointNotFound { service_type: String, region: String },

    #[error("OpenStack API error: {0}")]
    Api(#[from] openstack::Error),
}

impl ClientError {
    /// Rejected credentials become `Auth`, anything else stays an API error.
    pub fn from_auth_error(err: openstack::Error) -> Self {
        match err.kind() {
            ErrorKind::AuthenticationFailed | ErrorKind::AccessDenied => ClientError::Auth(err),
            _ => ClientError::Api(err),
        }
    }
}

/// Resolve the URL of `service` in the session's region.
async fn locate<Srv>(session: &Session, service: Srv, region: &str) -> Result<String, ClientError>
where
    Srv: ServiceType + Send,
{
    let service_type = service.catalog_type();
    match session.get_endpoint(service, std::iter::empty::<&str>()).await {
        Ok(url) => {
            debug!(service = service_type, region = region, url = %url, "Resolved endpoint");
            Ok(url.to_string())
        }
        Err(e) if e.kind() == ErrorKind::EndpointNotFound => Err(ClientError::EndpointNotFound {
            service_type: service_type.to_string(),
            region: region.to_string(),
        }),
        Err(e) => Err(ClientError::from_auth_error(e)),
    }
}

/// Compute and network endpoints for one region, sharing an authenticated
/// SDK session that renews its token on its own.
pub struct ProviderHandle {
    pub compute: ComputeClient,
    pub network: NetworkClient,
}

impl ProviderHandle {
    /// Authenticate and resolve both service endpoints for `region`. An empty
    /// region accepts endpoints from any region.
    pub async fn connect(options: &AuthOptions, region: &str) -> Result<Self, ClientError> {
        let auth = options.password_auth()?;
        let mut session = Session::new(auth)
            .await
            .map_err(ClientError::from_auth_error)?;
        if !region.is_empty() {
            session.set_region(region);
        }
        Self::from_session(session, region).await
    }

    /// Resolve endpoints using an existing session.
    pub async fn from_session(session: Session, region: &str) -> Result<Self, ClientError> {
        let network = NetworkClient::new(&session, region)
            .await
            .inspect_err(|e| warn!("Failed to find neutron endpoint: {}", e))?;

        let compute = ComputeClient::new(session, region)
            .await
            .inspect_err(|e| warn!("Failed to find compute endpoint: {}", e))?;

        Ok(Self { compute, network })
    }
}
