//! Nova server listing
//!
//! Server records are fetched fresh on every call and never cached. Paging
//! is done by the SDK: the listing is a stream that requests the next page
//! only when the previous one has been consumed, so callers that stop early
//! never fetch the rest.

use std::collections::BTreeMap;
use std::net::IpAddr;

use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use openstack::compute::{ServerAddress, ServerStatus};
use openstack::session::Session;
use openstack::Cloud;
use osauth::services::COMPUTE;
use tracing::trace;

use super::{locate, ClientError};

// ============================================================================
// Data structures (pure, no I/O)
// ============================================================================

/// One address entry of a server's network
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressDescriptor {
    pub addr: Option<String>,
    /// "fixed" or "floating"
    pub ip_type: Option<String>,
    pub version: Option<u64>,
    pub mac_addr: Option<String>,
}

impl From<&ServerAddress> for AddressDescriptor {
    fn from(address: &ServerAddress) -> Self {
        Self {
            addr: Some(address.addr.to_string()),
            ip_type: address.addr_type.map(|t| t.to_string()),
            version: Some(match address.addr {
                IpAddr::V4(_) => 4,
                IpAddr::V6(_) => 6,
            }),
            mac_addr: address.mac_addr.clone(),
        }
    }
}

/// Network name to the ordered address entries on that network
pub type Addresses = BTreeMap<String, Vec<AddressDescriptor>>;

/// A compute instance as seen by the lookups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub addresses: Addresses,
    /// Legacy access address, empty when unset
    pub access_ipv4: String,
    pub access_ipv6: String,
}

impl From<&openstack::compute::Server> for Server {
    fn from(server: &openstack::compute::Server) -> Self {
        Self {
            id: server.id().clone(),
            name: server.name().clone(),
            active: server.status() == ServerStatus::Active,
            addresses: server
                .addresses()
                .iter()
                .map(|(network, list)| {
                    (network.clone(), list.iter().map(AddressDescriptor::from).collect())
                })
                .collect(),
            access_ipv4: server.access_ipv4().map(|ip| ip.to_string()).unwrap_or_default(),
            access_ipv6: server.access_ipv6().map(|ip| ip.to_string()).unwrap_or_default(),
        }
    }
}

/// Filters for a server listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOpts {
    /// Regular expression matched against server names by the API
    pub name: Option<String>,
    pub active_only: bool,
}

impl ListOpts {
    /// Only servers in the ACTIVE state.
    pub fn active() -> Self {
        Self {
            name: None,
            active_only: true,
        }
    }

    /// Add a name filter. An empty filter is the same as none.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = (!name.is_empty()).then_some(name);
        self
    }
}

/// Servers in listing order, fetched page by page as the stream is polled
pub type ServerStream<'a> = BoxStream<'a, Result<Server, ClientError>>;

// ============================================================================
// SBIO: Trait for abstraction (allows mocking in tests)
// ============================================================================

pub trait ComputeApi: Send + Sync {
    /// List servers matching `opts`. Nothing is requested until the stream
    /// is polled.
    fn list_servers(&self, opts: &ListOpts) -> ServerStream<'_>;
}

// ============================================================================
// SBIO: I/O implementation (SDK client)
// ============================================================================

pub struct ComputeClient {
    cloud: Cloud,
    endpoint: String,
}

impl ComputeClient {
    /// Resolve the compute endpoint for `region` and keep the session for listings.
    pub async fn new(session: Session, region: &str) -> Result<Self, ClientError> {
        let endpoint = locate(&session, COMPUTE, region).await?;
        Ok(Self {
            cloud: Cloud::from(session),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ComputeApi for ComputeClient {
    fn list_servers(&self, opts: &ListOpts) -> ServerStream<'_> {
        trace!(name = ?opts.name, active_only = opts.active_only, "Listing servers");

        let mut query = self.cloud.find_servers();
        if let Some(name) = &opts.name {
            query = query.with_name(name.clone());
        }
        if opts.active_only {
            query = query.with_status(ServerStatus::Active);
        }

        query
            .detailed()
            .into_stream()
            .map_ok(|server| Server::from(&server))
            .map_err(ClientError::from)
            .boxed()
    }
}

// ============================================================================
// SBIO: Mock implementation for testing (no I/O)
// ============================================================================

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use futures::{future, stream};
    use openstack::ErrorKind;
    use regex::Regex;
    use serde_json::Value;

    /// In-memory compute API that filters like Nova: the name filter is a
    /// regular expression searched anywhere in the name. `call_count` counts
    /// page fetches.
    pub struct MockCompute {
        servers: Vec<Server>,
        page_size: usize,
        fail: bool,
        call_count: AtomicUsize,
        requests: Mutex<Vec<ListOpts>>,
    }

    impl MockCompute {
        pub fn new(servers: Vec<Server>) -> Self {
            Self {
                servers,
                page_size: 100,
                fail: false,
                call_count: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_page_size(mut self, page_size: usize) -> Self {
            self.page_size = page_size.max(1);
            self
        }

        /// Every page fetch fails with a server error.
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(Vec::new())
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<ListOpts> {
            self.requests.lock().unwrap().clone()
        }

        fn matches(opts: &ListOpts, server: &Server) -> Result<bool, ClientError> {
            if opts.active_only && !server.active {
                return Ok(false);
            }
            if let Some(name) = &opts.name {
                let pattern = Regex::new(name).map_err(|e| {
                    ClientError::Api(openstack::Error::new(ErrorKind::InvalidInput, e.to_string()))
                })?;
                return Ok(pattern.is_match(&server.name));
            }
            Ok(true)
        }

        /// One page starting at `offset` and the offset of the next page.
        fn fetch_page(
            &self,
            opts: &ListOpts,
            offset: usize,
        ) -> Result<(Vec<Server>, Option<usize>), ClientError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            if self.fail {
                return Err(ClientError::Api(openstack::Error::new(
                    ErrorKind::InternalServerError,
                    "compute unavailable",
                )));
            }

            let mut matching = Vec::new();
            for server in &self.servers {
                if Self::matches(opts, server)? {
                    matching.push(server.clone());
                }
            }

            let end = (offset + self.page_size).min(matching.len());
            let page = matching.get(offset..end).map(<[Server]>::to_vec).unwrap_or_default();
            Ok((page, (end < matching.len()).then_some(end)))
        }
    }

    impl ComputeApi for MockCompute {
        fn list_servers(&self, opts: &ListOpts) -> ServerStream<'_> {
            self.requests.lock().unwrap().push(opts.clone());
            let opts = opts.clone();

            let pages = stream::unfold(Some(0), move |offset: Option<usize>| {
                let step = offset.map(|offset| match self.fetch_page(&opts, offset) {
                    Ok((servers, next)) => (Ok(servers), next),
                    Err(e) => (Err(e), None),
                });
                future::ready(step)
            });

            pages
                .map_ok(|servers| stream::iter(servers.into_iter().map(Ok::<Server, ClientError>)))
                .try_flatten()
                .boxed()
        }
    }

    /// Convert raw address JSON into [`Addresses`], skipping nothing: values
    /// of the wrong shape become empty lists or empty descriptors.
    pub fn addresses_from_value(value: &Value) -> Addresses {
        let Some(networks) = value.as_object() else {
            return Addresses::new();
        };

        networks
            .iter()
            .map(|(network, list)| {
                let descriptors = list
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .map(|item| {
                                let text = |key: &str| {
                                    item.get(key).and_then(Value::as_str).map(str::to_string)
                                };
                                AddressDescriptor {
                                    addr: text("addr"),
                                    ip_type: text("OS-EXT-IPS:type"),
                                    version: item.get("version").and_then(Value::as_u64),
                                    mac_addr: text("OS-EXT-IPS-MAC:mac_addr"),
                                }
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                (network.clone(), descriptors)
            })
            .collect()
    }

    /// Build an ACTIVE server from raw address JSON.
    pub fn server(id: &str, name: &str, addresses: Value) -> Server {
        Server {
            id: id.to_string(),
            name: name.to_string(),
            active: true,
            addresses: addresses_from_value(&addresses),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{addresses_from_value, server, MockCompute};
    use super::*;
    use openstack::compute::AddressType;
    use serde_json::json;

    #[test]
    fn test_address_from_sdk() {
        let fixed = ServerAddress {
            addr: "10.0.0.5".parse().unwrap(),
            mac_addr: Some("fa:16:3e:00:00:01".to_string()),
            addr_type: Some(AddressType::Fixed),
        };
        assert_eq!(
            AddressDescriptor::from(&fixed),
            AddressDescriptor {
                addr: Some("10.0.0.5".to_string()),
                ip_type: Some("fixed".to_string()),
                version: Some(4),
                mac_addr: Some("fa:16:3e:00:00:01".to_string()),
            }
        );

        let untyped = ServerAddress {
            addr: "2001:db8::1".parse().unwrap(),
            mac_addr: None,
            addr_type: None,
        };
        let descriptor = AddressDescriptor::from(&untyped);
        assert_eq!(descriptor.ip_type, None);
        assert_eq!(descriptor.version, Some(6));
    }

    #[test]
    fn test_floating_type_name() {
        let floating = ServerAddress {
            addr: "172.24.4.3".parse().unwrap(),
            mac_addr: None,
            addr_type: Some(AddressType::Floating),
        };
        assert_eq!(
            AddressDescriptor::from(&floating).ip_type.as_deref(),
            Some("floating")
        );
    }

    #[test]
    fn test_addresses_from_value_is_lenient() {
        let value = json!({
            "good": [{"addr": "10.0.0.1", "OS-EXT-IPS:type": "fixed"}],
            "not-a-list": {"addr": "10.0.0.2"},
            "mixed": ["junk", {"addr": 7, "OS-EXT-IPS:type": "fixed"}]
        });
        let addresses = addresses_from_value(&value);

        assert_eq!(addresses["good"][0].addr.as_deref(), Some("10.0.0.1"));
        assert!(addresses["not-a-list"].is_empty());
        assert_eq!(addresses["mixed"].len(), 2);
        assert_eq!(addresses["mixed"][0], AddressDescriptor::default());
        assert_eq!(addresses["mixed"][1].addr, None);
        assert!(addresses_from_value(&json!(["x"])).is_empty());
    }

    #[test]
    fn test_list_opts() {
        let opts = ListOpts::active().with_name("^node-1$");
        assert_eq!(opts.name.as_deref(), Some("^node-1$"));
        assert!(opts.active_only);

        let unnamed = ListOpts::active().with_name("");
        assert_eq!(unnamed.name, None);
    }

    #[tokio::test]
    async fn test_mock_streams_lazily() {
        let servers = (0..5)
            .map(|i| server(&format!("id-{}", i), &format!("node-{}", i), json!({})))
            .collect();
        let compute = MockCompute::new(servers).with_page_size(2);
        let opts = ListOpts::active();

        let mut stream = compute.list_servers(&opts);
        assert_eq!(compute.call_count(), 0);

        let first = stream.try_next().await.unwrap().unwrap();
        assert_eq!(first.id, "id-0");
        assert_eq!(compute.call_count(), 1);

        let rest: Vec<Server> = stream.try_collect().await.unwrap();
        assert_eq!(rest.len(), 4);
        assert_eq!(compute.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_failure_ends_stream() {
        let compute = MockCompute::failing();
        let result: Result<Vec<Server>, ClientError> =
            compute.list_servers(&ListOpts::active()).try_collect().await;
        assert!(matches!(
            result,
            Err(ClientError::Api(ref e)) if e.kind() == openstack::ErrorKind::InternalServerError
        ));
        assert_eq!(compute.call_count(), 1);
    }
}
