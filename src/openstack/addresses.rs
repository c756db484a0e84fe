//! Address extraction from server records

use crate::client::{Addresses, Server};
use crate::cloudprovider::{add_to_node_addresses, CloudError, NodeAddress, NodeAddressType};

/// Private address on a tenant network
pub const IP_TYPE_FIXED: &str = "fixed";

/// Separately allocated public address mapped onto a fixed address
pub const IP_TYPE_FLOATING: &str = "floating";

// ============================================================================
// SBIO: Pure functions (no I/O)
// ============================================================================

/// Addresses of type `ip_type` across all networks, in network order.
///
/// Only the first entry of each network is inspected. A network whose first
/// entry lacks an address or a type is skipped, as is one with a blank address.
pub fn find_addrs(addresses: &Addresses, ip_type: &str) -> Vec<String> {
    addresses
        .values()
        .filter_map(|entries| {
            let first = entries.first()?;
            let addr = first.addr.as_ref().filter(|a| !a.is_empty())?;
            (first.ip_type.as_deref()? == ip_type).then(|| addr.clone())
        })
        .collect()
}

/// First fixed address of a server, if it has one.
pub fn first_fixed_addr(server: &Server) -> Option<String> {
    find_addrs(&server.addresses, IP_TYPE_FIXED).into_iter().next()
}

/// The single best address for a server: first fixed, then first floating,
/// then the legacy IPv4 field, then the legacy IPv6 field.
pub fn select_address(server: &Server) -> Result<String, CloudError> {
    let floating = || find_addrs(&server.addresses, IP_TYPE_FLOATING).into_iter().next();
    let legacy = |field: &String| (!field.is_empty()).then(|| field.clone());

    first_fixed_addr(server)
        .or_else(floating)
        .or_else(|| legacy(&server.access_ipv4))
        .or_else(|| legacy(&server.access_ipv6))
        .ok_or(CloudError::NoAddressFound)
}

/// Every address of a server: fixed as internal, then floating as external,
/// then the legacy fields as external. Empty and repeated entries are dropped.
pub fn node_addresses(server: &Server) -> Vec<NodeAddress> {
    let mut addrs = Vec::new();

    add_to_node_addresses(
        &mut addrs,
        find_addrs(&server.addresses, IP_TYPE_FIXED)
            .into_iter()
            .map(|a| NodeAddress::new(NodeAddressType::InternalIP, a)),
    );

    add_to_node_addresses(
        &mut addrs,
        find_addrs(&server.addresses, IP_TYPE_FLOATING)
            .into_iter()
            .map(|a| NodeAddress::new(NodeAddressType::ExternalIP, a)),
    );

    // Access IPs are usually duplicates of the floating addresses.
    add_to_node_addresses(
        &mut addrs,
        [
            NodeAddress::new(NodeAddressType::ExternalIP, server.access_ipv6.clone()),
            NodeAddress::new(NodeAddressType::ExternalIP, server.access_ipv4.clone()),
        ],
    );

    addrs
}
