//! Instance lookup over the server listing
//!
//! Lookups that must resolve to one server read the listing only until a
//! second match shows up, so later pages are never requested.

use futures::future;
use futures::stream::TryStreamExt;
use tracing::debug;

use super::addresses::{first_fixed_addr, select_address};
use crate::client::compute::ServerStream;
use crate::client::{ComputeApi, ListOpts, Server};
use crate::cloudprovider::CloudError;

/// Anchored, escaped name filter so the API's regex search matches `name` exactly.
///
/// `regex::escape` also escapes `-`, `#`, `&` and `~`. A backslash before
/// those is still a literal match in the database regex dialects Nova uses.
pub fn exact_name_filter(name: &str) -> String {
    format!("^{}$", regex::escape(name))
}

/// The only server in `servers`. Stops reading at the second one.
async fn exactly_one(mut servers: ServerStream<'_>) -> Result<Server, CloudError> {
    let found = servers.try_next().await?.ok_or(CloudError::NotFound)?;
    if servers.try_next().await?.is_some() {
        return Err(CloudError::MultipleResults);
    }
    Ok(found)
}

/// Names of all ACTIVE servers matching `name_filter`. Zero matches is not an error.
pub async fn find_instances<C>(compute: &C, name_filter: &str) -> Result<Vec<String>, CloudError>
where
    C: ComputeApi + ?Sized,
{
    let opts = ListOpts::active().with_name(name_filter);

    let names: Vec<String> = compute
        .list_servers(&opts)
        .map_ok(|server| server.name)
        .try_collect()
        .await?;

    debug!(
        count = names.len(),
        filter = name_filter,
        "Found {} instances matching {}: {:?}",
        names.len(),
        name_filter,
        names
    );
    Ok(names)
}

/// The one ACTIVE server named exactly `name`.
pub async fn get_server_by_name<C>(compute: &C, name: &str) -> Result<Server, CloudError>
where
    C: ComputeApi + ?Sized,
{
    let opts = ListOpts::active().with_name(exact_name_filter(name));
    exactly_one(compute.list_servers(&opts)).await
}

/// The one ACTIVE server whose first fixed address equals `ip`.
///
/// Servers without a fixed address never match.
pub async fn get_server_by_address<C>(compute: &C, ip: &str) -> Result<Server, CloudError>
where
    C: ComputeApi + ?Sized,
{
    let opts = ListOpts::active();
    let matching = compute
        .list_servers(&opts)
        .try_filter(|server| future::ready(first_fixed_addr(server).as_deref() == Some(ip)));
    exactly_one(Box::pin(matching)).await
}

/// Best single address of the server named `name`.
pub async fn get_address_by_name<C>(compute: &C, name: &str) -> Result<String, CloudError>
where
    C: ComputeApi + ?Sized,
{
    let server = get_server_by_name(compute, name).await?;
    select_address(&server)
}
