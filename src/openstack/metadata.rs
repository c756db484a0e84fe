//! Identity of the instance this process runs on
//!
//! The cloud-init marker file is preferred since it needs no network. When it
//! is missing or empty the OpenStack metadata service is asked instead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, trace};

/// Written by cloud-init on first boot
pub const INSTANCE_ID_FILE: &str = "/var/lib/cloud/data/instance-id";

pub const METADATA_URL: &str = "http://169.254.169.254/openstack/2012-08-10/meta_data.json";

/// Timeout for the metadata request in seconds
pub const METADATA_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("cannot build metadata HTTP client: {0}")]
    Client(String),

    #[error("got unexpected status code when reading metadata from {url}: {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("cannot parse OpenStack metadata: {0}")]
    Parse(String),

    #[error("cannot parse OpenStack metadata, got empty uuid")]
    MissingUuid,
}

// ============================================================================
// SBIO: Pure functions (no I/O)
// ============================================================================

#[derive(Deserialize)]
struct MetadataDocument {
    #[serde(default, alias = "UUID")]
    uuid: String,
}

/// Extract the instance uuid from a metadata document. Other fields are ignored.
pub fn parse_metadata_uuid(data: &[u8]) -> Result<String, MetadataError> {
    let doc: MetadataDocument =
        serde_json::from_slice(data).map_err(|e| MetadataError::Parse(e.to_string()))?;

    if doc.uuid.is_empty() {
        return Err(MetadataError::MissingUuid);
    }
    Ok(doc.uuid)
}

/// Trimmed marker file content, or `None` when it is blank.
pub fn parse_instance_id_file(content: &str) -> Option<String> {
    let id = content.trim();
    (!id.is_empty()).then(|| id.to_string())
}

// ============================================================================
// I/O boundary
// ============================================================================

pub struct InstanceIdResolver {
    marker_path: PathBuf,
    metadata_url: String,
    http: reqwest::Client,
}

fn metadata_client(timeout: Duration) -> Result<reqwest::Client, MetadataError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MetadataError::Client(e.to_string()))
}

impl InstanceIdResolver {
    /// Resolver reading the cloud-init marker and the well-known metadata URL
    pub fn new() -> Result<Self, MetadataError> {
        Self::with_locations(INSTANCE_ID_FILE, METADATA_URL)
    }

    pub fn with_locations(
        marker_path: impl AsRef<Path>,
        metadata_url: impl Into<String>,
    ) -> Result<Self, MetadataError> {
        let http = metadata_client(Duration::from_secs(METADATA_TIMEOUT_SECS))?;

        Ok(Self {
            marker_path: marker_path.as_ref().to_path_buf(),
            metadata_url: metadata_url.into(),
            http,
        })
    }

    pub fn marker_path(&self) -> &Path {
        &self.marker_path
    }

    pub fn metadata_url(&self) -> &str {
        &self.metadata_url
    }

    /// Resolve the local instance id, trying the marker file first.
    pub async fn resolve(&self) -> Result<String, MetadataError> {
        match tokio::fs::read_to_string(&self.marker_path).await {
            Ok(content) => {
                if let Some(id) = parse_instance_id_file(&content) {
                    debug!(path = %self.marker_path.display(), id = %id, "Got instance id from file");
                    return Ok(id);
                }
                trace!(path = %self.marker_path.display(), "Instance id file is empty, trying metadata server");
            }
            Err(e) => {
                trace!(path = %self.marker_path.display(), error = %e, "Cannot read instance id file, trying metadata server");
            }
        }

        let id = self
            .fetch_from_metadata()
            .await
            .inspect_err(|e| debug!(url = %self.metadata_url, error = %e, "Cannot get instance id from metadata server"))?;

        debug!(url = %self.metadata_url, id = %id, "Got instance id from metadata server");
        Ok(id)
    }

    async fn fetch_from_metadata(&self) -> Result<String, MetadataError> {
        let response = self
            .http
            .get(&self.metadata_url)
            .send()
            .await
            .map_err(|e| MetadataError::Http(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(MetadataError::UnexpectedStatus {
                url: self.metadata_url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MetadataError::Http(e.to_string()))?;

        parse_metadata_uuid(&body)
    }
}
