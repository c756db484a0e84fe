pub mod gcfg;
pub mod options;

pub use gcfg::{Document, Section, Variable};
pub use options::{Config, GlobalOpts, LoadBalancerOpts, RouteOpts};

use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading the provider config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no OpenStack cloud provider config file given")]
    Missing,

    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Invalid value '{value}' for {section}.{key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// Parse config text. Pure function - no I/O.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let doc = gcfg::parse(content)?;
    Config::from_document(&doc)
}

// ============================================================================
// SBIO: I/O wrappers - thin layer over pure functions
// ============================================================================

/// Read and parse a config stream. `None` means the host supplied no config.
pub fn read_config<R: Read>(config: Option<R>) -> Result<Config, ConfigError> {
    let Some(mut reader) = config else {
        return Err(ConfigError::Missing);
    };
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse_config(&content)
}

/// Load and parse a config file from disk.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}
