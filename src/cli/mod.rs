//! CLI for probing an OpenStack cloud through the provider
//!
//! Subcommands:
//! - `validate` - Parse the config file without touching the network
//! - `zone` - Show the zone the provider reports
//! - `list` - List running instances
//! - `addresses` - Show the addresses of an instance
//! - `external-id` / `instance-id` - Show the provider ids of an instance
//! - `whoami` - Show the local instance id and node name

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;

pub use commands::*;
pub use display::*;

#[derive(Parser, Debug)]
#[command(name = "openstack-provider")]
#[command(about = "Query an OpenStack cloud the way a cluster orchestrator would")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the cloud provider config file
    #[arg(short, long, value_name = "FILE", env = "OPENSTACK_PROVIDER_CONFIG")]
    pub config: PathBuf,

    /// Override the cloud-init instance id file
    #[arg(long, value_name = "FILE", global = true)]
    pub instance_id_file: Option<PathBuf>,

    /// Override the metadata service URL
    #[arg(long, value_name = "URL", global = true)]
    pub metadata_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse the config file and print a summary
    Validate,

    /// Show the zone of the running provider
    Zone,

    /// List running instances whose name matches a regular expression
    List(ListArgs),

    /// Show the addresses of an instance
    Addresses(InstanceArgs),

    /// Show the external id of an instance
    #[command(name = "external-id")]
    ExternalId(InstanceArgs),

    /// Show the instance id of an instance
    #[command(name = "instance-id")]
    InstanceId(InstanceArgs),

    /// Show the local instance id and node name
    Whoami,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Name filter; empty lists every running instance
    #[arg(default_value = "")]
    pub filter: String,
}

/// Arguments for commands that act on one instance
#[derive(Parser, Debug)]
pub struct InstanceArgs {
    /// Instance name
    pub name: String,
}

impl Cli {
    /// Log filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_filter() {
        let cli = Cli::parse_from(["openstack-provider", "--config", "cloud.conf", "list", "web-"]);
        assert_eq!(cli.config, PathBuf::from("cloud.conf"));
        match cli.command {
            Commands::List(args) => assert_eq!(args.filter, "web-"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_defaults_to_all() {
        let cli = Cli::parse_from(["openstack-provider", "-c", "cloud.conf", "list"]);
        match cli.command {
            Commands::List(args) => assert_eq!(args.filter, ""),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_instance_commands() {
        let cli = Cli::parse_from(["openstack-provider", "-c", "c", "instance-id", "node-1"]);
        assert!(matches!(cli.command, Commands::InstanceId(ref a) if a.name == "node-1"));

        let cli = Cli::parse_from(["openstack-provider", "-c", "c", "external-id", "node-1"]);
        assert!(matches!(cli.command, Commands::ExternalId(ref a) if a.name == "node-1"));
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::parse_from(["openstack-provider", "-c", "c", "zone"]);
        assert_eq!(cli.log_level(), "warn");

        let cli = Cli::parse_from(["openstack-provider", "-c", "c", "-vv", "zone"]);
        assert_eq!(cli.log_level(), "debug");

        let cli = Cli::parse_from(["openstack-provider", "-c", "c", "whoami", "-vvvv"]);
        assert_eq!(cli.log_level(), "trace");
    }

    #[test]
    fn test_resolver_overrides() {
        let cli = Cli::parse_from([
            "openstack-provider",
            "-c",
            "c",
            "whoami",
            "--instance-id-file",
            "/tmp/id",
            "--metadata-url",
            "http://127.0.0.1:8775/meta_data.json",
        ]);
        assert_eq!(cli.instance_id_file, Some(PathBuf::from("/tmp/id")));
        assert_eq!(
            cli.metadata_url.as_deref(),
            Some("http://127.0.0.1:8775/meta_data.json")
        );
    }
}
