use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use openstack_provider::cli::{
    external_id, format_config_summary, format_identity, format_instance_list,
    format_node_addresses, format_zone, get_zone, instance_id, instance_id_resolver,
    list_instances, node_addresses, system_hostname, validate_config, whoami, Cli, Commands,
};
use openstack_provider::OpenStack;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .init();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = validate_config(&cli.config)
        .with_context(|| format!("Failed to load config file {}", cli.config.display()))?;

    let output = match cli.command {
        Commands::Validate => format_config_summary(&config, &cli.config.display().to_string()),
        command => {
            let resolver =
                instance_id_resolver(cli.instance_id_file.as_deref(), cli.metadata_url.as_deref())?;
            let provider = OpenStack::with_resolver(config, &resolver)
                .await
                .context("Failed to create OpenStack provider")?;
            info!("Connected to region {}", provider.region());

            query(command, &provider).await?
        }
    };

    print!("{}", output);
    Ok(())
}

async fn query(command: Commands, provider: &OpenStack) -> anyhow::Result<String> {
    let output = match command {
        Commands::Validate => String::new(),
        Commands::Zone => format_zone(&get_zone(provider).await?),
        Commands::List(args) => format_instance_list(&list_instances(provider, &args.filter).await?),
        Commands::Addresses(args) => format_node_addresses(&node_addresses(provider, &args.name).await?),
        Commands::ExternalId(args) => format!("{}\n", external_id(provider, &args.name).await?),
        Commands::InstanceId(args) => format!("{}\n", instance_id(provider, &args.name).await?),
        Commands::Whoami => {
            let hostname = system_hostname()?;
            format_identity(&whoami(provider, provider.local_instance_id(), &hostname).await?)
        }
    };
    Ok(output)
}
