// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line access to per-domain configuration.

use clap::{Parser, Subcommand};
use hsconfig::domain::document::infer_value;
use hsconfig::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hsconfig")]
#[command(about = "Read and write per-domain client configuration", long_about = None)]
struct Cli {
    /// Settings file (created with defaults if missing)
    #[arg(short, long, env = "HSCONFIG_SETTINGS")]
    settings: Option<PathBuf>,

    /// Per-request timeout in milliseconds, overriding the settings file
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective config of a domain, or one value from it
    Get {
        /// Domain, e.g. `a.example.com` or `*.example.com`
        domain: String,
        /// `/`-separated path into the config, e.g. `ui/theme`
        key_path: Option<String>,
    },
    /// Replace the record of a domain, or set one value in it
    Set {
        /// Domain, e.g. `a.example.com` or `*.example.com`
        domain: String,
        /// JSON object, or a single value when `--key` is given
        body: String,
        /// `/`-separated path of the value to set
        #[arg(short, long)]
        key: Option<String>,
        /// Parse a single value as JSON instead of inferring its type
        #[arg(long)]
        json: bool,
    },
    /// Delete the record of a domain
    Delete {
        /// Domain, e.g. `a.example.com` or `*.example.com`
        domain: String,
    },
    /// List template domains
    Templates,
    /// Print the effective engine settings
    Settings,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let path = match cli.settings {
        Some(path) => path,
        None => EngineSettings::default_path()?,
    };
    let mut settings = EngineSettings::load_or_init(&path)?;
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.request_timeout_ms = Some(timeout_ms);
    }

    if let Commands::Settings = cli.command {
        print!("{}", settings.to_yaml_string()?);
        return Ok(());
    }

    let store = settings.store.open().await?;
    let service = CachedConfigService::builder()
        .with_settings(&settings)
        .with_shared_store(store)
        .without_sweeper()
        .build()?;
    let deadline = service.default_deadline();

    match cli.command {
        Commands::Get { domain, key_path } => {
            let domain = DomainId::from(domain);
            let value = match key_path {
                Some(key_path) => service.get_config_value(&domain, &key_path, deadline).await?,
                None => service.get_effective_config(&domain, deadline).await?.into(),
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Set {
            domain,
            body,
            key,
            json,
        } => {
            let domain = DomainId::from(domain);
            let effective = match key {
                Some(key_path) => {
                    let value = infer_value(&body, json)?;
                    service
                        .set_config_value(&domain, &key_path, value, deadline)
                        .await?
                }
                None => {
                    let record = Document::from_json_str(&body)?;
                    service.set_config(&domain, Some(record), deadline).await?
                }
            };
            println!("{}", effective);
        }
        Commands::Delete { domain } => {
            let remaining = service
                .delete_config(&DomainId::from(domain), deadline)
                .await?;
            println!("{}", remaining);
        }
        Commands::Templates => {
            for template in service.list_templates(deadline).await? {
                println!("{}", template);
            }
        }
        Commands::Settings => {}
    }

    Ok(())
}
