//! catalog-graph CLI - query a package catalog from the command line

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use catalog_graph::config::{self, CatalogConfig};
use catalog_graph::{ApiKey, CatalogResolver, CatalogStore, QueryContext};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "catalog-graph")]
#[command(version)]
#[command(about = "Read-only queries over a package catalog")]
#[command(long_about = r#"
catalog-graph answers questions about a package catalog:
  • Packages, their channels and channel heads
  • Upgrade edges between bundles (what replaces what)
  • Which bundles provide an API (group/version/kind)

Example usage:
  catalog-graph --database bundles.db packages
  catalog-graph --database bundles.db head etcd alpha
  catalog-graph --database bundles.db provider etcd.database.coreos.com/v1/EtcdCluster
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the catalog database (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Abort queries that run longer than this
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List package names
    Packages,

    /// Show a package's default channel and channel heads
    Package {
        name: String,

        /// Report at most this many channels
        #[arg(long)]
        channel_limit: Option<usize>,
    },

    /// Print the payload of the head bundle of a channel
    Head { package: String, channel: String },

    /// Print the payload of a bundle
    Bundle { name: String },

    /// List channel entries that replace a bundle
    Replacements { bundle: String },

    /// Print the payload of the bundle that replaces a bundle in one channel
    Replacement {
        bundle: String,

        #[arg(short, long)]
        package: String,

        #[arg(long)]
        channel: String,
    },

    /// List channel entries providing an API (group/version/kind)
    Providers {
        api: String,

        /// Keep only the entry closest to each channel head
        #[arg(long)]
        latest: bool,
    },

    /// Print the payload of the default-channel bundle providing an API
    Provider { api: String },

    /// Show catalog row counts
    Stats,

    /// Write a config file with the current settings
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Human
    }
}

/// Print a JSON success envelope
pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    debug_assert!(!output_mode.is_human());
    let envelope = serde_json::json!({
        "ok": true,
        "command": command,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays parseable
    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };

    let mut settings: CatalogConfig = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    if let Some(database) = &cli.database {
        settings.database = Some(database.to_string_lossy().into_owned());
    }
    if cli.timeout_ms.is_some() {
        settings.query_timeout_ms = cli.timeout_ms;
    }
    if let Commands::Package { channel_limit: Some(limit), .. } = &cli.command {
        settings.package_channel_limit = Some(*limit);
    }

    settings.validate()?;

    let session = || open_session(&settings);

    match cli.command {
        Commands::Packages => commands::run_packages(output_mode, &session()?),
        Commands::Package { name, .. } => commands::run_package(output_mode, &session()?, &name),
        Commands::Head { package, channel } => {
            commands::run_head(output_mode, &session()?, &package, &channel)
        }
        Commands::Bundle { name } => commands::run_bundle(output_mode, &session()?, &name),
        Commands::Replacements { bundle } => {
            commands::run_replacements(output_mode, &session()?, &bundle)
        }
        Commands::Replacement { bundle, package, channel } => {
            commands::run_replacement(output_mode, &session()?, &bundle, &package, &channel)
        }
        Commands::Providers { api, latest } => {
            commands::run_providers(output_mode, &session()?, &api.parse::<ApiKey>()?, latest)
        }
        Commands::Provider { api } => commands::run_provider(output_mode, &session()?, &api.parse::<ApiKey>()?),
        Commands::Stats => commands::run_stats(output_mode, &session()?),
        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            commands::run_init(output_mode, &path, &settings, force)
        }
    }
}

/// Open the catalog and build the context every query of this run shares
fn open_session(settings: &CatalogConfig) -> anyhow::Result<commands::Session> {
    let database = settings.database_path();
    tracing::debug!(database = %database.display(), "opening catalog");
    let store = CatalogStore::open_with(&database, &settings.store_options())?;
    let resolver = CatalogResolver::with_options(Arc::new(store), settings.resolver_options());

    let ctx = match settings.query_timeout() {
        Some(timeout) => QueryContext::with_timeout(timeout),
        None => QueryContext::background(),
    };
    Ok(commands::Session { resolver, ctx })
}
