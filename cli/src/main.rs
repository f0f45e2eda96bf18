//! steward: operator tool for a Steward delegation ledger data directory.

mod commands;
mod config;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use steward_types::AccountId;
use steward_utils::LogFormat;

use crate::config::StewardConfig;

#[derive(Parser)]
#[command(name = "steward", about = "Steward delegation ledger operator tool")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "STEWARD_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory holding the registry store.
    #[arg(long, env = "STEWARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// LMDB map size in MiB.
    #[arg(long, env = "STEWARD_MAP_SIZE_MB")]
    map_size_mb: Option<usize>,

    /// Log format: "human" or "json".
    #[arg(long, env = "STEWARD_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "STEWARD_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Inspect stored delegation registries.
    Registry {
        #[command(subcommand)]
        action: RegistryAction,
    },
    /// Database maintenance.
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(clap::Subcommand)]
enum ConfigAction {
    /// Write the effective configuration to a TOML file.
    Init {
        #[arg(long, default_value = "steward.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Subcommand)]
enum RegistryAction {
    /// List every delegator with a registry.
    List,
    /// Show one delegator's delegations and debts.
    Show {
        /// Delegator account id, 64 hex characters (optionally 0x-prefixed).
        #[arg(long)]
        delegator: AccountId,
    },
}

#[derive(clap::Subcommand)]
enum DbAction {
    /// Verify the data directory and its databases.
    Check,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<StewardConfig> {
        let base = match &self.config {
            Some(path) => StewardConfig::from_toml_file(path)?,
            None => StewardConfig::default(),
        };
        Ok(StewardConfig {
            data_dir: self.data_dir.clone().unwrap_or(base.data_dir),
            map_size_mb: self.map_size_mb.unwrap_or(base.map_size_mb),
            log_format: self.log_format.unwrap_or(base.log_format),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    steward_utils::init_logging(config.log_format, &config.log_level)?;

    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Init { path, force } => {
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
                std::fs::write(&path, config.to_toml_string()?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), "configuration written");
            }
        },
        Command::Registry { action } => {
            let env = commands::open_existing(&config.data_dir, config.map_size_bytes())?;
            match action {
                RegistryAction::List => print_json(&commands::list_registries(&env)?)?,
                RegistryAction::Show { delegator } => {
                    print_json(&commands::show_registry(&env, &delegator)?)?
                }
            }
        }
        Command::Db { action } => match action {
            DbAction::Check => {
                let summary = commands::check_database(&config)?;
                print_json(&summary)?;
                if !summary.healthy {
                    bail!("integrity check found {} error(s)", summary.errors.len());
                }
            }
        },
    }

    Ok(())
}
