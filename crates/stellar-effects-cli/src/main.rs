//! stellar-effects - derive the effects of Stellar transactions
//!
//! ## Usage
//!
//! ```text
//! stellar-effects derive --envelope AAAA... --result AAAA... --meta AAAA...
//! stellar-effects derive-file request.json --pretty
//! stellar-effects sac-address USDC:GA5Z...KZVN --network public
//! stellar-effects sample-config > effects.toml
//! ```
//!
//! A request file is a JSON object with `network`, `envelope`, `result`,
//! `meta` (base64 XDR) and an optional `mapSac`.

mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stellar_effects::format::parse_asset;
use stellar_effects::{asset_contract_id, derive_transaction_effects, DeriveOptions};
use stellar_effects_crypto::contract_id_to_strkey;

use crate::config::CliConfig;
use crate::logging::{LogConfig, LogFormat};

/// Derive the semantic effects of Stellar transactions
#[derive(Parser)]
#[command(name = "stellar-effects")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Log output format (overrides the config file)
    #[arg(long, global = true)]
    log_format: Option<CliLogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum CliLogFormat {
    Text,
    Json,
}

impl From<CliLogFormat> for LogFormat {
    fn from(fmt: CliLogFormat) -> Self {
        match fmt {
            CliLogFormat::Text => LogFormat::Text,
            CliLogFormat::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Derive effects from base64 XDR arguments
    Derive {
        /// Network name or passphrase (overrides the config file)
        #[arg(long)]
        network: Option<String>,

        /// TransactionEnvelope XDR
        #[arg(long)]
        envelope: String,

        /// TransactionResult XDR
        #[arg(long)]
        result: String,

        /// TransactionMeta XDR
        #[arg(long)]
        meta: String,

        /// Attach the asset contract map to each operation
        #[arg(long)]
        map_sac: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Derive effects from a JSON request file
    DeriveFile {
        /// Path to the request
        path: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the contract address of an asset
    SacAddress {
        /// `native` or `CODE:ISSUER`
        asset: String,

        /// Network name or passphrase (overrides the config file)
        #[arg(long)]
        network: Option<String>,
    },

    /// Print sample configuration
    SampleConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&cli, &config)?;

    match cli.command {
        Commands::Derive {
            network,
            envelope,
            result,
            meta,
            map_sac,
            pretty,
        } => {
            let network = network.unwrap_or_else(|| config.network.name.clone());
            let options = DeriveOptions::from_base64(network, &envelope, &result, &meta)?
                .with_map_sac(map_sac || config.network.map_sac);
            cmd_derive(&options, pretty)
        }
        Commands::DeriveFile { path, pretty } => {
            let options = read_request(&path, &config)?;
            cmd_derive(&options, pretty)
        }
        Commands::SacAddress { asset, network } => {
            let network = network.unwrap_or_else(|| config.network.name.clone());
            cmd_sac_address(&asset, &network)
        }
        Commands::SampleConfig => cmd_sample_config(),
    }
}

fn init_logging(cli: &Cli, config: &CliConfig) -> anyhow::Result<()> {
    let level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let format = cli
        .log_format
        .map(LogFormat::from)
        .unwrap_or_else(|| LogFormat::parse(&config.logging.format));

    let base = if cli.trace || cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    let log_config = LogConfig {
        ansi_colors: config.logging.colors,
        ..base
    }
    .with_level(level)
    .with_format(format);

    logging::init(&log_config)?;
    tracing::debug!("Logging initialized");
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(cli: &Cli) -> anyhow::Result<CliConfig> {
    let config = match &cli.config {
        Some(path) => CliConfig::from_file_with_env(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let mut config = CliConfig::default();
            config.apply_env_overrides();
            config
        }
    };
    config.validate()?;
    Ok(config)
}

/// Parse a request file, filling in configured defaults.
fn read_request(path: &PathBuf, config: &CliConfig) -> anyhow::Result<DeriveOptions> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut options: DeriveOptions = serde_json::from_str(&content)
        .with_context(|| format!("parsing request {}", path.display()))?;
    if options.network.trim().is_empty() {
        options.network = config.network.name.clone();
    }
    options.map_sac |= config.network.map_sac;
    Ok(options)
}

fn cmd_derive(options: &DeriveOptions, pretty: bool) -> anyhow::Result<()> {
    let derived = derive_transaction_effects(options)?;
    let warnings = derived.warnings().count();
    if warnings > 0 {
        tracing::info!(warnings, "derivation finished with warnings");
    }
    let json = if pretty {
        serde_json::to_string_pretty(&derived)?
    } else {
        serde_json::to_string(&derived)?
    };
    println!("{}", json);
    Ok(())
}

fn cmd_sac_address(asset: &str, network: &str) -> anyhow::Result<()> {
    let parsed = parse_asset(asset.trim())
        .with_context(|| format!("invalid asset {:?}, expected native or CODE:ISSUER", asset))?;
    let network_id = config::network_id(network)?;
    let contract = asset_contract_id(&network_id, &parsed);
    println!("{}", contract_id_to_strkey(&contract));
    Ok(())
}

fn cmd_sample_config() -> anyhow::Result<()> {
    println!("{}", CliConfig::sample_config());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_derive_command() {
        let cli = Cli::parse_from([
            "stellar-effects",
            "derive",
            "--envelope",
            "AAAA",
            "--result",
            "BBBB",
            "--meta",
            "CCCC",
            "--map-sac",
        ]);
        match cli.command {
            Commands::Derive {
                network,
                envelope,
                map_sac,
                pretty,
                ..
            } => {
                assert_eq!(network, None);
                assert_eq!(envelope, "AAAA");
                assert!(map_sac);
                assert!(!pretty);
            }
            _ => panic!("Expected Derive command"),
        }
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::parse_from([
            "stellar-effects",
            "--verbose",
            "--log-format",
            "json",
            "sample-config",
        ]);
        assert!(cli.verbose);
        assert!(matches!(cli.log_format, Some(CliLogFormat::Json)));
        assert!(matches!(cli.command, Commands::SampleConfig));
    }

    #[test]
    fn test_cli_sac_address_command() {
        let cli = Cli::parse_from(["stellar-effects", "sac-address", "native", "--network", "public"]);
        match cli.command {
            Commands::SacAddress { asset, network } => {
                assert_eq!(asset, "native");
                assert_eq!(network.as_deref(), Some("public"));
            }
            _ => panic!("Expected SacAddress command"),
        }
    }

    #[test]
    fn test_request_file_takes_config_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"envelope": "AAAA", "result": "AAAB", "meta": "AAAC"}}"#
        )
        .unwrap();
        let mut config = CliConfig::default();
        config.network.map_sac = true;

        let options = read_request(&file.path().to_path_buf(), &config).unwrap();
        assert_eq!(options.network, "testnet");
        assert!(options.map_sac);
        assert_eq!(options.envelope, vec![0, 0, 0]);
    }
}
