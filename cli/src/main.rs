//! EVPulse CLI server
//!
//! Headless marketplace backend suitable for deployment as a systemd
//! service, Docker container, or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/evpulse/config.toml)
//! evpulse
//!
//! # Custom config path and port
//! evpulse --config /etc/evpulse/config.toml --port 8080
//!
//! # Validate config without starting
//! evpulse --check
//!
//! # Reconcile sessions and payments, report only
//! evpulse repair-charging --dry-run
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use evpulse::config::AppConfig;
use evpulse::infrastructure::database::mask_url;
use evpulse::server::{init_tracing, run_repair, ServerHandle, ServerOptions};

/// EVPulse: REST backend for an EV charging marketplace.
#[derive(Parser, Debug)]
#[command(
    name = "evpulse",
    version,
    about = "EV charging marketplace backend",
    long_about = "EVPulse REST API server for station discovery, bookings, \
                  charging sessions, wallet payments and reviews.\n\n\
                  Default config: ~/.config/evpulse/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "EVPULSE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip seeding the default accounts.
    #[arg(long)]
    no_seed: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fix completed sessions missing a cost and their payment records.
    RepairCharging {
        /// Report what would change without writing.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(evpulse::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            if cli.check {
                return Err(e.into());
            }
            error!("Using default configuration.");
        }
    }

    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    if cli.check {
        let issues = config.validate();
        println!("Config file : {}", config_path.display());
        println!("API address : {}", config.server.address());
        println!("Database    : {}", mask_url(&config.database.url));
        println!("Log level   : {}", config.logging.level);
        println!(
            "AI key      : {}",
            if config.ai_config().api_key.is_some() { "set" } else { "not set" }
        );
        if issues.is_empty() {
            println!("Configuration is valid");
            return Ok(());
        }
        for issue in &issues {
            println!("  - {}", issue);
        }
        return Err(format!("{} configuration problem(s)", issues.len()).into());
    }

    if let Some(Command::RepairCharging { dry_run }) = cli.command {
        let report = run_repair(&config, dry_run).await?;
        println!(
            "{}sessions repaired: {}, transactions repaired: {}, transactions created: {}",
            if report.dry_run { "[dry run] " } else { "" },
            report.sessions_repaired,
            report.transactions_repaired,
            report.transactions_created
        );
        return Ok(());
    }

    if cli.no_seed {
        warn!("Seeding disabled from the command line");
    }
    let handle = ServerHandle::start(ServerOptions {
        seed: config.seed.enabled && !cli.no_seed,
        auto_migrate: !cli.no_migrate,
        config,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
