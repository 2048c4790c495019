//! Rapor - Directory-backed reporting portal

use clap::{Parser, Subcommand};
use rapor_api::PortalServer;
use rapor_core::config::RaporConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "rapor")]
#[command(author = "Rapor Team")]
#[command(version = rapor_core::VERSION)]
#[command(about = "Reporting portal with directory-backed authentication", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Bind address
    #[arg(long, env = "RAPOR_BIND_ADDRESS")]
    bind: Option<String>,

    /// Port number
    #[arg(short, long, env = "RAPOR_PORT")]
    port: Option<u16>,

    /// Directory server URL (ldap:// or ldaps://)
    #[arg(long, env = "RAPOR_DIRECTORY_URL")]
    directory_url: Option<String>,

    /// Directory base DN
    #[arg(long, env = "RAPOR_DIRECTORY_BASE_DN")]
    base_dn: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RAPOR_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Server,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &cli.config {
        RaporConfig::from_file(config_path)?
    } else {
        RaporConfig::from_env()
    };

    // Override with CLI args
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.directory_url {
        config.directory.url = url;
    }
    if let Some(base_dn) = cli.base_dn {
        config.directory.base_dn = base_dn;
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("rapor {}", rapor_core::VERSION);
        }
        Some(Commands::Server) | None => {
            run_server(config).await?;
        }
    }

    Ok(())
}

async fn run_server(config: RaporConfig) -> anyhow::Result<()> {
    info!("Starting Rapor server...");
    info!("Database: {}", config.database.url);
    info!("Directory: {}", config.directory.url);

    let server = PortalServer::new(config);
    server.run().await?;

    Ok(())
}
