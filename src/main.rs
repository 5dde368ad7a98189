//! HSC Tutor - math and physics tutor backend with an admin-taught knowledge base.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hsc_tutor::config::{AppConfig, ConfigLoader};
use hsc_tutor::tutor::Tutor;
use hsc_tutor::web::TutorServer;

#[derive(Parser)]
#[command(
    name = "hsc-tutor",
    about = "HSC math and physics tutor backend",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a config file (overrides the default search paths).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Host address to bind to.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory holding index.html and admin.html.
        #[arg(long)]
        pages_dir: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Option<AppConfig> {
    let loader = path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    match loader.load() {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(mut config) = load_config(cli.config) else {
        return ExitCode::FAILURE;
    };

    match cli.command {
        Commands::Serve {
            host,
            port,
            pages_dir,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(pages_dir) = pages_dir {
                config.server.pages_dir = pages_dir;
            }

            let tutor = Tutor::from_config(&config);
            let server = TutorServer::new(tutor).with_config(config.server);

            let cancel = server.cancel_token();
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for shutdown signal");
                    return;
                }
                cancel.cancel();
            });

            if let Err(e) = server.run().await {
                tracing::error!(error = %e, "Server stopped with error");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Commands::Config => match toml::to_string_pretty(&config) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to render configuration");
                ExitCode::FAILURE
            }
        },
    }
}
