mod config_commands;
mod console;
mod profile_commands;

use std::path::{Path, PathBuf};

use {
    anyhow::Result,
    clap::{Parser, Subcommand},
    staffchat_config::StaffChatConfig,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "staffchat", about = "Staff and team chat bridge")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery in ./ and ~/.config/staffchat/).
    #[arg(long, global = true, env = "STAFFCHAT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive console session (default when no subcommand is provided).
    Console,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
    /// Inspect and edit persisted profiles.
    Profiles {
        #[command(subcommand)]
        action: profile_commands::ProfileAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Load the config named on the command line, or discover one.
pub(crate) fn load_config(path: Option<&Path>) -> Result<StaffChatConfig> {
    match path {
        Some(path) => staffchat_config::load_config(path),
        None => Ok(staffchat_config::discover_and_load()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "staffchat starting");

    match cli.command {
        None | Some(Commands::Console) => console::run(cli.config).await,
        Some(Commands::Config { action }) => {
            config_commands::handle_config(action, cli.config.as_deref())
        },
        Some(Commands::Profiles { action }) => {
            profile_commands::handle_profiles(action, cli.config.as_deref())
        },
    }
}
