//! Autopilot - a goal-driven autonomous agent

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{commands_command, help_command, init_command, run_command, status_command, RunArgs};

/// Autopilot - autonomous agent for your terminal
#[derive(Parser)]
#[command(name = "autopilot")]
#[command(about = "◆ A goal-driven autonomous agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config, workspace and AI settings
    Init,
    /// Run the agent loop
    Run {
        /// Agent name
        #[arg(short, long)]
        name: Option<String>,
        /// Agent role
        #[arg(short, long)]
        role: Option<String>,
        /// A goal; repeat for several
        #[arg(short, long = "goal")]
        goals: Vec<String>,
        /// Run every command without asking
        #[arg(short, long)]
        continuous: bool,
        /// Stop after this many cycles
        #[arg(short, long)]
        max_cycles: Option<u32>,
    },
    /// List the commands offered to the model
    Commands,
    /// Show the help text of one command
    Help {
        /// Command name
        command: String,
    },
    /// Show system status
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => {
            if let Err(e) = init_command().await {
                error!("Init failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Run {
            name,
            role,
            goals,
            continuous,
            max_cycles,
        } => {
            let args = RunArgs {
                name,
                role,
                goals,
                continuous,
                max_cycles,
            };
            if let Err(e) = run_command(args).await {
                error!("Run failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Commands => {
            if let Err(e) = commands_command().await {
                error!("Listing commands failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Help { command } => {
            if let Err(e) = help_command(&command).await {
                error!("Help failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Status => {
            if let Err(e) = status_command().await {
                error!("Status failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
