use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use goldrate::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch the latest quote and overwrite the stored snapshot once
    Run,
    /// Update rates daily at the configured time until interrupted
    Schedule,
    /// Display the stored snapshot
    Show,
    /// Display the next scheduled trigger times
    Next {
        /// Number of triggers to list
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
}

impl From<Commands> for goldrate::AppCommand {
    fn from(cmd: Commands) -> goldrate::AppCommand {
        match cmd {
            Commands::Run => goldrate::AppCommand::Run,
            Commands::Schedule => goldrate::AppCommand::Schedule,
            Commands::Show => goldrate::AppCommand::Show,
            Commands::Next { count } => goldrate::AppCommand::Next(count),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => goldrate::cli::setup::setup(),
        Some(cmd) => goldrate::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
