mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use procedure_gateway::ProcedureGatewayConfig;

/// PDA procedure gateway client
#[derive(Parser)]
#[command(name = "pda-cli")]
#[command(version, about = "PDA procedure gateway client - call stored procedures on a PDA service host")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a stored procedure
    Call(commands::CallArgs),
    /// Call a procedure described as JSON
    CallJson(commands::CallJsonArgs),
    /// Print the server clock
    ServerTime {
        /// Format key, e.g. "YYYY-MM-DD HH:DD:SS"
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Fetch the translation dictionary for a language
    Translations {
        #[arg(short, long)]
        language: String,
        #[command(flatten)]
        identity: commands::IdentityArgs,
    },
    /// Format a date locally, without contacting the server
    FormatDate {
        /// Format key, e.g. "YYYY-MM-DD"
        #[arg(short, long)]
        format: String,
        /// Date text or epoch milliseconds
        #[arg(short, long)]
        input: String,
        /// Render in UTC instead of local time
        #[arg(long)]
        utc: bool,
    },
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Offline; needs no configuration.
    if let Commands::FormatDate { format, input, utc } = &cli.command {
        commands::format_date(format, input, *utc);
        return Ok(());
    }

    // defaults -> YAML (if provided) -> env (PDA__*)
    let config = ProcedureGatewayConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Call(args) => commands::call(&config, args).await,
        Commands::CallJson(args) => commands::call_json(&config, &args).await,
        Commands::ServerTime { format } => commands::server_time(&config, format.as_deref()).await,
        Commands::Translations { language, identity } => {
            commands::translations(&config, &language, &identity).await
        }
        Commands::Check => {
            commands::check(&config);
            Ok(())
        }
        Commands::FormatDate { .. } => Ok(()),
    }
}
