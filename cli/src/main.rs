//! dao-cli: run governance scenarios and inspect quadratic vote weights.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use dao_cli::{run_scenario, ScenarioConfig};
use dao_governance::vote_weight;
use dao_types::TokenAmount;
use dao_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "dao-cli", about = "Quadratic-voting treasury DAO tools")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "warn", env = "DAO_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "DAO_LOG_FORMAT", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a scenario file against an in-memory ledger and print the result.
    Simulate {
        /// Path to the scenario TOML file.
        #[arg(long)]
        config: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the quadratic vote weight a balance carries.
    Weight {
        /// Token balance in base units.
        balance: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, &cli.log_level);

    match cli.command {
        Command::Simulate { config, json } => {
            let scenario = ScenarioConfig::from_toml_file(&config)?;
            tracing::info!("loaded scenario from {}", config.display());
            let report = run_scenario(&scenario)
                .with_context(|| format!("scenario {} failed", config.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
        Command::Weight { balance } => {
            println!("{}", vote_weight(TokenAmount::new(balance)));
        }
    }
    Ok(())
}
