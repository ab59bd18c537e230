use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use networth::core::CurrencyCode;
use networth::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Reference date for all reports (YYYY-MM-DD), defaults to today
    #[arg(short, long, global = true)]
    date: Option<NaiveDate>,

    /// Display currency, overrides the configured one
    #[arg(long, global = true)]
    currency: Option<CurrencyCode>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for networth::AppCommand {
    fn from(cmd: Commands) -> networth::AppCommand {
        match cmd {
            Commands::Metrics { json } => networth::AppCommand::Metrics { json },
            Commands::Obligations => networth::AppCommand::Obligations,
            Commands::Project {
                contribution,
                starting_balance,
                months,
            } => networth::AppCommand::Project {
                contribution,
                starting_balance,
                months,
            },
            Commands::Rates => networth::AppCommand::Rates,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display net worth, cash flow and asset allocation
    Metrics {
        /// Print the metrics as JSON
        #[arg(long)]
        json: bool,
    },
    /// List upcoming scheduled installments
    Obligations,
    /// Project the cash balance month by month
    Project {
        /// Monthly contribution, negative for withdrawals
        #[arg(long, allow_hyphen_values = true)]
        contribution: Option<f64>,
        /// Starting balance, defaults to total cash holdings
        #[arg(long, allow_hyphen_values = true)]
        starting_balance: Option<f64>,
        /// Number of months to project
        #[arg(long)]
        months: Option<u32>,
    },
    /// Display the exchange rates and metal prices in use
    Rates,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let options = networth::RunOptions {
        reference_date: cli
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        currency: cli.currency,
    };

    let result = match cli.command {
        Some(Commands::Setup) => networth::cli::setup::setup(),
        Some(cmd) => {
            networth::run_command(cmd.into(), cli.config_path.as_deref(), &options).await
        }
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
