mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::loan::{PaymentArgs, RateArgs, ScheduleArgs};
use commands::strategy::{CompareArgs, StrategyArgs};
use config::{Settings, DEFAULT_MAX_PERIODS};

/// Loan amortization schedules and extra-payment strategies
#[derive(Parser)]
#[command(
    name = "amort",
    version,
    about = "Loan amortization schedules and extra-payment strategies",
    long_about = "Computes fixed-instalment amortization tables with decimal precision and \
                  evaluates extra payments: single, recurring, windowed and scheduled lump \
                  sums, installment reduction, and side-by-side comparisons."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine decisions to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Largest number of periods accepted for a loan
    #[arg(long, default_value_t = DEFAULT_MAX_PERIODS, global = true)]
    max_periods: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Effective per-period rate from a nominal annual rate
    Rate(RateArgs),
    /// Fixed periodic payment for a loan
    Payment(PaymentArgs),
    /// Payment summary and full amortization table
    Schedule(ScheduleArgs),
    /// Evaluate one extra-payment strategy against the baseline
    Strategy(StrategyArgs),
    /// Compare several strategies side by side
    Compare(CompareArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    config::init_logging(cli.verbose);

    let settings = Settings {
        max_periods: cli.max_periods,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Rate(args) => commands::loan::run_rate(args),
        Commands::Payment(args) => commands::loan::run_payment(args, &settings),
        Commands::Schedule(args) => commands::loan::run_schedule(args, &settings),
        Commands::Strategy(args) => commands::strategy::run_strategy(args, &settings),
        Commands::Compare(args) => commands::strategy::run_compare(args, &settings),
        Commands::Version => {
            println!("amort {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
