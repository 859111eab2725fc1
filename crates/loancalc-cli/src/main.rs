mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::loan::{AmortizeArgs, ScheduleArgs, YearlyArgs};
use commands::payment::PaymentArgs;

/// Loan amortization schedules with decimal precision
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Loan amortization schedules with decimal precision",
    long_about = "A CLI for level-payment loan calculations: monthly payment, \
                  month-by-month amortization with extra principal payments, \
                  yearly principal/interest totals and CSV export."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Amortize a loan: payment, totals, yearly breakdown and schedule preview
    Amortize(AmortizeArgs),
    /// Month-by-month payment schedule, optionally exported to CSV
    Schedule(ScheduleArgs),
    /// Principal and interest paid per calendar year
    Yearly(YearlyArgs),
    /// Quick monthly payment quote without a schedule
    Payment(PaymentArgs),
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
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!(output = ?cli.output, "parsed command line");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::loan::run_amortize(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Yearly(args) => commands::loan::run_yearly(args),
        Commands::Payment(args) => commands::payment::run_payment(args),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
