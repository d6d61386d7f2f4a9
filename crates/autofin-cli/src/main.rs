mod commands;
mod config;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::financing::{AmortizeArgs, PriceArgs, ResaleArgs};
use commands::payroll::PayrollArgs;
use commands::ranking::{LabelArgs, RankArgs, ScenariosArgs, ScoreArgs};
use commands::simulation::SimulateArgs;

/// Auto-financing plan scoring with Monte Carlo cash-flow risk
#[derive(Parser)]
#[command(
    name = "autofin",
    version,
    about = "Auto-financing plan scoring with Monte Carlo cash-flow risk",
    long_about = "Rank vehicle financing plans for a borrower by long-run affordability \
                  and default risk. Prices each plan, estimates resale value at the exit \
                  month, simulates monthly cash flow, and orders plans under a chosen \
                  tradeoff strategy."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Engine configuration file (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Level monthly payment for a loan
    Amortize(AmortizeArgs),
    /// Estimated resale value at an exit month
    Resale(ResaleArgs),
    /// Out-the-door price and financed principal for a borrower
    Price(PriceArgs),
    /// Run the cash-flow Monte Carlo simulation for one plan
    Simulate(SimulateArgs),
    /// Score a single plan for a borrower
    Score(ScoreArgs),
    /// Rank a catalog under one tradeoff strategy
    Rank(RankArgs),
    /// Rank a catalog under every tradeoff strategy
    Scenarios(ScenariosArgs),
    /// Label a batch of borrowers with their best plans
    Label(LabelArgs),
    /// Derive monthly income features from a paystub record
    Payroll(PayrollArgs),
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

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(1);
    }

    let engine = match config::load_engine_config(cli.config.as_deref()) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::financing::run_amortize(args),
        Commands::Resale(args) => commands::financing::run_resale(args, &engine),
        Commands::Price(args) => commands::financing::run_price(args),
        Commands::Simulate(args) => commands::simulation::run_simulate(args, &engine),
        Commands::Score(args) => commands::ranking::run_score(args, &engine),
        Commands::Rank(args) => commands::ranking::run_rank(args, &engine),
        Commands::Scenarios(args) => commands::ranking::run_scenarios(args, &engine),
        Commands::Label(args) => commands::ranking::run_label(args, &engine),
        Commands::Payroll(args) => commands::payroll::run_payroll(args),
        Commands::Version => {
            println!("autofin {}", env!("CARGO_PKG_VERSION"));
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
