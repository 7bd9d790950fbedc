mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::compare::ChannelArgs;
use commands::format::FormatArgs;
use commands::session::SessionArgs;

/// Direct vs distributor Amazon channel profitability
#[derive(Parser)]
#[command(
    name = "cpc",
    version,
    about = "Compare direct and distributor Amazon channel profitability",
    long_about = "A CLI for comparing brand profit when selling directly on Amazon \
                  versus selling wholesale through a distributor. Figures use \
                  decimal precision and render exactly as the calculator page shows them."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log recompute activity to stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare both channels and report every derived figure
    Compare(ChannelArgs),
    /// Render the figures as the calculator page displays them
    Render(ChannelArgs),
    /// Run a single formatter on a value
    Format(FormatArgs),
    /// Replay field edits from stdin against a live calculator state
    Session(SessionArgs),
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

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Render(args) => commands::compare::run_render(args),
        Commands::Format(args) => commands::format::run_format(args),
        Commands::Session(args) => commands::session::run_session(args, &cli.output),
        Commands::Version => {
            println!("cpc {}", env!("CARGO_PKG_VERSION"));
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
