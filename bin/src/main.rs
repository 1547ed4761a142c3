//! huangpu CLI - Data-quality audits for A-share daily bars.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;

use display::Format;

#[derive(Parser)]
#[command(name = "huangpu")]
#[command(about = "Data-quality audits for A-share daily bars", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh bars and adjustment factors from a provider export
    Update {
        /// Directory of per-symbol CSV files (<symbol>.csv, <symbol>.actions.csv)
        data_dir: PathBuf,

        /// Provider the export came from (eastmoney, baostock)
        #[arg(short, long, default_value = "eastmoney")]
        provider: String,

        /// Symbols to update. Defaults to every CSV file in the directory.
        #[arg(short, long, num_args = 1..)]
        symbols: Vec<String>,

        /// First date to load when a symbol has no history (YYYY-MM-DD)
        #[arg(long, default_value = "2000-01-01")]
        start: String,

        /// Last date to load (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        end: Option<String>,

        /// Maximum concurrent symbol updates
        #[arg(long, default_value = "8")]
        concurrency: usize,
    },

    /// Run the single-source rule engine over one provider's data
    Clean {
        /// Directory of per-symbol CSV files
        data_dir: PathBuf,

        /// Provider to audit (eastmoney, baostock)
        #[arg(short, long, default_value = "eastmoney")]
        provider: String,

        /// Symbols to audit. Defaults to every CSV file in the directory.
        #[arg(short, long, num_args = 1..)]
        symbols: Vec<String>,

        /// Trading-calendar file (one YYYY-MM-DD per line)
        #[arg(long)]
        calendar: Option<PathBuf>,

        /// Halt-announcement CSV file (symbol,start,resumption)
        #[arg(long)]
        halts: Option<PathBuf>,

        /// First date to load when a symbol has no history (YYYY-MM-DD)
        #[arg(long, default_value = "2000-01-01")]
        start: String,

        /// Last date to audit (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        end: Option<String>,

        /// Ignore watermarks and rescan full history
        #[arg(long)]
        full: bool,

        /// Write the issue report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Maximum concurrent symbol scans
        #[arg(long, default_value = "8")]
        concurrency: usize,

        /// Issue-buffer size that triggers a storage flush
        #[arg(long, default_value = "2000")]
        batch_size: usize,

        /// Override the watermark-state directory
        #[arg(long)]
        state_dir: Option<PathBuf>,
    },

    /// Reconcile two providers' series against each other
    Cross {
        /// Directory of CSV files for the first provider
        data_dir_a: PathBuf,

        /// Directory of CSV files for the second provider
        data_dir_b: PathBuf,

        /// First provider (eastmoney, baostock)
        #[arg(long, default_value = "eastmoney")]
        provider_a: String,

        /// Second provider (eastmoney, baostock)
        #[arg(long, default_value = "baostock")]
        provider_b: String,

        /// Symbols to reconcile. Defaults to CSV files in the first directory.
        #[arg(short, long, num_args = 1..)]
        symbols: Vec<String>,

        /// Trading-calendar file (one YYYY-MM-DD per line)
        #[arg(long)]
        calendar: Option<PathBuf>,

        /// First date to load when a symbol has no history (YYYY-MM-DD)
        #[arg(long, default_value = "2000-01-01")]
        start: String,

        /// Last date to load (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        end: Option<String>,

        /// Write the issue report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Maximum concurrent symbol tasks
        #[arg(long, default_value = "8")]
        concurrency: usize,

        /// Issue-buffer size that triggers a storage flush
        #[arg(long, default_value = "2000")]
        batch_size: usize,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }
    let default = match verbose {
        0 => "warn",
        1 => "huangpu=info",
        2 => "huangpu=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Update {
            data_dir,
            provider,
            symbols,
            start,
            end,
            concurrency,
        } => {
            commands::update::update(
                &data_dir,
                &provider,
                symbols,
                &start,
                end.as_deref(),
                concurrency,
                cli.quiet,
            )
            .await
        }
        Commands::Clean {
            data_dir,
            provider,
            symbols,
            calendar,
            halts,
            start,
            end,
            full,
            report,
            format,
            concurrency,
            batch_size,
            state_dir,
        } => {
            commands::clean::clean(commands::clean::CleanArgs {
                data_dir,
                provider,
                symbols,
                calendar,
                halts,
                start,
                end,
                full,
                report,
                format,
                concurrency,
                batch_size,
                state_dir,
                quiet: cli.quiet,
            })
            .await
        }
        Commands::Cross {
            data_dir_a,
            data_dir_b,
            provider_a,
            provider_b,
            symbols,
            calendar,
            start,
            end,
            report,
            format,
            concurrency,
            batch_size,
        } => {
            commands::cross::cross(commands::cross::CrossArgs {
                data_dir_a,
                data_dir_b,
                provider_a,
                provider_b,
                symbols,
                calendar,
                start,
                end,
                report,
                format,
                concurrency,
                batch_size,
                quiet: cli.quiet,
            })
            .await
        }
    }
}
