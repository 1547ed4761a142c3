//! Display utilities and report output for the huangpu CLI.

use anyhow::Result;
use clap::ValueEnum;
use huangpu_lib::prelude::*;
use huangpu_lib::{ProgressSink, TaskStatus};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Report format argument, mapped onto [`ReportFormat`].
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
}

impl Format {
    /// Returns the library-level format identifier.
    pub(crate) const fn report(self) -> ReportFormat {
        match self {
            Self::Csv => ReportFormat::Csv,
            Self::Json => ReportFormat::Json,
            Self::Ndjson => ReportFormat::Ndjson,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.report().extension())
    }
}

/// Write an issue report to a file in the specified format.
pub(crate) fn write_report(issues: &[Issue], output: &Path, format: ReportFormat) -> Result<()> {
    let file = File::create(output)?;
    let writer = BufWriter::new(file);

    match format {
        ReportFormat::Csv => {
            let formatter = CsvFormatter::new();
            formatter.write_issues(issues, writer)?;
        }
        ReportFormat::Json => {
            let formatter = JsonFormatter::new();
            formatter.write_issues(issues, writer)?;
        }
        ReportFormat::Ndjson => {
            let formatter = JsonFormatter::ndjson();
            formatter.write_issues(issues, writer)?;
        }
    }

    Ok(())
}

/// Progress sink backed by an indicatif bar, one tick per symbol.
pub(crate) struct SymbolProgress {
    bar: ProgressBar,
}

impl SymbolProgress {
    /// Creates a bar sized to the symbol universe; hidden in quiet mode.
    pub(crate) fn new(total: u64, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} symbols {msg}",
                    )
                    .expect("Invalid progress template")
                    .progress_chars("=>-"),
            );
            pb
        };
        Self { bar }
    }

    /// Finishes the bar with a summary message.
    pub(crate) fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
    }
}

impl ProgressSink for SymbolProgress {
    fn on_symbol_done(&self, symbol: &str, status: TaskStatus) {
        if status == TaskStatus::Failed {
            self.bar.set_message(format!("{symbol} failed"));
        }
        self.bar.inc(1);
    }
}
