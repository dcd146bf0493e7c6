//! Extract command - load, filter and optionally reconcile statements.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use console::style;

use ledgerline_core::locale::format_amount;
use ledgerline_core::models::{ConfigFile, Configuration, SortField, TransactionCollection};
use ledgerline_core::processor::{self, CheckpointStatus, ValidationReport};
use ledgerline_core::RunLog;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Statement files or directories
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Walk directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// First booking day to keep (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last booking day to keep (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Reconcile against the configured balance checkpoints
    #[arg(long)]
    validate: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Print the transactions
    #[arg(short, long)]
    print: bool,

    /// Sort field for the listing
    #[arg(long, default_value = "date")]
    sort: SortField,
}

pub fn run(args: ExtractArgs, config_path: Option<&Path>) -> anyhow::Result<ExitCode> {
    let start = Instant::now();

    let file = match config_path {
        Some(path) => ConfigFile::load(path)
            .with_context(|| format!("cannot use configuration {}", path.display()))?,
        None => ConfigFile::default(),
    };

    if let (Some(from), Some(to)) = (args.from, args.to) {
        if from > to {
            anyhow::bail!("--from {} is after --to {}", from, to);
        }
    }

    let mut config = Configuration {
        input_paths: args.paths,
        recursive: args.recursive,
        from_date: args.from,
        to_date: args.to,
        validate: args.validate,
        ..Configuration::default()
    }
    .with_file(file);
    if let Some(jobs) = args.jobs {
        config.jobs = jobs.max(1);
    }

    let log = RunLog::new();
    let mut output = processor::run(&config, &log);
    if args.sort != SortField::Date {
        output.transactions.sort_by(args.sort);
    }

    if args.print {
        print_listing(&output.transactions);
    }
    if let Some(report) = &output.report {
        print_report(report);
    }

    let marker = if log.error_count() > 0 {
        style("✗").red()
    } else {
        style("✓").green()
    };
    println!(
        "{} {} transactions in {:?} ({} warnings, {} errors)",
        marker,
        output.transactions.len(),
        start.elapsed(),
        log.warning_count(),
        log.error_count()
    );

    Ok(ExitCode::from(exit_status(log.error_count())))
}

/// The error count, capped to the range of a process status.
fn exit_status(errors: usize) -> u8 {
    u8::try_from(errors).unwrap_or(u8::MAX)
}

fn print_listing(transactions: &TransactionCollection) {
    for t in transactions {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            t.date(),
            t.description(),
            format_amount(t.value()),
            t.sender().unwrap_or("-"),
            t.receiver().unwrap_or("-"),
            t.source(),
            t.owner().institute().unwrap_or("-"),
            t.id()
        );
    }
}

fn print_report(report: &ValidationReport) {
    for outcome in &report.outcomes {
        let (marker, detail) = match &outcome.status {
            CheckpointStatus::Passed => (style("✓").green(), String::new()),
            CheckpointStatus::PassedWithinMargin { difference } => (
                style("!").yellow(),
                format!(" (off by {})", format_amount(*difference)),
            ),
            CheckpointStatus::Failed {
                difference,
                transaction_ids,
            } => (
                style("✗").red(),
                format!(
                    " (off by {}, {} transactions)",
                    format_amount(*difference),
                    transaction_ids.len()
                ),
            ),
        };
        println!(
            "{} {} {}..{}: expected {}, computed {}{}",
            marker,
            outcome.institute,
            outcome.from,
            outcome.to,
            format_amount(outcome.expected),
            format_amount(outcome.computed),
            detail
        );
    }
}
