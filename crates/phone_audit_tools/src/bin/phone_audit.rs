#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use phone_audit_tools::config::AuditSettings;
use phone_audit_tools::pipeline::audit_files;
use phone_audit_tools::writer::{write_report, ReportFormat};
use phone_audit_tools::ToolError;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: u8 = 2;
const EXIT_RESOURCE_EXHAUSTED: u8 = 3;

/// Phone bill audit for mission companionships.
#[derive(Parser, Debug)]
#[command(name = "phone_audit", version, about)]
struct Cli {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Audit a call feed against a directory feed
    Run(RunArgs),
    /// Print the default settings file
    Defaults,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Carrier call feed (.json, or tab-separated text)
    #[arg(long)]
    calls: PathBuf,

    /// Mission directory feed (.json, or tab-separated text)
    #[arg(long)]
    directory: PathBuf,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Year applied to call dates that carry only month and day
    #[arg(long)]
    year: Option<i32>,

    /// Transfer date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    transfer_date: Option<NaiveDate>,

    #[arg(long, value_enum, default_value = "json")]
    format: ReportFormat,

    /// Write the report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if is_resource_exhaustion(&err) {
                eprintln!("the data set exceeds the configured budgets; rerun with a smaller or filtered feed");
                ExitCode::from(EXIT_RESOURCE_EXHAUSTED)
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }
}

fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Run(args) => run(args),
        Commands::Defaults => {
            let text = AuditSettings::default()
                .to_toml_string()
                .context("failed to render default settings")?;
            print!("{text}");
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let settings = match &args.config {
        Some(path) => AuditSettings::from_file(path)?,
        None => AuditSettings::default(),
    }
    .with_overrides(args.year, args.transfer_date);

    let report = audit_files(&settings, &args.calls, &args.directory)
        .context("audit failed")?;
    info!(
        findings = report.total_findings(),
        skipped = report.ingest.skipped_records(),
        "audit complete"
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_report(&report, args.format, &mut BufWriter::new(file))?;
        }
        None => {
            let stdout = io::stdout();
            write_report(&report, args.format, &mut stdout.lock())?;
        }
    }
    Ok(())
}

fn is_resource_exhaustion(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ToolError>())
        .any(ToolError::is_resource_exhaustion)
}
