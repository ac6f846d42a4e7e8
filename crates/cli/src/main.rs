// sheetflag - flag outliers in a Google Sheet column
// Reads one numeric column, fits an isolation forest, writes a flag column back.

mod exit_codes;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use sheetflag_config::{ConfigError, Settings};
use sheetflag_detect::DetectError;
use sheetflag_sheets_client::SheetsError;

use exit_codes::{detect_exit_code, sheets_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "sheetflag")]
#[command(about = "Flag outlier rows in a Google Sheet with an isolation forest")]
#[command(long_version = long_version())]
#[command(version)]
#[command(after_help = "\
With no options, settings come from ~/.config/sheetflag/config.toml when it
exists, otherwise from built-in defaults (service_account.json in the
current directory, spreadsheet 'Hires - ADT Preboarding').

Examples:
  sheetflag
  sheetflag --dry-run
  sheetflag -c hires.toml -v
  RUST_LOG=sheetflag_sheets_client=debug sheetflag --dry-run")]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Compute labels and print them as CSV without writing to the sheet
    #[arg(long)]
    dry_run: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    quiet: bool,

    /// Log HTTP requests and model parameters
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cmd_run(cli.config, cli.dry_run) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn cmd_run(config: Option<PathBuf>, dry_run: bool) -> Result<(), CliError> {
    let loaded = Settings::load(config.as_deref())?;
    match &loaded.source {
        Some(path) => log::debug!("Settings: {}", path.display()),
        None => log::debug!("Settings: built-in defaults"),
    }

    let stdout = std::io::stdout();
    let report = pipeline::run(&loaded.settings, dry_run, &mut stdout.lock())?;
    log::debug!(
        "{} / {}: {} rows, {} fitted, {} flagged, {} cells written",
        report.worksheet.spreadsheet_name,
        report.worksheet.title,
        report.rows,
        report.fitted,
        report.flagged,
        report.written.map(|w| w.updated_cells).unwrap_or(0),
    );
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self { code: EXIT_USAGE, message: err.to_string(), hint: None }
    }
}

impl From<SheetsError> for CliError {
    fn from(err: SheetsError) -> Self {
        let hint = match &err {
            SheetsError::Credentials(_) => {
                Some("download a JSON key for the service account and set `credentials` in the config".to_string())
            }
            SheetsError::Auth(_) => {
                Some("check that the Sheets and Drive APIs are enabled and the key has not been revoked".to_string())
            }
            SheetsError::SpreadsheetNotFound(_) => {
                Some("share the spreadsheet with the service account's client_email".to_string())
            }
            _ => None,
        };
        Self { code: sheets_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<DetectError> for CliError {
    fn from(err: DetectError) -> Self {
        let hint = match &err {
            DetectError::MissingColumns { present, .. } => {
                Some(format!("All I see are these columns: {:?}", present))
            }
            _ => None,
        };
        Self { code: detect_exit_code(&err), message: err.to_string(), hint }
    }
}
