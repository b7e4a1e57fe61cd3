// crmsync - reconcile warehouse association snapshots into CRM associations

mod check;
mod clean;
mod exit_codes;
mod job;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::{EXIT_INPUT_READ, EXIT_INVALID_CONFIG, EXIT_OUTPUT_WRITE, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "crmsync")]
#[command(about = "Resolve business keys to CRM ids and bulk-create associations")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve both sides of every row and create the associations
    #[command(after_help = "\
Examples:
  crmsync run jobs/expertise-event.toml
  crmsync run jobs/expertise-event.toml --rejects rejects.csv
  crmsync run jobs/expertise-event.toml --json > report.json
  CRMSYNC_TOKEN=pat-eu1-... crmsync run jobs/expertise-event.toml -v")]
    Run {
        /// Path to the job TOML file
        job: PathBuf,

        /// Override the snapshot path from the job file
        #[arg(long)]
        input: Option<PathBuf>,

        /// CRM private-app token (else CRMSYNC_TOKEN, else the saved auth file)
        #[arg(long)]
        token: Option<String>,

        /// CRM API root (else CRMSYNC_API_BASE, else the saved auth file)
        #[arg(long)]
        api_base: Option<String>,

        /// Print the full report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Write the full JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write every non-resolved row to a CSV file
        #[arg(long)]
        rejects: Option<PathBuf>,
    },

    /// Parse and validate a job file without running it
    #[command(after_help = "\
Examples:
  crmsync validate jobs/expertise-event.toml")]
    Validate {
        /// Path to the job TOML file
        job: PathBuf,
    },

    /// Find association keys missing from the entity snapshots (offline)
    #[command(after_help = "\
Examples:
  crmsync check jobs/expertise-event.toml
  crmsync check jobs/expertise-event.toml --filtered filtered/dwh.expertise_event.csv
  crmsync check jobs/expertise-event.toml --json")]
    Check {
        /// Path to the job TOML file (needs a [preflight] section)
        job: PathBuf,

        /// Write the association rows whose two keys exist
        #[arg(long)]
        filtered: Option<PathBuf>,

        /// Print the check result as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Coerce a snapshot's columns using the job's [transform.columns] rules
    #[command(after_help = "\
Examples:
  crmsync clean jobs/expertise.toml dwh.mv_expertise.csv -o clean/expertise.csv")]
    Clean {
        /// Path to the job TOML file (needs a [transform] section)
        job: PathBuf,

        /// CSV snapshot to clean
        input: PathBuf,

        /// Output CSV
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Print coercion stats as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\ntarget:  ", env!("TARGET"),
        "\nexit codes: 0 ok, 3 row errors, 10-12 job/io, 20-21 target",
    )
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run { job, input, token, api_base, json, output, rejects } => {
            run::cmd_run(run::RunArgs { job, input, token, api_base, json, output, rejects })
        }
        Commands::Validate { job } => job::cmd_validate(job),
        Commands::Check { job, filtered, json } => check::cmd_check(job, filtered, json),
        Commands::Clean { job, input, output, json } => clean::cmd_clean(job, input, output, json),
    };

    match result {
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

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_CONFIG, msg)
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT_READ, msg)
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::new(EXIT_OUTPUT_WRITE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<crmsync_recon::ReconError> for CliError {
    fn from(err: crmsync_recon::ReconError) -> Self {
        use crmsync_recon::ReconError;
        match err {
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => Self::config(err.to_string()),
            ReconError::MissingColumn { .. } | ReconError::Csv { .. } | ReconError::Io(_) => {
                Self::input(err.to_string())
            }
        }
    }
}

/// Serialize `value` as pretty JSON, optionally to stdout and/or a file.
pub fn emit_json<T: serde::Serialize>(value: &T, stdout: bool, file: Option<&std::path::Path>) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(exit_codes::EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(path) = file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::output(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }
    if stdout {
        println!("{json_str}");
    }
    Ok(())
}
