//! `crmsync run`: resolve, classify, and submit one association job.

use std::path::{Path, PathBuf};

use crmsync_hub_client::{HubClient, HubError};
use crmsync_recon::snapshot::{input_rows, read_table_file, write_table};
use crmsync_recon::{ReconReport, Target, ThreadClock};

use crate::exit_codes::{EXIT_CLIENT_SETUP, EXIT_NOT_AUTH, EXIT_ROW_ERRORS};
use crate::{emit_json, job, CliError};

pub struct RunArgs {
    pub job: PathBuf,
    pub input: Option<PathBuf>,
    pub token: Option<String>,
    pub api_base: Option<String>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub rejects: Option<PathBuf>,
}

const REJECT_HEADERS: [&str; 5] = ["index", "left_key", "right_key", "outcome", "detail"];

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let job = job::load(&args.job)?;
    let config = &job.config;

    let input_path = args.input.clone().unwrap_or_else(|| job.path(&config.input));
    let table = read_table_file(&input_path)?;
    let rows = input_rows(config, &table)?;
    log::info!("{}: {} rows from {}", config.name, rows.len(), input_path.display());

    let client = HubClient::from_env(args.token.as_deref(), args.api_base.as_deref()).map_err(client_err)?;
    log::debug!("target {}", client.api_base());

    let report = crmsync_recon::run(config, &rows, Target { lookup: &client, writer: &client }, &ThreadClock);

    if let Some(path) = &args.rejects {
        write_rejects(path, &report)?;
    }
    if args.json || args.output.is_some() {
        emit_json(&report, args.json, args.output.as_deref())?;
    }

    print_summary(&report);

    if report.summary.errors > 0 {
        return Err(CliError::new(
            EXIT_ROW_ERRORS,
            format!("{} of {} rows not associated", report.summary.errors, report.summary.total),
        ));
    }
    Ok(())
}

fn client_err(err: HubError) -> CliError {
    match err {
        HubError::NotAuthenticated => CliError::new(EXIT_NOT_AUTH, err.to_string())
            .with_hint("or save {\"token\": \"...\"} to ~/.config/crmsync/auth.json"),
        HubError::Setup(_) => CliError::new(EXIT_CLIENT_SETUP, err.to_string()),
    }
}

fn reject_records(report: &ReconReport) -> Vec<Vec<String>> {
    report
        .rejects()
        .map(|o| {
            vec![
                o.index.to_string(),
                o.left_key.clone(),
                o.right_key.clone(),
                o.outcome.to_string(),
                o.detail.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

fn write_rejects(path: &Path, report: &ReconReport) -> Result<(), CliError> {
    let headers: Vec<String> = REJECT_HEADERS.iter().map(|h| h.to_string()).collect();
    let records = reject_records(report);
    write_table(path, &headers, &records).map_err(|e| CliError::output(e.to_string()))?;
    eprintln!("wrote {} rejected rows to {}", records.len(), path.display());
    Ok(())
}

fn print_summary(report: &ReconReport) {
    let s = &report.summary;
    eprintln!(
        "{}: {} rows in {} pages: {} resolved, {} already existed, {} errors",
        report.meta.job_name, s.total, s.pages, s.resolved, s.already_exists, s.errors,
    );
    if s.errors > 0 {
        eprintln!(
            "  missing_left {}, missing_right {}, batch_lookup_error {}, submit_error {}",
            s.missing_left, s.missing_right, s.batch_lookup_errors, s.submit_errors,
        );
    }
    eprintln!("  {} search calls, {} batch writes", s.lookup_calls, s.write_calls);
}
