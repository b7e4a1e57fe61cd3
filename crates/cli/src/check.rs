//! `crmsync check`: offline orphan-key check against entity snapshots.

use std::path::PathBuf;

use crmsync_recon::preflight::{self, PreflightReport, SideCheck};
use crmsync_recon::snapshot::write_table;

use crate::exit_codes::{EXIT_ROW_ERRORS, EXIT_USAGE};
use crate::{emit_json, job, CliError};

/// Orphans listed per side in the human output before eliding.
const SAMPLE_LIMIT: usize = 5;

pub fn cmd_check(job_path: PathBuf, filtered: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let job = job::load(&job_path)?;
    let config = &job.config;
    let pre = config.preflight.as_ref().ok_or_else(|| {
        CliError::new(EXIT_USAGE, format!("{}: job has no [preflight] section", config.name))
            .with_hint("add left_table/left_column/right_table/right_column under [preflight]")
    })?;

    let association = job.read_table(&config.input)?;
    let left = job.read_table(&pre.left_table)?;
    let right = job.read_table(&pre.right_table)?;
    log::info!(
        "{}: association {} rows, {} {} rows, {} {} rows",
        config.name,
        association.len(),
        left.name,
        left.len(),
        right.name,
        right.len(),
    );

    let report = preflight::check(config, pre, &association, &left, &right)?;

    if let Some(path) = &filtered {
        write_table(path, &association.headers, &report.filtered_rows(&association))
            .map_err(|e| CliError::output(e.to_string()))?;
        eprintln!("wrote {} rows to {}", report.rows_after, path.display());
    }

    if json {
        emit_json(&report, true, None)?;
    }
    print_report(&report);

    if report.rows_dropped() > 0 {
        return Err(CliError::new(
            EXIT_ROW_ERRORS,
            format!("{} of {} rows reference missing keys", report.rows_dropped(), report.rows_before),
        ));
    }
    Ok(())
}

fn print_report(report: &PreflightReport) {
    eprintln!("{}:", report.job_name);
    print_side(&report.left);
    print_side(&report.right);
    eprintln!(
        "  rows: {} -> {} ({} dropped)",
        report.rows_before,
        report.rows_after,
        report.rows_dropped()
    );
}

fn print_side(side: &SideCheck) {
    eprintln!(
        "  {}: {:.1}% missing ({} of {})",
        side.key_column,
        side.missing_pct(),
        side.missing.len(),
        side.distinct,
    );
    if !side.missing.is_empty() {
        let sample: Vec<&str> = side.missing.iter().take(SAMPLE_LIMIT).map(String::as_str).collect();
        let more = side.missing.len().saturating_sub(SAMPLE_LIMIT);
        if more > 0 {
            eprintln!("    e.g. {} (+{} more)", sample.join(", "), more);
        } else {
            eprintln!("    {}", sample.join(", "));
        }
    }
}
