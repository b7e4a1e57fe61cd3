//! `crmsync clean`: best-effort column coercion of a snapshot.

use std::path::PathBuf;

use crmsync_recon::snapshot::{read_table_file, write_table};
use crmsync_recon::transform::{clean_table, CoercionStats};

use crate::exit_codes::EXIT_USAGE;
use crate::{emit_json, job, CliError};

pub fn cmd_clean(job_path: PathBuf, input: PathBuf, output: PathBuf, json: bool) -> Result<(), CliError> {
    let job = job::load(&job_path)?;
    let rules = match &job.config.transform {
        Some(t) if !t.columns.is_empty() => &t.columns,
        _ => {
            return Err(CliError::new(
                EXIT_USAGE,
                format!("{}: job has no [transform.columns] rules", job.config.name),
            )
            .with_hint("map column names to rules, e.g. DateMAJ = \"date\""))
        }
    };

    let table = read_table_file(&input)?;
    for column in rules.keys() {
        if !table.headers.contains(column) {
            log::warn!("{}: rule for absent column '{column}' ignored", table.name);
        }
    }

    let (rows, stats) = clean_table(&table, rules);
    write_table(&output, &table.headers, &rows).map_err(|e| CliError::output(e.to_string()))?;

    if json {
        emit_json(&stats, true, None)?;
    }
    print_stats(&table.name, &stats);
    eprintln!("wrote {}", output.display());
    Ok(())
}

fn print_stats(name: &str, stats: &CoercionStats) {
    eprintln!("{name}: {} rows, {} fields defaulted", stats.rows, stats.total_defaulted());
    for (column, c) in &stats.columns {
        if c.defaulted > 0 {
            eprintln!("  {column}: {} converted, {} empty, {} defaulted", c.converted, c.empty, c.defaulted);
        }
    }
}
