//! Job file loading shared by every subcommand.

use std::path::{Path, PathBuf};

use crmsync_recon::snapshot::{read_table_file, Table};
use crmsync_recon::JobConfig;

use crate::CliError;

/// A parsed job plus the directory its relative paths resolve against.
pub struct LoadedJob {
    pub config: JobConfig,
    pub base_dir: PathBuf,
}

impl LoadedJob {
    /// Resolve a path from the job file relative to the job's directory.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    pub fn read_table(&self, relative: &str) -> Result<Table, CliError> {
        Ok(read_table_file(&self.path(relative))?)
    }
}

pub fn load(path: &Path) -> Result<LoadedJob, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::input(format!("cannot read job file {}: {e}", path.display())))?;
    let config = JobConfig::from_toml(&text)
        .map_err(|e| CliError::config(format!("{}: {e}", path.display())))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    Ok(LoadedJob { config, base_dir })
}

pub fn cmd_validate(path: PathBuf) -> Result<(), CliError> {
    let job = load(&path)?;
    let c = &job.config;
    eprintln!(
        "{}: valid ({} {}.{} -> {} {}.{}, type {}/{})",
        c.name,
        c.left.key_column,
        c.left.object_type,
        c.left.key_property,
        c.right.key_column,
        c.right.object_type,
        c.right.key_property,
        c.relation.category,
        c.relation.type_id,
    );
    if c.preflight.is_some() {
        eprintln!("  preflight: configured");
    }
    if let Some(t) = &c.transform {
        eprintln!("  transform: {} column rule(s)", t.columns.len());
    }
    Ok(())
}
