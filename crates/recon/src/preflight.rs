//! Offline orphan check: which association keys have no row in the
//! corresponding entity snapshot.
//!
//! Runs before any network call. The filtered table keeps only rows whose
//! two keys both exist, so a later `run` over it should see no
//! missing-side outcomes caused by stale exports.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::{JobConfig, PreflightConfig};
use crate::error::ReconError;
use crate::model::normalize_key;
use crate::snapshot::Table;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideCheck {
    pub key_column: String,
    /// Distinct non-empty keys referenced by the association table.
    pub distinct: usize,
    /// Sorted distinct keys absent from the entity table.
    pub missing: Vec<String>,
}

impl SideCheck {
    pub fn missing_pct(&self) -> f64 {
        if self.distinct == 0 {
            0.0
        } else {
            self.missing.len() as f64 * 100.0 / self.distinct as f64
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PreflightReport {
    pub job_name: String,
    pub left: SideCheck,
    pub right: SideCheck,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Indices (into the association table) of rows whose two keys exist.
    #[serde(skip)]
    pub kept: Vec<usize>,
}

impl PreflightReport {
    pub fn rows_dropped(&self) -> usize {
        self.rows_before - self.rows_after
    }

    /// Kept rows, in original order, ready for `write_table`.
    pub fn filtered_rows(&self, association: &Table) -> Vec<Vec<String>> {
        self.kept.iter().map(|&i| association.rows[i].clone()).collect()
    }
}

/// Compare the association table against both entity snapshots.
pub fn check(
    job: &JobConfig,
    preflight: &PreflightConfig,
    association: &Table,
    left_table: &Table,
    right_table: &Table,
) -> Result<PreflightReport, ReconError> {
    let left_existing = key_set(left_table, &preflight.left_column)?;
    let right_existing = key_set(right_table, &preflight.right_column)?;

    let left_idx = association.column(&job.left.key_column)?;
    let right_idx = association.column(&job.right.key_column)?;

    let mut left_refs = BTreeSet::new();
    let mut right_refs = BTreeSet::new();
    let mut kept = Vec::new();

    for (i, row) in association.rows.iter().enumerate() {
        let left = normalize_key(&row[left_idx]);
        let right = normalize_key(&row[right_idx]);
        let left_ok = !left.is_empty() && left_existing.contains(&left);
        let right_ok = !right.is_empty() && right_existing.contains(&right);
        if left_ok && right_ok {
            kept.push(i);
        }
        if !left.is_empty() {
            left_refs.insert(left);
        }
        if !right.is_empty() {
            right_refs.insert(right);
        }
    }

    let report = PreflightReport {
        job_name: job.name.clone(),
        left: side_check(&job.left.key_column, &left_refs, &left_existing),
        right: side_check(&job.right.key_column, &right_refs, &right_existing),
        rows_before: association.len(),
        rows_after: kept.len(),
        kept,
    };

    log::debug!(
        "{}: {} of {} left keys and {} of {} right keys missing",
        job.name,
        report.left.missing.len(),
        report.left.distinct,
        report.right.missing.len(),
        report.right.distinct,
    );

    Ok(report)
}

fn key_set(table: &Table, column: &str) -> Result<BTreeSet<String>, ReconError> {
    let idx = table.column(column)?;
    Ok(table
        .rows
        .iter()
        .map(|row| normalize_key(&row[idx]))
        .filter(|k| !k.is_empty())
        .collect())
}

fn side_check(column: &str, referenced: &BTreeSet<String>, existing: &BTreeSet<String>) -> SideCheck {
    SideCheck {
        key_column: column.to_string(),
        distinct: referenced.len(),
        missing: referenced.difference(existing).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::read_table;

    const JOB: &str = r#"
name = "Event-Club"
input = "dwh.event_club.csv"
[left]
object_type = "2-100"
key_property = "pk_evt"
key_column = "event_key"
[right]
object_type = "2-200"
key_property = "pkclub"
key_column = "club_key"
[relation]
type_id = 7
[preflight]
left_table = "dwh.mv_evt.csv"
left_column = "pk_evt"
right_table = "dwh.mv_club.csv"
right_column = "PKClub"
"#;

    fn run_check(assoc: &str, events: &str, clubs: &str) -> (PreflightReport, Table) {
        let job = JobConfig::from_toml(JOB).unwrap();
        let pre = job.preflight.clone().unwrap();
        let association = read_table("dwh.event_club.csv", assoc).unwrap();
        let left = read_table("dwh.mv_evt.csv", events).unwrap();
        let right = read_table("dwh.mv_club.csv", clubs).unwrap();
        let report = check(&job, &pre, &association, &left, &right).unwrap();
        (report, association)
    }

    #[test]
    fn counts_distinct_missing_keys() {
        let (report, association) = run_check(
            "event_key,club_key\nE1,C1\nE1,C2\nE9,C1\nE2,C8\nE2,C8\n",
            "pk_evt,title\nE1,a\nE2,b\n",
            "PKClub\nC1\nC2\n",
        );

        assert_eq!(report.left.distinct, 3);
        assert_eq!(report.left.missing, vec!["E9"]);
        assert_eq!(report.right.distinct, 3);
        assert_eq!(report.right.missing, vec!["C8"]);
        assert!((report.left.missing_pct() - 33.333).abs() < 0.01);

        assert_eq!(report.rows_before, 5);
        assert_eq!(report.rows_after, 2);
        assert_eq!(report.rows_dropped(), 3);
        assert_eq!(
            report.filtered_rows(&association),
            vec![vec!["E1".to_string(), "C1".to_string()], vec!["E1".to_string(), "C2".to_string()]]
        );
    }

    #[test]
    fn blank_keys_are_dropped_but_not_counted() {
        let (report, _) = run_check("event_key,club_key\n,C1\nE1, C1 \n", "pk_evt\nE1\n", "PKClub\nC1\n");
        assert_eq!(report.left.distinct, 1);
        assert!(report.left.missing.is_empty());
        assert_eq!(report.kept, vec![1]);
    }

    #[test]
    fn empty_association_has_zero_percent() {
        let (report, _) = run_check("event_key,club_key\n", "pk_evt\nE1\n", "PKClub\nC1\n");
        assert_eq!(report.left.missing_pct(), 0.0);
        assert_eq!(report.rows_after, 0);
    }

    #[test]
    fn missing_entity_column_is_an_error() {
        let job = JobConfig::from_toml(JOB).unwrap();
        let pre = job.preflight.clone().unwrap();
        let association = read_table("a.csv", "event_key,club_key\nE1,C1\n").unwrap();
        let left = read_table("dwh.mv_evt.csv", "id\nE1\n").unwrap();
        let right = read_table("dwh.mv_club.csv", "PKClub\nC1\n").unwrap();
        let err = check(&job, &pre, &association, &left, &right).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { .. }));
    }
}
