use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

use crmsync_recon::config::JobConfig;
use crmsync_recon::engine::{run, Target};
use crmsync_recon::error::LookupError;
use crmsync_recon::model::{FoundObject, InputRow, ItemResult, Outcome, ResolvedOp, WriteResponse};
use crmsync_recon::pacing::Clock;
use crmsync_recon::resolve::KeyLookup;
use crmsync_recon::snapshot::{input_rows, read_table_file};
use crmsync_recon::submit::{AssociationKind, BatchWriter};
use crmsync_recon::{preflight, transform};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_job() -> JobConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("expertise_event.job.toml")).unwrap();
    JobConfig::from_toml(&toml).unwrap()
}

// -------------------------------------------------------------------------
// In-memory target
// -------------------------------------------------------------------------

#[derive(Default)]
struct RecordingClock {
    pauses: RefCell<Vec<Duration>>,
}

impl Clock for RecordingClock {
    fn sleep(&self, delay: Duration) {
        self.pauses.borrow_mut().push(delay);
    }
}

/// Objects keyed by (object_type, key). Searches on a type listed in
/// `failing` return HTTP 500 on the given 1-based call number.
#[derive(Default)]
struct FakeCrm {
    objects: HashMap<String, HashSet<String>>,
    failing: Vec<(String, usize)>,
    write_script: RefCell<Vec<WriteResponse>>,
    searches: RefCell<Vec<(String, usize)>>,
    writes: RefCell<Vec<usize>>,
}

impl FakeCrm {
    fn with_objects(mut self, object_type: &str, keys: &[&str]) -> Self {
        self.objects
            .entry(object_type.to_string())
            .or_default()
            .extend(keys.iter().map(|k| k.to_string()));
        self
    }

    fn lookups(&self) -> usize {
        self.searches.borrow().len()
    }
}

impl KeyLookup for FakeCrm {
    fn search(&self, object_type: &str, _property: &str, values: &[String], _limit: usize) -> Result<Vec<FoundObject>, LookupError> {
        let call = {
            let mut searches = self.searches.borrow_mut();
            searches.push((object_type.to_string(), values.len()));
            searches.iter().filter(|(t, _)| t == object_type).count()
        };
        if self.failing.iter().any(|(t, n)| t == object_type && *n == call) {
            return Err(LookupError::http(500, "Internal Server Error"));
        }
        let known = self.objects.get(object_type);
        Ok(values
            .iter()
            .filter(|v| known.is_some_and(|k| k.contains(*v)))
            .map(|v| FoundObject { id: format!("{object_type}:{v}"), key: Some(v.clone()) })
            .collect())
    }
}

impl BatchWriter for FakeCrm {
    fn write_batch(&self, _kind: &AssociationKind, ops: &[ResolvedOp]) -> WriteResponse {
        self.writes.borrow_mut().push(ops.len());
        let mut script = self.write_script.borrow_mut();
        if script.is_empty() {
            WriteResponse::Success
        } else {
            script.remove(0)
        }
    }
}

fn simple_job(page_size: usize) -> JobConfig {
    let mut job = load_job();
    job.batching.page_size = page_size;
    job.batching.max_batch_size = 100;
    job
}

fn numbered_rows(n: usize) -> Vec<InputRow> {
    (0..n).map(|i| InputRow::new(i, &format!("K{i}"), &format!("E{}", i % 40))).collect()
}

fn crm_for(job: &JobConfig, rows: &[InputRow]) -> FakeCrm {
    let left: Vec<&str> = rows.iter().map(|r| r.left_key.as_str()).collect();
    let right: Vec<&str> = rows.iter().map(|r| r.right_key.as_str()).collect();
    FakeCrm::default()
        .with_objects(&job.left.object_type, &left)
        .with_objects(&job.right.object_type, &right)
}

// -------------------------------------------------------------------------
// Driver scenarios
// -------------------------------------------------------------------------

#[test]
fn paging_makes_two_lookups_per_page() {
    let job = simple_job(100);
    let rows = numbered_rows(250);
    let crm = crm_for(&job, &rows);
    let clock = RecordingClock::default();

    let report = run(&job, &rows, Target { lookup: &crm, writer: &crm }, &clock);

    assert_eq!(report.summary.pages, 3);
    assert_eq!(report.summary.lookup_calls, 6);
    assert_eq!(crm.lookups(), 6);
    assert_eq!(*crm.writes.borrow(), vec![100, 100, 50]);
    assert_eq!(report.summary.resolved, 250);
}

#[test]
fn right_lookup_500_fails_only_its_page() {
    let job = simple_job(100);
    let rows = numbered_rows(250);
    let mut crm = crm_for(&job, &rows);
    crm.failing.push((job.right.object_type.clone(), 2));
    let clock = RecordingClock::default();

    let report = run(&job, &rows, Target { lookup: &crm, writer: &crm }, &clock);

    for o in &report.outcomes[100..200] {
        assert_eq!(o.outcome, Outcome::BatchLookupError);
        assert!(o.detail.as_deref().unwrap().contains("HTTP 500"));
    }
    assert!(report.outcomes[200..].iter().all(|o| o.outcome == Outcome::Resolved));
    assert_eq!(report.summary.batch_lookup_errors, 100);
    assert_eq!(report.summary.resolved, 150);
    assert_eq!(*crm.writes.borrow(), vec![100, 50]);
}

#[test]
fn full_success_chunk_resolves_all_rows() {
    let job = simple_job(100);
    let rows = numbered_rows(100);
    let crm = crm_for(&job, &rows);
    let clock = RecordingClock::default();

    let report = run(&job, &rows, Target { lookup: &crm, writer: &crm }, &clock);

    assert_eq!(report.summary.resolved, 100);
    assert_eq!(report.summary.errors, 0);
    assert!(clock.pauses.borrow().is_empty());
}

#[test]
fn multi_status_chunk_splits_resolved_and_errors() {
    let job = simple_job(100);
    let rows = numbered_rows(100);
    let crm = crm_for(&job, &rows);
    let mut items: Vec<ItemResult> = (0..97)
        .map(|i| ItemResult { id: Some(format!("{}", 5000 + i)), status: None })
        .collect();
    items.extend((0..3).map(|_| ItemResult { id: None, status: Some("FAILED".into()) }));
    crm.write_script.borrow_mut().push(WriteResponse::MultiStatus(items));
    let clock = RecordingClock::default();

    let report = run(&job, &rows, Target { lookup: &crm, writer: &crm }, &clock);

    assert_eq!(report.summary.resolved, 97);
    assert_eq!(report.summary.submit_errors, 3);
    let rejected: Vec<usize> = report.rejects().map(|o| o.index).collect();
    assert_eq!(rejected, vec![97, 98, 99]);
}

#[test]
fn empty_left_key_is_missing_left_and_never_searched() {
    let job = simple_job(100);
    let rows = vec![InputRow::new(0, "   ", "E1"), InputRow::new(1, "K1", "E1")];
    let crm = crm_for(&job, &rows);
    let clock = RecordingClock::default();

    let report = run(&job, &rows, Target { lookup: &crm, writer: &crm }, &clock);

    assert_eq!(report.outcomes[0].outcome, Outcome::MissingLeft);
    assert_eq!(report.outcomes[1].outcome, Outcome::Resolved);
    // Only "K1" reached the left search.
    assert_eq!(crm.searches.borrow()[0], (job.left.object_type.clone(), 1));
}

#[test]
fn duplicate_response_counts_as_already_exists() {
    let job = simple_job(100);
    let rows = numbered_rows(2);
    let crm = crm_for(&job, &rows);
    crm.write_script.borrow_mut().push(WriteResponse::MultiStatus(vec![
        ItemResult { id: None, status: Some("COMPLETE".into()) },
        ItemResult { id: None, status: Some("ALREADY_EXISTS".into()) },
    ]));
    let clock = RecordingClock::default();

    let report = run(&job, &rows, Target { lookup: &crm, writer: &crm }, &clock);

    assert_eq!(report.summary.resolved, 1);
    assert_eq!(report.summary.already_exists, 1);
    assert_eq!(report.summary.errors, 0);
}

// -------------------------------------------------------------------------
// Fixture job end to end
// -------------------------------------------------------------------------

#[test]
fn fixture_job_runs_against_known_objects() {
    let job = load_job();
    let table = read_table_file(&fixtures_dir().join(&job.input)).unwrap();
    let rows = input_rows(&job, &table).unwrap();
    let crm = FakeCrm::default()
        .with_objects(&job.left.object_type, &["11", "12", "13", "14"])
        .with_objects(&job.right.object_type, &["E-1", "E-2", "E-3"]);
    let clock = RecordingClock::default();

    let report = run(&job, &rows, Target { lookup: &crm, writer: &crm }, &clock);

    let tags: Vec<Outcome> = report.outcomes.iter().map(|o| o.outcome).collect();
    assert_eq!(
        tags,
        vec![
            Outcome::Resolved,
            Outcome::Resolved,
            Outcome::Resolved,
            Outcome::Resolved,
            Outcome::MissingLeft,
            Outcome::MissingLeft,
            Outcome::MissingRight,
            Outcome::Resolved,
            Outcome::Resolved,
        ]
    );
    let s = &report.summary;
    assert_eq!((s.total, s.resolved, s.missing_left, s.missing_right), (9, 6, 2, 1));
    assert_eq!(s.lookup_calls, 6);
    // Page 1 splits 4 ops into 3 + 1.
    assert_eq!(*crm.writes.borrow(), vec![3, 1, 1, 1]);
    assert_eq!(
        *clock.pauses.borrow(),
        vec![Duration::from_millis(200), Duration::from_secs(1), Duration::from_secs(1)]
    );
    assert_eq!(report.meta.job_name, "Expertise-Event");
}

#[test]
fn fixture_preflight_filters_orphans() {
    let job = load_job();
    let pre = job.preflight.clone().unwrap();
    let dir = fixtures_dir();
    let association = read_table_file(&dir.join(&job.input)).unwrap();
    let left = read_table_file(&dir.join(&pre.left_table)).unwrap();
    let right = read_table_file(&dir.join(&pre.right_table)).unwrap();

    let report = preflight::check(&job, &pre, &association, &left, &right).unwrap();

    assert_eq!(report.left.distinct, 5);
    assert_eq!(report.left.missing, vec!["99"]);
    assert_eq!(report.right.missing, vec!["E-404"]);
    assert_eq!((report.rows_before, report.rows_after), (9, 6));

    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("filtered.csv");
    crmsync_recon::snapshot::write_table(&path, &association.headers, &report.filtered_rows(&association)).unwrap();
    let filtered = read_table_file(&path).unwrap();
    assert_eq!(filtered.len(), 6);
    assert_eq!(filtered.headers, association.headers);
}

#[test]
fn fixture_transform_cleans_entity_snapshot() {
    let job = load_job();
    let rules = job.transform.clone().unwrap().columns;
    let table = read_table_file(&fixtures_dir().join("dwh.mv_expertise.csv")).unwrap();

    let (rows, stats) = transform::clean_table(&table, &rules);

    let opca: Vec<&str> = rows.iter().map(|r| r[2].as_str()).collect();
    assert_eq!(opca, vec!["TRUE", "FALSE", "TRUE", ""]);
    let created: Vec<&str> = rows.iter().map(|r| r[3].as_str()).collect();
    assert_eq!(created, vec!["1704067200000", "1704189600000", "", "1703980800000"]);
    assert_eq!(stats.columns["is_opca"].defaulted, 1);
    assert_eq!(stats.columns["DateCreation"].empty, 1);
    assert_eq!(stats.total_defaulted(), 1);
}
