use std::collections::BTreeSet;

use crate::classify::classify;
use crate::config::JobConfig;
use crate::model::{InputRow, ReconMeta, ReconReport, ReconSummary, ResolutionMap, RowOutcome};
use crate::pacing::{Clock, Pacer};
use crate::resolve::{KeyLookup, KeyResolver};
use crate::submit::{AssociationKind, BatchSubmitter, BatchWriter};

/// Target-system capabilities the driver talks to.
pub struct Target<'a> {
    pub lookup: &'a dyn KeyLookup,
    pub writer: &'a dyn BatchWriter,
}

/// Run one job over the full snapshot. Returns one outcome per input row,
/// in input order, plus the aggregate summary.
///
/// Per page: resolve unique left keys, resolve unique right keys (skipped
/// when the left lookup failed), classify, submit the resolvable ops.
/// Lookup and write failures degrade rows; they never abort the run.
pub fn run(job: &JobConfig, rows: &[InputRow], target: Target<'_>, clock: &dyn Clock) -> ReconReport {
    let pacer = Pacer::new(&job.pacing, clock);
    let resolver = KeyResolver::new(target.lookup, job.batching.lookup_limit);
    let submitter = BatchSubmitter::new(target.writer, job.batching.max_batch_size, &pacer);
    let kind = AssociationKind::from_job(job);

    let page_size = job.batching.page_size.max(1);
    let page_count = rows.len().div_ceil(page_size);

    let mut summary = ReconSummary::default();
    let mut outcomes: Vec<RowOutcome> = Vec::with_capacity(rows.len());

    for (n, page) in rows.chunks(page_size).enumerate() {
        let first = n * page_size;
        log::info!(
            "{}: page {}/{} (rows {} to {})",
            job.name,
            n + 1,
            page_count,
            first + 1,
            first + page.len(),
        );

        let left_keys: BTreeSet<String> = page.iter().map(|r| r.left_key.clone()).collect();
        let right_keys: BTreeSet<String> = page.iter().map(|r| r.right_key.clone()).collect();

        let left = resolver.resolve(&job.left, &left_keys);
        summary.lookup_calls += left.calls;
        log_resolution("left", &job.left.key_property, &left_keys, &left.map);

        let right_map = if left.map.is_ok() {
            let right = resolver.resolve(&job.right, &right_keys);
            summary.lookup_calls += right.calls;
            log_resolution("right", &job.right.key_property, &right_keys, &right.map);
            right.map
        } else {
            // Not consulted: a failed left lookup rejects the whole page.
            Ok(ResolutionMap::new())
        };

        let classified = classify(page, &left.map, &right_map);
        let submitted = submitter.submit(&kind, &classified.resolved);
        summary.write_calls += submitted.calls;

        let mut page_outcomes = classified.rejected;
        page_outcomes.extend(submitted.outcomes);
        page_outcomes.sort_by_key(|o| o.index);
        debug_assert_eq!(page_outcomes.len(), page.len());

        for o in &page_outcomes {
            summary.record(o.outcome);
        }
        outcomes.extend(page_outcomes);
        summary.pages += 1;

        if n + 1 < page_count {
            pacer.delay_between_pages();
        }
    }

    ReconReport {
        meta: ReconMeta {
            job_name: job.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        outcomes,
    }
}

fn log_resolution(
    side: &str,
    property: &str,
    keys: &BTreeSet<String>,
    map: &Result<ResolutionMap, crate::error::LookupError>,
) {
    match map {
        Ok(m) => log::debug!("{side} {property}: found {}/{} unique keys", m.len(), keys.len()),
        Err(e) => log::warn!("{side} lookup on {property} failed for the whole page: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    use super::*;
    use crate::error::LookupError;
    use crate::model::{FoundObject, Outcome, ResolvedOp, WriteResponse};
    use crate::pacing::testing::RecordingClock;

    const JOB: &str = r#"
name = "t"
input = "t.csv"
[left]
object_type = "L"
key_property = "pk_l"
key_column = "l"
[right]
object_type = "R"
key_property = "pk_r"
key_column = "r"
[relation]
type_id = 1
"#;

    /// Finds every requested key except those starting with "x";
    /// `fail = (object_type, n)` makes the n-th search on that type fail.
    #[derive(Default)]
    struct Fake {
        fail: Option<(&'static str, usize)>,
        searches: RefCell<Vec<String>>,
        writes: Cell<usize>,
    }

    impl KeyLookup for Fake {
        fn search(&self, object_type: &str, _: &str, values: &[String], _: usize) -> Result<Vec<FoundObject>, LookupError> {
            let n = {
                let mut s = self.searches.borrow_mut();
                s.push(object_type.to_string());
                s.iter().filter(|o| *o == object_type).count()
            };
            if self.fail.is_some_and(|(obj, call)| obj == object_type && call == n) {
                return Err(LookupError::http(500, "internal"));
            }
            Ok(values
                .iter()
                .filter(|v| !v.starts_with('x'))
                .map(|v| FoundObject { id: format!("{object_type}-{v}"), key: Some(v.clone()) })
                .collect())
        }
    }

    impl BatchWriter for Fake {
        fn write_batch(&self, _: &AssociationKind, _: &[ResolvedOp]) -> WriteResponse {
            self.writes.set(self.writes.get() + 1);
            WriteResponse::Success
        }
    }

    fn rows(n: usize) -> Vec<InputRow> {
        (0..n).map(|i| InputRow::new(i, &format!("l{i}"), &format!("r{}", i % 7))).collect()
    }

    #[test]
    fn pages_resolve_and_submit() {
        let job = JobConfig::from_toml(JOB).unwrap();
        let fake = Fake::default();
        let clock = RecordingClock::default();
        let report = run(&job, &rows(250), Target { lookup: &fake, writer: &fake }, &clock);

        let s = &report.summary;
        assert_eq!(s.pages, 3);
        assert_eq!(s.lookup_calls, 6);
        assert_eq!(s.write_calls, 3);
        assert_eq!(s.total, 250);
        assert_eq!(s.resolved, 250);
        assert_eq!(report.outcomes.len(), 250);
        // Two page gaps, no intra-page chunk gaps (one chunk per page).
        assert_eq!(*clock.pauses.borrow(), vec![Duration::from_secs(1); 2]);
    }

    #[test]
    fn right_lookup_failure_degrades_only_that_page() {
        let job = JobConfig::from_toml(JOB).unwrap();
        let fake = Fake { fail: Some(("R", 2)), ..Fake::default() };
        let clock = RecordingClock::default();
        let report = run(&job, &rows(250), Target { lookup: &fake, writer: &fake }, &clock);

        let page2: Vec<Outcome> = report.outcomes[100..200].iter().map(|o| o.outcome).collect();
        assert!(page2.iter().all(|o| *o == Outcome::BatchLookupError));
        assert_eq!(report.summary.resolved, 150);
        assert_eq!(report.summary.batch_lookup_errors, 100);
        assert_eq!(report.summary.write_calls, 2);
    }

    #[test]
    fn left_lookup_failure_skips_right_lookup() {
        let job = JobConfig::from_toml(JOB).unwrap();
        let fake = Fake { fail: Some(("L", 1)), ..Fake::default() };
        let clock = RecordingClock::default();
        let report = run(&job, &rows(10), Target { lookup: &fake, writer: &fake }, &clock);

        assert_eq!(*fake.searches.borrow(), vec!["L".to_string()]);
        assert_eq!(report.summary.batch_lookup_errors, 10);
        assert_eq!(fake.writes.get(), 0);
    }

    #[test]
    fn outcomes_keep_input_order_with_mixed_results() {
        let job = JobConfig::from_toml(JOB).unwrap();
        let fake = Fake::default();
        let clock = RecordingClock::default();
        let input = vec![
            InputRow::new(0, "l0", "r0"),
            InputRow::new(1, "x1", "r1"),
            InputRow::new(2, "l2", "x2"),
            InputRow::new(3, "", "r3"),
            InputRow::new(4, "l4", "r4"),
        ];
        let report = run(&job, &input, Target { lookup: &fake, writer: &fake }, &clock);
        let tags: Vec<(usize, Outcome)> = report.outcomes.iter().map(|o| (o.index, o.outcome)).collect();
        assert_eq!(
            tags,
            vec![
                (0, Outcome::Resolved),
                (1, Outcome::MissingLeft),
                (2, Outcome::MissingRight),
                (3, Outcome::MissingLeft),
                (4, Outcome::Resolved),
            ]
        );
        let s = &report.summary;
        assert_eq!(s.resolved + s.already_exists + s.errors, s.total);
    }

    #[test]
    fn empty_input_makes_no_calls() {
        let job = JobConfig::from_toml(JOB).unwrap();
        let fake = Fake::default();
        let clock = RecordingClock::default();
        let report = run(&job, &[], Target { lookup: &fake, writer: &fake }, &clock);
        assert_eq!(report.summary, ReconSummary::default());
        assert!(fake.searches.borrow().is_empty());
    }
}
