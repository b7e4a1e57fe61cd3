//! Bounded-batch submission of resolved associations.
//!
//! Chunks never exceed `max_batch_size`, keep input order, and are never
//! retried here. Every submitted op comes back with exactly one outcome.

use crate::config::JobConfig;
use crate::model::{ItemResult, Outcome, ResolvedOp, RowOutcome, WriteResponse};
use crate::pacing::Pacer;

/// Longest response body kept in a row's diagnostic detail.
const DETAIL_BODY_LIMIT: usize = 200;

/// Object type pair and association label for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationKind {
    pub from_object_type: String,
    pub to_object_type: String,
    pub category: String,
    pub type_id: u32,
}

impl AssociationKind {
    pub fn from_job(job: &JobConfig) -> Self {
        Self {
            from_object_type: job.left.object_type.clone(),
            to_object_type: job.right.object_type.clone(),
            category: job.relation.category.clone(),
            type_id: job.relation.type_id,
        }
    }
}

/// Bulk-write capability of the target system.
pub trait BatchWriter {
    /// Submit one chunk. Transport failures come back as
    /// `WriteResponse::Failure { status: None, .. }`.
    fn write_batch(&self, kind: &AssociationKind, ops: &[ResolvedOp]) -> WriteResponse;
}

#[derive(Debug, Default)]
pub struct SubmitReport {
    pub outcomes: Vec<RowOutcome>,
    pub calls: usize,
}

pub struct BatchSubmitter<'a> {
    writer: &'a dyn BatchWriter,
    max_batch_size: usize,
    pacer: &'a Pacer<'a>,
}

impl<'a> BatchSubmitter<'a> {
    pub fn new(writer: &'a dyn BatchWriter, max_batch_size: usize, pacer: &'a Pacer<'a>) -> Self {
        Self { writer, max_batch_size: max_batch_size.max(1), pacer }
    }

    pub fn submit(&self, kind: &AssociationKind, ops: &[ResolvedOp]) -> SubmitReport {
        let mut report = SubmitReport::default();
        let chunk_count = ops.len().div_ceil(self.max_batch_size);

        for (n, chunk) in ops.chunks(self.max_batch_size).enumerate() {
            let response = self.writer.write_batch(kind, chunk);
            report.calls += 1;

            if let WriteResponse::Failure { status, body } = &response {
                log::warn!(
                    "association batch {}/{} failed ({}): {}",
                    n + 1,
                    chunk_count,
                    status.map_or_else(|| "no response".to_string(), |s| format!("HTTP {s}")),
                    truncate(body, DETAIL_BODY_LIMIT),
                );
            }

            report.outcomes.extend(interpret(chunk, &response));

            if n + 1 < chunk_count {
                self.pacer.delay_between_batches();
            }
        }

        report
    }
}

/// Map one chunk's response onto per-op outcomes, positionally.
pub fn interpret(chunk: &[ResolvedOp], response: &WriteResponse) -> Vec<RowOutcome> {
    match response {
        WriteResponse::Success => chunk
            .iter()
            .map(|op| RowOutcome::for_op(op, Outcome::Resolved, None))
            .collect(),
        WriteResponse::MultiStatus(items) => chunk
            .iter()
            .enumerate()
            .map(|(i, op)| match items.get(i) {
                Some(item) => {
                    let (outcome, detail) = item_outcome(item);
                    RowOutcome::for_op(op, outcome, detail)
                }
                None => RowOutcome::for_op(
                    op,
                    Outcome::SubmitError,
                    Some("no per-item result returned".into()),
                ),
            })
            .collect(),
        WriteResponse::Failure { status, body } => {
            let detail = match status {
                Some(code) => format!("batch status {code}: {}", truncate(body, DETAIL_BODY_LIMIT)),
                None => format!("batch not delivered: {}", truncate(body, DETAIL_BODY_LIMIT)),
            };
            chunk
                .iter()
                .map(|op| RowOutcome::for_op(op, Outcome::SubmitError, Some(detail.clone())))
                .collect()
        }
    }
}

fn item_outcome(item: &ItemResult) -> (Outcome, Option<String>) {
    let status = item.status.as_deref().map(str::trim).unwrap_or("");

    if status.eq_ignore_ascii_case("ALREADY_EXISTS") || status.eq_ignore_ascii_case("DUPLICATE") {
        return (Outcome::AcceptedExisting, None);
    }
    let has_id = item.id.as_deref().is_some_and(|id| !id.trim().is_empty());
    if has_id || status.eq_ignore_ascii_case("COMPLETE") {
        return (Outcome::Resolved, None);
    }

    let detail = if status.is_empty() {
        "item carried neither id nor status".to_string()
    } else {
        format!("item status {status}")
    };
    (Outcome::SubmitError, Some(detail))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
