use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Keys + identifiers
// ---------------------------------------------------------------------------

/// Business key → target identifier for one object type.
///
/// Built fresh per page. A key absent from the map was looked up and not
/// found; it is never "not yet checked".
pub type ResolutionMap = HashMap<String, String>;

/// Normalize a raw business key for comparison: always a trimmed string.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_string()
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One record of the association snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    /// 0-based position in the snapshot. Traceability only.
    pub index: usize,
    pub left_key: String,
    pub right_key: String,
}

impl InputRow {
    pub fn new(index: usize, left_key: &str, right_key: &str) -> Self {
        Self {
            index,
            left_key: normalize_key(left_key),
            right_key: normalize_key(right_key),
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup results
// ---------------------------------------------------------------------------

/// One object returned by a filtered search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundObject {
    /// Identifier assigned by the target system.
    pub id: String,
    /// Value of the searched key property, if the target echoed it.
    pub key: Option<String>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// A row whose two keys both resolved, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOp {
    pub index: usize,
    pub left_key: String,
    pub right_key: String,
    pub left_id: String,
    pub right_id: String,
}

// ---------------------------------------------------------------------------
// Bulk write responses
// ---------------------------------------------------------------------------

/// Per-item entry of a multi-status response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemResult {
    pub id: Option<String>,
    pub status: Option<String>,
}

/// Interpreted shape of one bulk-write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResponse {
    /// All-or-nothing success signal.
    Success,
    /// Per-item results in submission order. May be shorter than the chunk.
    MultiStatus(Vec<ItemResult>),
    /// Any other status, or no response at all (`status: None`).
    Failure { status: Option<u16>, body: String },
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Resolved,
    AcceptedExisting,
    MissingLeft,
    MissingRight,
    BatchLookupError,
    SubmitError,
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Resolved | Self::AcceptedExisting)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved => write!(f, "resolved"),
            Self::AcceptedExisting => write!(f, "accepted_existing"),
            Self::MissingLeft => write!(f, "missing_left"),
            Self::MissingRight => write!(f, "missing_right"),
            Self::BatchLookupError => write!(f, "batch_lookup_error"),
            Self::SubmitError => write!(f, "submit_error"),
        }
    }
}

/// Final outcome of one input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    pub index: usize,
    pub left_key: String,
    pub right_key: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RowOutcome {
    pub fn for_row(row: &InputRow, outcome: Outcome, detail: Option<String>) -> Self {
        Self {
            index: row.index,
            left_key: row.left_key.clone(),
            right_key: row.right_key.clone(),
            outcome,
            detail,
        }
    }

    pub fn for_op(op: &ResolvedOp, outcome: Outcome, detail: Option<String>) -> Self {
        Self {
            index: op.index,
            left_key: op.left_key.clone(),
            right_key: op.right_key.clone(),
            outcome,
            detail,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total: usize,
    pub resolved: usize,
    pub already_exists: usize,
    pub errors: usize,
    pub missing_left: usize,
    pub missing_right: usize,
    pub batch_lookup_errors: usize,
    pub submit_errors: usize,
    pub pages: usize,
    pub lookup_calls: usize,
    pub write_calls: usize,
}

impl ReconSummary {
    /// Fold one row outcome into the counters.
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Resolved => self.resolved += 1,
            Outcome::AcceptedExisting => self.already_exists += 1,
            Outcome::MissingLeft => self.missing_left += 1,
            Outcome::MissingRight => self.missing_right += 1,
            Outcome::BatchLookupError => self.batch_lookup_errors += 1,
            Outcome::SubmitError => self.submit_errors += 1,
        }
        if outcome.is_error() {
            self.errors += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub job_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub outcomes: Vec<RowOutcome>,
}

impl ReconReport {
    /// Rows that did not end up `resolved`.
    pub fn rejects(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes.iter().filter(|o| o.outcome != Outcome::Resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_row_trims_keys() {
        let row = InputRow::new(4, "  EXP-1 ", "\tEVT-9\n");
        assert_eq!(row.left_key, "EXP-1");
        assert_eq!(row.right_key, "EVT-9");
        assert_eq!(row.index, 4);
    }

    #[test]
    fn summary_record_counts_errors() {
        let mut s = ReconSummary::default();
        for o in [
            Outcome::Resolved,
            Outcome::Resolved,
            Outcome::AcceptedExisting,
            Outcome::MissingLeft,
            Outcome::MissingRight,
            Outcome::BatchLookupError,
            Outcome::SubmitError,
        ] {
            s.record(o);
        }
        assert_eq!(s.total, 7);
        assert_eq!(s.resolved, 2);
        assert_eq!(s.already_exists, 1);
        assert_eq!(s.errors, 4);
        assert_eq!(s.resolved + s.already_exists + s.errors, s.total);
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&Outcome::BatchLookupError).unwrap();
        assert_eq!(json, "\"batch_lookup_error\"");
        assert_eq!(Outcome::AcceptedExisting.to_string(), "accepted_existing");
    }
}
