use crate::error::LookupError;
use crate::model::{InputRow, Outcome, ResolutionMap, ResolvedOp, RowOutcome};

/// Rows of one page split into submittable operations and rejections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub resolved: Vec<ResolvedOp>,
    pub rejected: Vec<RowOutcome>,
}

/// Join a page of rows against both resolution maps.
///
/// Precedence:
/// - left lookup failed → every row `BatchLookupError`, right map ignored
/// - right lookup failed → every row `BatchLookupError`
/// - per row: left key missing → `MissingLeft`, else right key missing →
///   `MissingRight`, else resolved
pub fn classify(
    rows: &[InputRow],
    left: &Result<ResolutionMap, LookupError>,
    right: &Result<ResolutionMap, LookupError>,
) -> Classification {
    let (left_map, right_map) = match (left, right) {
        (Err(e), _) => return reject_all(rows, format!("left lookup failed: {e}")),
        (Ok(_), Err(e)) => return reject_all(rows, format!("right lookup failed: {e}")),
        (Ok(l), Ok(r)) => (l, r),
    };

    let mut resolved = Vec::new();
    let mut rejected = Vec::new();

    for row in rows {
        let left_id = left_map.get(&row.left_key).filter(|_| !row.left_key.is_empty());
        let right_id = right_map.get(&row.right_key).filter(|_| !row.right_key.is_empty());

        match (left_id, right_id) {
            (None, _) => rejected.push(RowOutcome::for_row(row, Outcome::MissingLeft, None)),
            (Some(_), None) => rejected.push(RowOutcome::for_row(row, Outcome::MissingRight, None)),
            (Some(l), Some(r)) => resolved.push(ResolvedOp {
                index: row.index,
                left_key: row.left_key.clone(),
                right_key: row.right_key.clone(),
                left_id: l.clone(),
                right_id: r.clone(),
            }),
        }
    }

    Classification { resolved, rejected }
}

fn reject_all(rows: &[InputRow], detail: String) -> Classification {
    Classification {
        resolved: Vec::new(),
        rejected: rows
            .iter()
            .map(|row| RowOutcome::for_row(row, Outcome::BatchLookupError, Some(detail.clone())))
            .collect(),
    }
}
