use crate::datamodel::{FailureKind, TransformResult};
use crate::dispatch::{Completion, UnitFailure};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct TransformReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// One entry per input record, in input order.
    pub results: Vec<TransformResult>,
}

/// Build the report of one thumbnail batch.
///
/// `keys` holds the object key of every input record, by position. Units
/// that never reported are turned into failures under their key.
pub fn collect_transform_results(
    keys: &[String],
    mut completions: Vec<Completion<TransformResult>>,
) -> TransformReport {
    completions.sort_by_key(|completion| completion.index);

    let results: Vec<TransformResult> = completions
        .into_iter()
        .map(|completion| match completion.result {
            Ok(result) => result,
            Err(failure) => {
                let key = keys[completion.index].clone();
                let kind = match failure {
                    UnitFailure::TimedOut => FailureKind::TransientIo,
                    UnitFailure::Panicked(_) => FailureKind::Internal,
                };
                warn!(key = %key, error = %failure, "Thumbnail unit did not report");
                TransformResult::failure(key, None, kind, failure.to_string())
            }
        })
        .collect();

    let succeeded = results.iter().filter(|result| result.is_success()).count();
    let report = TransformReport {
        total: results.len(),
        succeeded,
        failed: results.len() - succeeded,
        results,
    };

    info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        "Thumbnail batch finished"
    );
    report
}
