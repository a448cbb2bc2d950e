//! Staggered batch execution of independent claim attempts.
//!
//! The stagger spreads outgoing requests over time so a batch never bursts
//! the remote API; it is not a concurrency limit — once its delay elapses,
//! every attempt is in flight at once. Attempts are fully isolated: one
//! failure never cancels or affects siblings, and the batch itself offers
//! no cancellation.

use std::future::Future;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;

use crate::error::Result;
use crate::farm::AttemptReport;

/// Fixed per-attempt start delay.
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(100);

/// Outcome of one attempt inside a batch. Exactly one of `data`/`error` is
/// set, keyed off `success`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutcome {
    /// 1-based attempt index.
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<AttemptReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate report over one batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total_times: usize,
    pub success_count: usize,
    pub failed_count: usize,
    /// Ordered by attempt index, regardless of completion order.
    pub results: Vec<AttemptOutcome>,
}

/// Run `times` independent invocations of `attempt` with staggered starts.
///
/// The i-th invocation (0-based) begins no earlier than `i * stagger` after
/// batch start. Every outcome is captured individually; the report's counts
/// partition the results on `success`, so `success_count + failed_count ==
/// times` holds even when every attempt fails.
pub async fn run_batch<F, Fut>(attempt: F, times: usize, stagger: Duration) -> BatchReport
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<AttemptReport>>,
{
    let attempt = &attempt;
    let staggered = (0..times).map(|i| async move {
        if i > 0 && !stagger.is_zero() {
            tokio::time::sleep(stagger * i as u32).await;
        }
        attempt(i).await
    });

    let settled = join_all(staggered).await;

    let results: Vec<AttemptOutcome> = settled
        .into_iter()
        .enumerate()
        .map(|(i, outcome)| match outcome {
            Ok(report) => AttemptOutcome {
                index: i + 1,
                success: true,
                data: Some(report),
                error: None,
            },
            Err(err) => AttemptOutcome {
                index: i + 1,
                success: false,
                data: None,
                error: Some(err.to_string()),
            },
        })
        .collect();

    let success_count = results.iter().filter(|r| r.success).count();
    let report = BatchReport {
        total_times: times,
        success_count,
        failed_count: results.len() - success_count,
        results,
    };
    tracing::info!(
        total = report.total_times,
        ok = report.success_count,
        failed = report.failed_count,
        "batch finished"
    );
    report
}
