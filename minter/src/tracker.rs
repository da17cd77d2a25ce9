//! Ledger submission tracking
//!
//! Each ledger call runs on its own task so that an abandoned request never
//! cancels a transaction already in flight. The tracker records every
//! submission; when the caller stops waiting before the outcome is known the
//! entry is marked [`SubmissionStatus::Unconfirmed`] and the late outcome is
//! still recorded when it arrives. A call that itself reports
//! [`MintError::Timeout`] is also left unconfirmed, since the ledger may have
//! applied it.
//!
//! Settled entries are pruned oldest first once more than the retention limit
//! are held. Submitted and unconfirmed entries are never pruned.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{MintError, Result};

/// Kind of ledger write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LedgerOperation {
    /// One-time collection setup
    CreateCollection,

    /// Token mint
    Mint,

    /// Audit-log message
    Audit,
}

impl fmt::Display for LedgerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LedgerOperation::CreateCollection => "Collection creation",
            LedgerOperation::Mint => "Token mint",
            LedgerOperation::Audit => "Audit submission",
        };
        f.write_str(name)
    }
}

/// Lifecycle of one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "reason")]
pub enum SubmissionStatus {
    /// Sent, outcome not yet observed
    Submitted,

    /// Ledger confirmed the write
    Confirmed,

    /// Ledger or transport rejected the write
    Failed(String),

    /// Caller stopped waiting; the write may or may not have settled
    Unconfirmed,
}

impl SubmissionStatus {
    /// Whether no further transition is expected
    pub fn is_settled(&self) -> bool {
        matches!(self, SubmissionStatus::Confirmed | SubmissionStatus::Failed(_))
    }
}

/// Tracker entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    /// Submission id
    pub id: Uuid,

    /// Operation submitted
    pub operation: LedgerOperation,

    /// Current status
    pub status: SubmissionStatus,

    /// Submission time
    pub submitted_at: DateTime<Utc>,

    /// Last status change
    pub updated_at: DateTime<Utc>,

    /// Whether the outcome arrived after the caller stopped waiting
    pub late: bool,
}

/// Settled entries kept by default
pub const DEFAULT_SETTLED_RETENTION: usize = 256;

/// Counts by status over the retained entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSummary {
    /// In flight
    pub submitted: usize,
    /// Confirmed
    pub confirmed: usize,
    /// Failed
    pub failed: usize,
    /// Outcome unknown
    pub unconfirmed: usize,
}

/// Record of ledger submissions
#[derive(Debug)]
pub struct SubmissionTracker {
    entries: Mutex<HashMap<Uuid, SubmissionRecord>>,
    settled_retention: usize,
}

impl Default for SubmissionTracker {
    fn default() -> Self {
        Self::with_retention(DEFAULT_SETTLED_RETENTION)
    }
}

impl SubmissionTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tracker that keeps at most `settled_retention` settled entries
    pub fn with_retention(settled_retention: usize) -> Self {
        SubmissionTracker {
            entries: Mutex::new(HashMap::new()),
            settled_retention,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Uuid, SubmissionRecord>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new submission
    pub fn submit(&self, operation: LedgerOperation) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.entries().insert(
            id,
            SubmissionRecord {
                id,
                operation,
                status: SubmissionStatus::Submitted,
                submitted_at: now,
                updated_at: now,
                late: false,
            },
        );
        debug!("{} submitted as {}", operation, id);
        id
    }

    /// Record the observed outcome of a submission
    pub fn settle(&self, id: Uuid, status: SubmissionStatus) {
        let mut entries = self.entries();
        if let Some(record) = entries.get_mut(&id) {
            if record.status == SubmissionStatus::Unconfirmed {
                record.late = true;
                info!("{} {} settled late: {:?}", record.operation, id, status);
            }
            record.status = status;
            record.updated_at = Utc::now();
        }
        self.prune(&mut entries);
    }

    fn prune(&self, entries: &mut HashMap<Uuid, SubmissionRecord>) {
        let mut settled: Vec<(DateTime<Utc>, Uuid)> = entries
            .values()
            .filter(|r| r.status.is_settled())
            .map(|r| (r.updated_at, r.id))
            .collect();
        if settled.len() <= self.settled_retention {
            return;
        }
        settled.sort();
        let excess = settled.len() - self.settled_retention;
        for (_, id) in settled.into_iter().take(excess) {
            entries.remove(&id);
        }
        debug!("Pruned {} settled submissions", excess);
    }

    /// Mark a submission whose outcome the caller gave up waiting for
    pub fn mark_unconfirmed(&self, id: Uuid) {
        let mut entries = self.entries();
        if let Some(record) = entries.get_mut(&id) {
            if !record.status.is_settled() {
                record.status = SubmissionStatus::Unconfirmed;
                record.updated_at = Utc::now();
                warn!("{} {} is unconfirmed", record.operation, id);
            }
        }
    }

    /// Current record of a submission
    pub fn get(&self, id: Uuid) -> Option<SubmissionRecord> {
        self.entries().get(&id).cloned()
    }

    /// Submissions whose outcome is still unknown to the caller
    pub fn unconfirmed(&self) -> Vec<SubmissionRecord> {
        let mut records: Vec<SubmissionRecord> = self
            .entries()
            .values()
            .filter(|r| r.status == SubmissionStatus::Unconfirmed)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.submitted_at);
        records
    }

    /// Oldest unconfirmed submission of an operation, if any
    pub fn unconfirmed_submission(&self, operation: LedgerOperation) -> Option<Uuid> {
        self.entries()
            .values()
            .filter(|r| r.operation == operation && r.status == SubmissionStatus::Unconfirmed)
            .min_by_key(|r| r.submitted_at)
            .map(|r| r.id)
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether nothing is retained
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Counts by status
    pub fn summary(&self) -> TrackerSummary {
        let mut summary = TrackerSummary::default();
        for record in self.entries().values() {
            match record.status {
                SubmissionStatus::Submitted => summary.submitted += 1,
                SubmissionStatus::Confirmed => summary.confirmed += 1,
                SubmissionStatus::Failed(_) => summary.failed += 1,
                SubmissionStatus::Unconfirmed => summary.unconfirmed += 1,
            }
        }
        summary
    }

    /// Run a ledger call on its own task and wait up to `timeout` for it
    ///
    /// The task keeps running if the caller's future is dropped or the wait
    /// times out. A timeout, or a call that reports [`MintError::Timeout`],
    /// yields [`MintError::Unconfirmed`].
    pub async fn track<T, F>(
        self: &Arc<Self>,
        operation: LedgerOperation,
        timeout: Duration,
        call: F,
    ) -> Result<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let id = self.submit(operation);
        let tracker = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let outcome = call.await;
            match &outcome {
                Ok(_) => tracker.settle(id, SubmissionStatus::Confirmed),
                Err(MintError::Timeout { .. }) => tracker.mark_unconfirmed(id),
                Err(err) => tracker.settle(id, SubmissionStatus::Failed(err.to_string())),
            }
            outcome
        });

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(Err(MintError::Timeout { seconds, .. }))) => {
                warn!("{} {} got no ledger answer within {}s", operation, id, seconds);
                Err(MintError::Unconfirmed { operation, submission_id: id })
            }
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) => {
                error!("{} task {} aborted: {}", operation, id, join_error);
                self.settle(id, SubmissionStatus::Failed(join_error.to_string()));
                Err(MintError::Ledger(format!("{} task aborted: {}", operation, join_error)))
            }
            Err(_) => {
                self.mark_unconfirmed(id);
                Err(MintError::Unconfirmed { operation, submission_id: id })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_confirmed_submission() {
        let tracker = Arc::new(SubmissionTracker::new());
        let value = tracker
            .track(LedgerOperation::Mint, Duration::from_secs(1), async { Ok(7u64) })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(tracker.summary(), TrackerSummary { confirmed: 1, ..Default::default() });
    }

    #[tokio::test]
    async fn test_failed_submission() {
        let tracker = Arc::new(SubmissionTracker::new());
        let err = tracker
            .track::<(), _>(LedgerOperation::Audit, Duration::from_secs(1), async {
                Err(MintError::Ledger("rejected".to_string()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, MintError::Ledger(_)));
        assert_eq!(tracker.summary().failed, 1);
    }

    #[tokio::test]
    async fn test_timeout_marks_unconfirmed_and_records_late_outcome() {
        let tracker = Arc::new(SubmissionTracker::new());
        let (release, wait) = tokio::sync::oneshot::channel::<()>();

        let err = tracker
            .track(LedgerOperation::Mint, Duration::from_millis(20), async move {
                let _ = wait.await;
                Ok(1u64)
            })
            .await
            .unwrap_err();

        let id = match err {
            MintError::Unconfirmed { operation, submission_id } => {
                assert_eq!(operation, LedgerOperation::Mint);
                submission_id
            }
            other => panic!("unexpected error: {:?}", other),
        };
        assert_eq!(tracker.get(id).unwrap().status, SubmissionStatus::Unconfirmed);
        assert_eq!(tracker.unconfirmed().len(), 1);

        release.send(()).unwrap();
        for _ in 0..50 {
            if tracker.get(id).unwrap().status.is_settled() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let record = tracker.get(id).unwrap();
        assert_eq!(record.status, SubmissionStatus::Confirmed);
        assert!(record.late);
        assert!(tracker.unconfirmed().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_cancel_call() {
        let tracker = Arc::new(SubmissionTracker::new());
        let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();

        let waiting = {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move {
                tracker
                    .track(LedgerOperation::CreateCollection, Duration::from_secs(5), async move {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        let _ = done_tx.send(());
                        Ok(())
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;
        waiting.abort();

        done_rx.await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(tracker.summary().confirmed, 1);
    }

    #[tokio::test]
    async fn test_call_timeout_is_unconfirmed_not_failed() {
        let tracker = Arc::new(SubmissionTracker::new());
        let err = tracker
            .track::<(), _>(LedgerOperation::CreateCollection, Duration::from_secs(1), async {
                Err(MintError::Timeout { operation: LedgerOperation::CreateCollection, seconds: 30 })
            })
            .await
            .unwrap_err();

        let id = match err {
            MintError::Unconfirmed { submission_id, .. } => submission_id,
            other => panic!("unexpected error: {:?}", other),
        };
        assert_eq!(tracker.get(id).unwrap().status, SubmissionStatus::Unconfirmed);
        assert_eq!(tracker.unconfirmed_submission(LedgerOperation::CreateCollection), Some(id));
        assert_eq!(tracker.unconfirmed_submission(LedgerOperation::Mint), None);
        assert_eq!(tracker.summary().failed, 0);
    }

    #[test]
    fn test_settled_entries_are_pruned_but_unconfirmed_kept() {
        let tracker = SubmissionTracker::with_retention(2);
        let pending = tracker.submit(LedgerOperation::CreateCollection);
        tracker.mark_unconfirmed(pending);
        let in_flight = tracker.submit(LedgerOperation::Audit);

        for _ in 0..5 {
            let id = tracker.submit(LedgerOperation::Mint);
            tracker.settle(id, SubmissionStatus::Confirmed);
        }

        assert_eq!(tracker.len(), 4);
        assert_eq!(
            tracker.summary(),
            TrackerSummary { submitted: 1, confirmed: 2, failed: 0, unconfirmed: 1 }
        );
        assert!(tracker.get(pending).is_some());
        assert!(tracker.get(in_flight).is_some());
    }

    #[test]
    fn test_settled_entries_stay_settled() {
        let tracker = SubmissionTracker::new();
        let id = tracker.submit(LedgerOperation::Audit);
        tracker.settle(id, SubmissionStatus::Failed("no".to_string()));
        tracker.mark_unconfirmed(id);
        assert!(matches!(tracker.get(id).unwrap().status, SubmissionStatus::Failed(_)));
    }
}
