//! Batch execution.
//!
//! Runs the per-user pipelines with bounded concurrency and tracks which
//! users already finished so a restarted or overlapping run never renders
//! the same customer twice.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::info;

use pvgen_models::{CustomerRecord, PipelineOutcome};

use crate::pipeline::{process_customer, PipelineContext};

/// Shared set of user keys that have completed successfully.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a user has already been processed.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.contains(key)
    }

    /// Mark a user as processed.
    pub async fn mark(&self, key: &str) {
        self.inner.lock().await.insert(key.to_string());
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

/// Process every customer, at most `max_concurrent_users` in flight.
///
/// Skipped users (already processed) produce no outcome.
pub async fn run_batch(
    customers: &[CustomerRecord],
    ctx: &PipelineContext<'_>,
    processed: &ProcessedSet,
) -> Vec<PipelineOutcome> {
    let concurrency = ctx.config.max_concurrent_users.max(1);
    info!(
        users = customers.len(),
        concurrency, "starting batch processing"
    );

    let outcomes: Vec<PipelineOutcome> = stream::iter(customers)
        .map(|customer| process_customer(customer, ctx, processed))
        .buffer_unordered(concurrency)
        .filter_map(|outcome| async move { outcome })
        .collect()
        .await;

    let successes = outcomes.iter().filter(|o| o.is_success()).count();
    info!(
        total = outcomes.len(),
        successes,
        failures = outcomes.len() - successes,
        "batch processing finished"
    );
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_processed_set_round_trip() {
        let set = ProcessedSet::new();
        assert!(set.is_empty().await);
        assert!(!set.contains("911").await);

        set.mark("911").await;
        assert!(set.contains("911").await);
        assert_eq!(set.len().await, 1);

        // Marking twice stays a single entry
        set.mark("911").await;
        assert_eq!(set.len().await, 1);
    }

    #[tokio::test]
    async fn test_processed_set_shared_across_clones() {
        let set = ProcessedSet::new();
        let clone = set.clone();
        clone.mark("912").await;
        assert!(set.contains("912").await);
    }
}
