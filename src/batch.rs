//! Batch import: enrich and store many raw rows, one progress tick per row.

use crate::db_storage::LeadStore;
use crate::enrichment::{process_lead, LeadEnricher};
use crate::errors::AppError;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use utoipa::ToSchema;

/// Progress after a row finished, whatever its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BatchSummary {
    pub total: usize,
    pub inserted: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Ids of the stored leads, in completion order.
    pub inserted_ids: Vec<i64>,
}

#[derive(Debug)]
enum RowOutcome {
    Inserted(i64),
    Skipped,
    Failed(AppError),
}

/// Drives enrich + insert for each row with at most `concurrency` enrichment
/// calls in flight. A failing row is logged and never stops the batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchOrchestrator {
    concurrency: usize,
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::sequential()
    }
}

impl BatchOrchestrator {
    /// One row at a time, in input order.
    pub fn sequential() -> Self {
        Self { concurrency: 1 }
    }

    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Processes every row and calls `on_progress` once per finished row.
    ///
    /// `current` grows by one on each call and ends at `rows.len()`.
    pub async fn run<F>(
        &self,
        enricher: &dyn LeadEnricher,
        store: &LeadStore,
        rows: Vec<String>,
        mut on_progress: F,
    ) -> BatchSummary
    where
        F: FnMut(BatchProgress),
    {
        let total = rows.len();
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        tracing::info!(
            "Starting batch of {} row(s), concurrency {}",
            total,
            self.concurrency
        );

        let mut outcomes = stream::iter(rows.into_iter().enumerate())
            .map(move |(index, row)| async move {
                let outcome = if row.trim().is_empty() {
                    RowOutcome::Skipped
                } else {
                    match process_lead(enricher, store, &row).await {
                        Ok(id) => RowOutcome::Inserted(id),
                        Err(e) => RowOutcome::Failed(e),
                    }
                };
                (index, outcome)
            })
            .buffer_unordered(self.concurrency);

        let mut current = 0;
        while let Some((index, outcome)) = outcomes.next().await {
            current += 1;
            match outcome {
                RowOutcome::Inserted(id) => {
                    summary.inserted += 1;
                    summary.inserted_ids.push(id);
                    tracing::debug!("Row {} stored as lead {}", index, id);
                }
                RowOutcome::Skipped => {
                    summary.skipped += 1;
                    tracing::debug!("Row {} is blank, skipped", index);
                }
                RowOutcome::Failed(e) => {
                    summary.failed += 1;
                    tracing::error!("Error processing row {}: {}", index, e);
                }
            }
            on_progress(BatchProgress { current, total });
        }

        tracing::info!(
            "Batch complete: {} total, {} inserted, {} failed, {} skipped",
            summary.total,
            summary.inserted,
            summary.failed,
            summary.skipped
        );

        summary
    }
}
