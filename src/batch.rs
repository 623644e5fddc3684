use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    agent::Classify,
    config::BulkConfig,
    error::ClassifyError,
    model::{BatchProgress, BulkRow}
};

/// Drives many titles through the classification client: consecutive
/// chunks, items classified sequentially inside a chunk with per-item
/// retry, pauses between items and between chunks to stay under the
/// provider's undocumented request-rate ceiling.
pub struct BulkClassifier<C: Classify> {
    agent: Arc<C>,
    config: BulkConfig,
    cancel: CancellationToken
}

impl<C: Classify + 'static> BulkClassifier<C> {
    pub fn new(agent: C, config: BulkConfig) -> Self {
        BulkClassifier {
            agent: Arc::new(agent),
            config,
            cancel: CancellationToken::new()
        }
    }

    /// Handle for the host to abort the run; checked between chunks, so
    /// in-flight items finish before the run stops.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Classify every title, in order. `on_progress` receives the
    /// accumulated rows and chunk progress after each chunk, so callers
    /// can render partial results mid-run. The returned list has exactly
    /// one terminal row per input title, in input order.
    pub async fn run<F>(&self, titles: &[String], mut on_progress: F) -> Vec<BulkRow>
    where
        F: FnMut(&[BulkRow], BatchProgress)
    {
        if titles.is_empty() {
            return Vec::new();
        }

        let chunk_size = self.config.chunk_size.max(1);
        let chunks: Vec<Vec<String>> = titles.chunks(chunk_size).map(|c| c.to_vec()).collect();
        let last = chunks.len() - 1;
        let mut progress = BatchProgress::new(chunks.len());
        let mut rows: Vec<BulkRow> = Vec::with_capacity(titles.len());

        for (index, chunk) in chunks.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(completed = progress.completed_batches, "bulk run cancelled");
                break;
            }

            let chunk_titles = chunk.clone();
            let handle = tokio::spawn(process_chunk(
                Arc::clone(&self.agent),
                self.config.clone(),
                chunk
            ));

            // a dead chunk task must not take the rest of the run with
            // it: record its titles as failures and keep going.
            match handle.await {
                Ok(mut chunk_rows) => rows.append(&mut chunk_rows),
                Err(e) => {
                    warn!(chunk = index, error = %e, "chunk task failed");
                    let failure = ClassifyError::ChunkFailure(e.to_string());
                    rows.extend(
                        chunk_titles
                            .into_iter()
                            .map(|title| BulkRow::failed(title, failure.to_string()))
                    );
                }
            }

            progress.advance();
            info!(
                completed = progress.completed_batches,
                total = progress.total_batches,
                "chunk done"
            );
            on_progress(&rows, progress);

            if index < last {
                sleep(self.config.chunk_delay).await;
            }
        }

        rows
    }
}

async fn process_chunk<C: Classify>(
    agent: Arc<C>,
    config: BulkConfig,
    titles: Vec<String>
) -> Vec<BulkRow> {
    let mut rows = Vec::with_capacity(titles.len());
    let last = titles.len().saturating_sub(1);
    for (index, title) in titles.into_iter().enumerate() {
        rows.push(classify_with_retry(agent.as_ref(), &config, title).await);
        if index < last {
            sleep(config.item_delay).await;
        }
    }
    rows
}

// Every failure retries the same way, extraction failures included:
// asking the model again is the only recovery available.
async fn classify_with_retry<C: Classify>(
    agent: &C,
    config: &BulkConfig,
    title: String
) -> BulkRow {
    let mut attempt = 0;
    loop {
        match agent.classify(&title).await {
            Ok(record) => return BulkRow::ok(title, record),
            Err(err) if attempt < config.max_retries => {
                attempt += 1;
                debug!(attempt, max = config.max_retries, error = %err, "retrying classification");
                sleep(config.retry_delay).await;
            }
            Err(err) => return BulkRow::failed(title, err.to_string())
        }
    }
}
