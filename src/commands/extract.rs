//! Entry points for callers that run the pipeline on their own schedule:
//! one screenshot with a timeout, or a capped batch.

use rayon::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{BatchError, EngineError, ExtractionError};
use crate::models::config::PipelineConfig;
use crate::models::ocr_result::ExtractionResult;
use crate::services::pipeline::ScreenshotPipeline;

/// Caller-side limits for one batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchLimits {
    pub max_batch_size: usize,
    pub call_timeout: Option<Duration>,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for BatchLimits {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_batch_size: config.max_batch_size,
            call_timeout: config.call_timeout_secs.map(Duration::from_secs),
        }
    }
}

fn check_batch_size(count: usize, max: usize) -> Result<(), BatchError> {
    if count > max {
        return Err(BatchError::TooMany { max, got: count });
    }
    Ok(())
}

/// Run one screenshot on the blocking pool.
///
/// A run that outlives `timeout` is reported as a failed result; the
/// blocking work itself is left to finish in the background.
pub async fn extract_screenshot(
    pipeline: Arc<ScreenshotPipeline>,
    bytes: Vec<u8>,
    timeout: Option<Duration>,
) -> ExtractionResult {
    let task = tokio::task::spawn_blocking(move || pipeline.process_bytes(&bytes));

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                let error = ExtractionError::from(EngineError::Timeout(limit));
                tracing::warn!(error = %error, "screenshot extraction timed out");
                return ExtractionResult::failure(error.to_string());
            }
        },
        None => task.await,
    };

    joined.unwrap_or_else(|e| {
        let error = ExtractionError::Internal(format!("extraction task failed: {}", e));
        ExtractionResult::failure(error.to_string())
    })
}

/// Run a batch in parallel on the rayon pool. Results keep input order.
pub fn extract_batch(
    pipeline: &ScreenshotPipeline,
    images: &[Vec<u8>],
    max_batch_size: usize,
) -> Result<Vec<ExtractionResult>, BatchError> {
    check_batch_size(images.len(), max_batch_size)?;

    Ok(images
        .par_iter()
        .map(|bytes| pipeline.process_bytes(bytes))
        .collect())
}

/// Run a batch as independent tasks, each under the per-call timeout.
/// Results keep input order.
pub async fn extract_batch_async(
    pipeline: Arc<ScreenshotPipeline>,
    images: Vec<Vec<u8>>,
    limits: BatchLimits,
) -> Result<Vec<ExtractionResult>, BatchError> {
    check_batch_size(images.len(), limits.max_batch_size)?;

    let handles: Vec<_> = images
        .into_iter()
        .map(|bytes| {
            tokio::spawn(extract_screenshot(
                Arc::clone(&pipeline),
                bytes,
                limits.call_timeout,
            ))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle.await.unwrap_or_else(|e| {
            ExtractionResult::failure(
                ExtractionError::Internal(format!("extraction task failed: {}", e)).to_string(),
            )
        });
        results.push(result);
    }
    Ok(results)
}
