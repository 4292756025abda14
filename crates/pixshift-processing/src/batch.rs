use crate::converter::{ConversionResult, ConvertedImage, FailedImage, ImageConverter, UploadedImage};
use crate::options::ConversionOptions;
use std::time::Instant;

/// Ordered per-file results of one request (order = upload order)
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    results: Vec<ConversionResult>,
}

impl BatchOutcome {
    pub fn new(results: Vec<ConversionResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[ConversionResult] {
        &self.results
    }

    pub fn successes(&self) -> impl Iterator<Item = &ConvertedImage> {
        self.results.iter().filter_map(|result| match result {
            ConversionResult::Success(converted) => Some(converted),
            ConversionResult::Failure(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &FailedImage> {
        self.results.iter().filter_map(|result| match result {
            ConversionResult::Failure(failed) => Some(failed),
            ConversionResult::Success(_) => None,
        })
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    /// Exactly one success and no failures: answer with the bare file
    pub fn is_single_file(&self) -> bool {
        self.success_count() == 1 && self.failure_count() == 0
    }

    /// Consume the outcome, keeping only the successes in order
    pub fn into_successes(self) -> Vec<ConvertedImage> {
        self.results
            .into_iter()
            .filter_map(|result| match result {
                ConversionResult::Success(converted) => Some(converted),
                ConversionResult::Failure(_) => None,
            })
            .collect()
    }
}

/// Convert every upload in order. A failing file never stops the ones after it.
pub fn convert_batch(uploads: &[UploadedImage], options: &ConversionOptions) -> BatchOutcome {
    let start = Instant::now();

    let results: Vec<ConversionResult> = uploads
        .iter()
        .map(|upload| {
            let result = ImageConverter::convert(upload, options);
            if let ConversionResult::Failure(failed) = &result {
                tracing::warn!(
                    filename = %failed.original_filename,
                    kind = failed.error.kind(),
                    error = %failed.error,
                    "Image conversion failed"
                );
            }
            result
        })
        .collect();

    let outcome = BatchOutcome::new(results);

    tracing::info!(
        total = uploads.len(),
        converted = outcome.success_count(),
        failed = outcome.failure_count(),
        target_format = %options.target_format,
        duration_ms = start.elapsed().as_millis() as u64,
        "Batch conversion finished"
    );

    outcome
}
