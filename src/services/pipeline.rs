//! Screenshot-to-fields pipeline.
//!
//! classify (full image) → crop panel → preprocess → recognize → parse →
//! score → normalize. A run always produces an `ExtractionResult`; faults
//! and panics inside the steps end up in its `error` field.

use image::DynamicImage;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use super::ocr::classifier::PlatformClassifier;
use super::ocr::confidence::score_confidence;
use super::ocr::engine::{build_engine, RecognitionEngine};
use super::ocr::parser::parse_fields;
use super::ocr::preprocessing::PreprocessingService;
use crate::error::{EngineError, ExtractionError};
use crate::models::config::AppConfig;
use crate::models::ocr_result::ExtractionResult;
use crate::models::roi::Roi;

/// Stateless pipeline over one recognition engine.
///
/// Holds no per-run state, so one instance can serve concurrent callers
/// as long as the engine can.
pub struct ScreenshotPipeline {
    engine: Arc<dyn RecognitionEngine>,
    classifier: PlatformClassifier,
    preprocessor: PreprocessingService,
}

impl ScreenshotPipeline {
    /// Pipeline with default classifier and preprocessing settings
    pub fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        Self {
            engine,
            classifier: PlatformClassifier::default(),
            preprocessor: PreprocessingService::default(),
        }
    }

    /// Build the engine and pipeline described by `config`
    pub fn from_config(config: &AppConfig) -> Result<Self, EngineError> {
        let engine = build_engine(&config.engine)?;
        Ok(Self {
            engine,
            classifier: PlatformClassifier::new(config.classifier.clone()),
            preprocessor: PreprocessingService::new(config.preprocessing.clone()),
        })
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Extract fields from encoded image bytes (PNG, JPEG, ...)
    pub fn process_bytes(&self, bytes: &[u8]) -> ExtractionResult {
        self.guarded(|| {
            let image = decode(bytes)?;
            self.run(&image)
        })
    }

    /// Extract fields from an image file
    pub fn process_path(&self, path: &Path) -> ExtractionResult {
        match std::fs::read(path) {
            Ok(bytes) => self.process_bytes(&bytes),
            Err(e) => failed(ExtractionError::Decode(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Extract fields from an already decoded image
    pub fn process_image(&self, image: &DynamicImage) -> ExtractionResult {
        self.guarded(|| self.run(image))
    }

    /// Single capture point: errors and panics become failure results
    fn guarded<F>(&self, step: F) -> ExtractionResult
    where
        F: FnOnce() -> Result<ExtractionResult, ExtractionError>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(step))
            .unwrap_or_else(|payload| Err(ExtractionError::Internal(panic_message(payload))));

        match outcome {
            Ok(result) => result,
            Err(e) => failed(e),
        }
    }

    fn run(&self, image: &DynamicImage) -> Result<ExtractionResult, ExtractionError> {
        let platform = self.classifier.classify(self.engine.as_ref(), image);
        let grammar = platform.grammar();

        let panel = Roi::bottom_panel(image.width(), image.height(), grammar.crop_fraction);
        if !panel.is_valid() {
            return Err(ExtractionError::Internal(format!(
                "empty panel crop for {}x{} image",
                image.width(),
                image.height()
            )));
        }
        tracing::debug!(
            platform = %platform,
            top = panel.y,
            height = panel.height,
            "cropping info panel"
        );
        let cropped = image.crop_imm(panel.x, panel.y, panel.width, panel.height);

        let processed = self.preprocessor.preprocess(&cropped);
        let recognized = self.engine.recognize(&processed)?;
        tracing::trace!(raw_text = %recognized.text, "panel text");

        let fields = parse_fields(&recognized.text, grammar);
        let confidence = score_confidence(&recognized.token_confidences);
        let last_seen = fields
            .last_seen
            .map(|matched| grammar.normalize_last_seen(&matched));

        let result = ExtractionResult {
            platform: platform.into(),
            tracker_name: fields.tracker_name,
            address: fields.address,
            last_seen,
            confidence,
            raw_text: recognized.text,
            error: None,
        };
        tracing::info!(
            platform = %platform,
            confidence = result.confidence,
            has_name = result.tracker_name.is_some(),
            has_address = result.address.is_some(),
            has_last_seen = result.last_seen.is_some(),
            "screenshot extracted"
        );
        Ok(result)
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, ExtractionError> {
    image::load_from_memory(bytes).map_err(|e| ExtractionError::Decode(e.to_string()))
}

fn failed(error: ExtractionError) -> ExtractionResult {
    tracing::warn!(error = %error, "screenshot extraction failed");
    ExtractionResult::failure(error.to_string())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {}", message)
    } else {
        "panic with unknown payload".to_string()
    }
}
