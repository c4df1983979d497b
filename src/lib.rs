//! Field extraction from tracker location screenshots.
//!
//! Takes a photo of an Apple "Find My" or Google "Find My Device" item
//! screen and recovers the platform, tracker label, street address,
//! "last seen" phrase and a recognition confidence score.
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tracker_ocr::{ScreenshotPipeline, TesseractEngine, TesseractConfig};
//!
//! let engine = Arc::new(TesseractEngine::new(TesseractConfig::default()));
//! let pipeline = ScreenshotPipeline::new(engine);
//! let result = pipeline.process_path(Path::new("screenshot.png"));
//! println!("{}", serde_json::to_string(&result).unwrap());
//! ```

pub mod commands;
pub mod error;
pub mod models;
pub mod services;

pub use commands::{extract_batch, extract_batch_async, extract_screenshot, BatchLimits};
pub use error::{BatchError, ConfigError, EngineError, ExtractionError};
pub use models::config::{AppConfig, EngineKind, LogFormat, LoggingConfig, TesseractConfig};
pub use models::ocr_result::{DetectedPlatform, ExtractionResult, RecognitionOutput};
pub use services::config::ConfigManager;
pub use services::ocr::{
    HttpRecognitionEngine, Platform, PlatformClassifier, RecognitionEngine, TesseractEngine,
};
pub use services::pipeline::ScreenshotPipeline;

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber for binaries.
///
/// The library itself only emits events; embedding applications may install
/// their own subscriber instead. Returns false if one is already set.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Pretty => builder.try_init().is_ok(),
    }
}
