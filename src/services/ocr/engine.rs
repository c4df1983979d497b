use std::sync::Arc;

use image::DynamicImage;

use super::http_ocr::HttpRecognitionEngine;
use super::tesseract::TesseractEngine;
use crate::error::EngineError;
use crate::models::config::{EngineConfig, EngineKind};
use crate::models::ocr_result::RecognitionOutput;

/// OCR Engine trait - abstraction for different recognition backends
///
/// Implementations must be usable from several pipeline runs at once.
pub trait RecognitionEngine: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Recognize multi-line text and per-token confidences
    fn recognize(&self, image: &DynamicImage) -> Result<RecognitionOutput, EngineError>;
}

/// Build the engine selected by configuration
pub fn build_engine(config: &EngineConfig) -> Result<Arc<dyn RecognitionEngine>, EngineError> {
    let engine: Arc<dyn RecognitionEngine> = match config.kind {
        EngineKind::Tesseract => Arc::new(TesseractEngine::new(config.tesseract.clone())),
        EngineKind::Http => Arc::new(HttpRecognitionEngine::new(config.http.clone())?),
    };
    tracing::debug!(engine = engine.name(), "recognition engine ready");
    Ok(engine)
}

/// Encode an image as PNG bytes for engines that take encoded input
pub(crate) fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, EngineError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| EngineError::Encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// One canned engine response
    pub enum Scripted {
        Output(RecognitionOutput),
        Fail(&'static str),
        Panic(&'static str),
    }

    impl Scripted {
        pub fn text(text: &str, confidences: &[f64]) -> Self {
            Scripted::Output(RecognitionOutput::new(text, confidences.to_vec()))
        }
    }

    /// Engine that replays scripted responses in call order and records
    /// the dimensions of every image it was handed. Once the script runs
    /// out it keeps answering with `fallback`.
    pub struct ScriptedEngine {
        responses: Mutex<VecDeque<Scripted>>,
        fallback: RecognitionOutput,
        seen: Mutex<Vec<(u32, u32)>>,
    }

    impl ScriptedEngine {
        pub fn new(responses: Vec<Scripted>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                fallback: RecognitionOutput::default(),
                seen: Mutex::new(Vec::new()),
            }
        }

        /// Same answer for every call
        pub fn always(text: &str, confidences: &[f64]) -> Self {
            Self {
                fallback: RecognitionOutput::new(text, confidences.to_vec()),
                ..Self::new(Vec::new())
            }
        }

        pub fn seen_dimensions(&self) -> Vec<(u32, u32)> {
            self.seen.lock().clone()
        }
    }

    impl RecognitionEngine for ScriptedEngine {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn recognize(&self, image: &DynamicImage) -> Result<RecognitionOutput, EngineError> {
            self.seen.lock().push((image.width(), image.height()));
            let next = self.responses.lock().pop_front();
            match next {
                Some(Scripted::Output(output)) => Ok(output),
                Some(Scripted::Fail(message)) => Err(EngineError::Failed(message.to_string())),
                Some(Scripted::Panic(message)) => panic!("{}", message),
                None => Ok(self.fallback.clone()),
            }
        }
    }
}
