use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::panic::{self, AssertUnwindSafe};

use super::engine::RecognitionEngine;
use super::grammar::Platform;
use crate::error::EngineError;
use crate::models::config::ClassifierConfig;

/// A piece of screen text that votes for one platform
#[derive(Debug, Clone, Copy)]
enum Indicator {
    /// Phrase present anywhere in the text
    Phrase(&'static str),
    /// Phrase present while another phrase is absent
    PhraseWithout(&'static str, &'static str),
}

impl Indicator {
    fn matches(self, text: &str) -> bool {
        match self {
            Indicator::Phrase(phrase) => text.contains(phrase),
            Indicator::PhraseWithout(phrase, excluded) => {
                text.contains(phrase) && !text.contains(excluded)
            }
        }
    }
}

const GOOGLE_INDICATORS: [Indicator; 3] = [
    Indicator::Phrase("find my device"),
    Indicator::Phrase("last seen"),
    Indicator::Phrase("get directions"),
];

const APPLE_INDICATORS: [Indicator; 3] = [
    Indicator::Phrase("play sound"),
    Indicator::Phrase("share item"),
    Indicator::PhraseWithout("directions", "get directions"),
];

/// Indicator counts for one detection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformScores {
    pub apple: usize,
    pub google: usize,
}

impl PlatformScores {
    /// Score lowercase screen text; each indicator counts at most once
    pub fn from_text(text: &str) -> Self {
        let count = |indicators: &[Indicator]| indicators.iter().filter(|i| i.matches(text)).count();
        Self {
            apple: count(&APPLE_INDICATORS[..]),
            google: count(&GOOGLE_INDICATORS[..]),
        }
    }

    /// Google only on a strict win; ties go to Apple
    pub fn decide(self) -> Platform {
        if self.google > self.apple {
            Platform::Google
        } else {
            Platform::Apple
        }
    }
}

/// Detects the screen family from a cheap low-resolution pass
#[derive(Debug, Clone, Default)]
pub struct PlatformClassifier {
    config: ClassifierConfig,
}

impl PlatformClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify the full, uncropped screenshot.
    ///
    /// Never fails: any problem during the pass, including a panicking
    /// engine, falls back to Apple.
    pub fn classify(&self, engine: &dyn RecognitionEngine, image: &DynamicImage) -> Platform {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.detect(engine, image)));
        match outcome {
            Ok(Ok(platform)) => platform,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "platform detection failed, defaulting to apple");
                Platform::Apple
            }
            Err(_) => {
                tracing::warn!("platform detection panicked, defaulting to apple");
                Platform::Apple
            }
        }
    }

    fn detect(&self, engine: &dyn RecognitionEngine, image: &DynamicImage) -> Result<Platform, EngineError> {
        let small = self.downscale(image)?;
        let text = engine.recognize(&small)?.text.to_lowercase();

        let scores = PlatformScores::from_text(&text);
        let platform = scores.decide();
        tracing::debug!(
            apple = scores.apple,
            google = scores.google,
            platform = %platform,
            "platform scores"
        );
        Ok(platform)
    }

    fn downscale(&self, image: &DynamicImage) -> Result<DynamicImage, EngineError> {
        let factor = self.config.downscale_factor.max(1);
        let (width, height) = image.dimensions();
        let (small_width, small_height) = (width / factor, height / factor);
        if small_width == 0 || small_height == 0 {
            return Err(EngineError::Failed(format!(
                "image {}x{} too small to downscale by {}",
                width, height, factor
            )));
        }
        Ok(image.resize_exact(small_width, small_height, FilterType::CatmullRom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ocr::engine::testing::{Scripted, ScriptedEngine};
    use image::{Rgb, RgbImage};

    fn screenshot(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([240, 240, 240])))
    }

    #[test]
    fn test_scores_google_phrases() {
        let scores = PlatformScores::from_text("find my device\nlast seen 5 min ago\nget directions");

        assert_eq!(scores, PlatformScores { apple: 0, google: 3 });
        assert_eq!(scores.decide(), Platform::Google);
    }

    #[test]
    fn test_scores_apple_phrases() {
        let scores = PlatformScores::from_text("keys\nplay sound   directions\nshare item");

        assert_eq!(scores, PlatformScores { apple: 3, google: 0 });
        assert_eq!(scores.decide(), Platform::Apple);
    }

    #[test]
    fn test_get_directions_does_not_count_for_apple() {
        let scores = PlatformScores::from_text("get directions");
        assert_eq!(scores, PlatformScores { apple: 0, google: 1 });
    }

    #[test]
    fn test_repeated_phrase_counts_once() {
        let scores = PlatformScores::from_text("last seen last seen last seen");
        assert_eq!(scores.google, 1);
    }

    #[test]
    fn test_tie_resolves_to_apple() {
        assert_eq!(PlatformScores::default().decide(), Platform::Apple);
        assert_eq!(PlatformScores { apple: 1, google: 1 }.decide(), Platform::Apple);
        assert_eq!(PlatformScores::from_text("play sound last seen").decide(), Platform::Apple);
    }

    #[test]
    fn test_classify_lowercases_engine_text() {
        let engine = ScriptedEngine::new(vec![Scripted::text("Find My Device\nLast Seen", &[90.0])]);
        let classifier = PlatformClassifier::default();

        assert_eq!(classifier.classify(&engine, &screenshot(400, 800)), Platform::Google);
    }

    #[test]
    fn test_classify_downscales_by_four() {
        let engine = ScriptedEngine::new(vec![Scripted::text("", &[])]);
        let classifier = PlatformClassifier::default();

        classifier.classify(&engine, &screenshot(400, 802));

        assert_eq!(engine.seen_dimensions(), vec![(100, 200)]);
    }

    #[test]
    fn test_engine_failure_defaults_to_apple() {
        let engine = ScriptedEngine::new(vec![Scripted::Fail("engine offline")]);
        let classifier = PlatformClassifier::default();

        assert_eq!(classifier.classify(&engine, &screenshot(400, 800)), Platform::Apple);
    }

    #[test]
    fn test_engine_panic_defaults_to_apple() {
        let engine = ScriptedEngine::new(vec![Scripted::Panic("engine crashed")]);
        let classifier = PlatformClassifier::default();

        assert_eq!(classifier.classify(&engine, &screenshot(400, 800)), Platform::Apple);
    }

    #[test]
    fn test_tiny_image_defaults_to_apple() {
        let engine = ScriptedEngine::new(vec![Scripted::text("find my device last seen", &[])]);
        let classifier = PlatformClassifier::default();

        assert_eq!(classifier.classify(&engine, &screenshot(3, 3)), Platform::Apple);
        assert!(engine.seen_dimensions().is_empty(), "Engine should not run on an empty image");
    }
}
