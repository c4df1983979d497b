pub mod classifier;
pub mod confidence;
pub mod engine;
pub mod grammar;
pub mod http_ocr;
pub mod parser;
pub mod preprocessing;
pub mod tesseract;

// Re-export main types
pub use classifier::{PlatformClassifier, PlatformScores};
pub use confidence::score_confidence;
pub use engine::{build_engine, RecognitionEngine};
pub use grammar::{Platform, PlatformGrammar};
pub use http_ocr::HttpRecognitionEngine;
pub use parser::{parse_fields, ParsedFields};
pub use preprocessing::PreprocessingService;
pub use tesseract::TesseractEngine;
