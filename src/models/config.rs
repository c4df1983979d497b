use serde::{Deserialize, Serialize};

/// Which recognition engine backs the pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Tesseract,
    Http,
}

impl Default for EngineKind {
    fn default() -> Self {
        Self::Tesseract
    }
}

/// Tesseract command-line settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TesseractConfig {
    pub binary: String,
    pub language: String,
    /// `--psm`; 6 treats the panel as one uniform block of text
    pub page_seg_mode: u8,
    /// `--oem`
    pub engine_mode: u8,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            page_seg_mode: 6,
            engine_mode: 3,
        }
    }
}

/// OCR server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpEngineConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for HttpEngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:39835".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub kind: EngineKind,
    pub tesseract: TesseractConfig,
    pub http: HttpEngineConfig,
}

/// Image preprocessing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub contrast_factor: f64,
    pub scale_factor: f64,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            contrast_factor: 2.0,
            scale_factor: 2.0,
        }
    }
}

/// Platform detection pass configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub downscale_factor: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { downscale_factor: 4 }
    }
}

/// Limits applied by the calling layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-screenshot timeout; `None` waits indefinitely
    pub call_timeout_secs: Option<u64>,
    pub max_batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: Some(60),
            max_batch_size: 10,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Pretty
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "info".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub preprocessing: PreprocessingConfig,
    pub classifier: ClassifierConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}
