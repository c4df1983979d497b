use serde::{Deserialize, Serialize};

/// Text and per-token confidences returned by a recognition engine.
///
/// Confidences are in [-1, 100]; -1 marks a token position with no text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionOutput {
    pub text: String,
    pub token_confidences: Vec<f64>,
}

impl RecognitionOutput {
    pub fn new(text: impl Into<String>, token_confidences: Vec<f64>) -> Self {
        Self {
            text: text.into(),
            token_confidences,
        }
    }
}

/// Platform tag carried by an extraction result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DetectedPlatform {
    Apple,
    Google,
    Unknown,
}

/// Fields recovered from one tracker screenshot.
///
/// When `error` is set every optional field is `None`, `platform` is
/// `Unknown` and `confidence` is 0.0. Otherwise the pipeline ran to the end,
/// and missing fields only mean the grammar found no match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    pub platform: DetectedPlatform,
    pub tracker_name: Option<String>,
    pub address: Option<String>,
    pub last_seen: Option<String>,
    pub confidence: f64,
    pub raw_text: String,
    pub error: Option<String>,
}

impl ExtractionResult {
    /// Result for a run that aborted with `message`
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            platform: DetectedPlatform::Unknown,
            tracker_name: None,
            address: None,
            last_seen: None,
            confidence: 0.0,
            raw_text: String::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_clears_fields() {
        let result = ExtractionResult::failure("boom");

        assert_eq!(result.platform, DetectedPlatform::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert!(result.tracker_name.is_none());
        assert!(result.address.is_none());
        assert!(result.last_seen.is_none());
        assert!(result.raw_text.is_empty());
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert!(result.is_error());
    }

    #[test]
    fn test_serializes_every_key() {
        let result = ExtractionResult::failure("bad image");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["platform"], "unknown");
        assert_eq!(json["confidence"], 0.0);
        assert_eq!(json["raw_text"], "");
        assert_eq!(json["error"], "bad image");
        for key in ["tracker_name", "address", "last_seen"] {
            assert!(json.get(key).is_some(), "{} should be present", key);
            assert!(json[key].is_null(), "{} should be null", key);
        }
    }

    #[test]
    fn test_platform_tags() {
        assert_eq!(serde_json::to_string(&DetectedPlatform::Apple).unwrap(), "\"apple\"");
        assert_eq!(serde_json::to_string(&DetectedPlatform::Google).unwrap(), "\"google\"");
        let parsed: DetectedPlatform = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(parsed, DetectedPlatform::Unknown);
    }
}
