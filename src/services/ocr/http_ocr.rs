use base64::{engine::general_purpose, Engine as _};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::engine::{encode_png, RecognitionEngine};
use crate::error::EngineError;
use crate::models::config::HttpEngineConfig;
use crate::models::ocr_result::RecognitionOutput;

/// Boxes overlapping more than this are treated as duplicate detections
const IOU_THRESHOLD: f64 = 0.3;

/// HTTP OCR engine that talks to a local OCR server
pub struct HttpRecognitionEngine {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ImageRequest {
    image_base64: String,
}

/// Single text box with bounding box coordinates
#[derive(Deserialize, Clone, Debug)]
pub struct TextBox {
    #[serde(rename = "box")]
    pub bbox: Vec<Vec<f64>>, // 4 corner points [[x1,y1], [x2,y2], [x3,y3], [x4,y4]]
    pub text: String,
    pub score: f64,
}

/// OCR server response
#[derive(Deserialize)]
struct OcrResponse {
    boxes: Vec<TextBox>,
    #[serde(default)]
    #[allow(dead_code)]
    raw_text: String,
}

impl TextBox {
    /// Bounding box as (x_min, y_min, x_max, y_max)
    fn rect(&self) -> (f64, f64, f64, f64) {
        let xs = self.bbox.iter().filter_map(|p| p.first().copied());
        let ys = self.bbox.iter().filter_map(|p| p.get(1).copied());

        let (x_min, x_max) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let (y_min, y_max) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        (x_min, y_min, x_max, y_max)
    }

    fn area(&self) -> f64 {
        let (x_min, y_min, x_max, y_max) = self.rect();
        ((x_max - x_min) * (y_max - y_min)).max(0.0)
    }

    fn center_y(&self) -> f64 {
        let (_, y_min, _, y_max) = self.rect();
        (y_min + y_max) / 2.0
    }

    /// Intersection over Union with another box
    fn iou(&self, other: &TextBox) -> f64 {
        let (x1_min, y1_min, x1_max, y1_max) = self.rect();
        let (x2_min, y2_min, x2_max, y2_max) = other.rect();

        let inter_w = x1_max.min(x2_max) - x1_min.max(x2_min);
        let inter_h = y1_max.min(y2_max) - y1_min.max(y2_min);
        if inter_w <= 0.0 || inter_h <= 0.0 {
            return 0.0;
        }

        let inter_area = inter_w * inter_h;
        let union_area = self.area() + other.area() - inter_area;
        if union_area <= 0.0 {
            return 0.0;
        }

        inter_area / union_area
    }
}

impl HttpRecognitionEngine {
    pub fn new(config: HttpEngineConfig) -> Result<Self, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::NotAvailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Check if server is healthy
    pub fn health_check(&self) -> Result<(), EngineError> {
        let url = format!("{}/health", self.base_url);
        self.client
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| EngineError::NotAvailable(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    fn request_boxes(&self, image: &DynamicImage) -> Result<Vec<TextBox>, EngineError> {
        let image_base64 = general_purpose::STANDARD.encode(encode_png(image)?);
        let url = format!("{}/ocr", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ImageRequest { image_base64 })
            .send()
            .map_err(|e| EngineError::Failed(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EngineError::Failed(format!("OCR server error ({}): {}", status, body)));
        }

        let data: OcrResponse = response
            .json()
            .map_err(|e| EngineError::InvalidOutput(format!("Failed to parse response: {}", e)))?;

        Ok(data.boxes)
    }
}

impl RecognitionEngine for HttpRecognitionEngine {
    fn name(&self) -> &'static str {
        "http"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<RecognitionOutput, EngineError> {
        let boxes = self.request_boxes(image)?;
        Ok(assemble_boxes(boxes))
    }
}

/// Drop boxes that overlap a larger box by more than `iou_threshold`
fn filter_overlapping_boxes(boxes: Vec<TextBox>, iou_threshold: f64) -> Vec<TextBox> {
    let mut remaining = boxes;
    // Smallest first so pop() yields the largest
    remaining.sort_by(|a, b| a.area().total_cmp(&b.area()));

    let mut kept = Vec::new();
    while let Some(current) = remaining.pop() {
        remaining.retain(|other| current.iou(other) <= iou_threshold);
        kept.push(current);
    }
    kept
}

/// Turn server boxes into multi-line text plus token confidences.
///
/// A box joins the current line when its vertical center falls inside the
/// line's first box; lines run top to bottom and words left to right.
/// Scores in [0, 1] become confidences in [0, 100], in reading order.
pub fn assemble_boxes(boxes: Vec<TextBox>) -> RecognitionOutput {
    let mut boxes: Vec<TextBox> = filter_overlapping_boxes(boxes, IOU_THRESHOLD)
        .into_iter()
        .filter(|b| !b.text.trim().is_empty())
        .collect();
    boxes.sort_by(|a, b| a.center_y().total_cmp(&b.center_y()));

    let mut lines: Vec<Vec<TextBox>> = Vec::new();
    for text_box in boxes {
        let joins_last = lines.last().and_then(|line| line.first()).is_some_and(|anchor| {
            let (_, top, _, bottom) = anchor.rect();
            let center = text_box.center_y();
            center >= top && center <= bottom
        });
        match lines.last_mut() {
            Some(line) if joins_last => line.push(text_box),
            _ => lines.push(vec![text_box]),
        }
    }

    let mut text = String::new();
    let mut confidences = Vec::new();
    for line in &mut lines {
        line.sort_by(|a, b| a.rect().0.total_cmp(&b.rect().0));
        let words: Vec<&str> = line.iter().map(|b| b.text.trim()).collect();
        text.push_str(&words.join(" "));
        text.push('\n');
        confidences.extend(line.iter().map(|b| (b.score * 100.0).clamp(0.0, 100.0)));
    }

    RecognitionOutput::new(text, confidences)
}
