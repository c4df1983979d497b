use std::collections::BTreeMap;
use std::io::Write;
use std::process::{Command, Stdio};

use image::DynamicImage;

use super::engine::{encode_png, RecognitionEngine};
use crate::error::EngineError;
use crate::models::config::TesseractConfig;
use crate::models::ocr_result::RecognitionOutput;

/// Tesseract OCR engine driven through the command-line binary
///
/// A new process is spawned per call, so one engine can serve concurrent
/// pipeline runs.
pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    /// Check if the configured binary can be executed
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn run_tesseract(&self, png: &[u8]) -> Result<String, EngineError> {
        let spawned = Command::new(&self.config.binary)
            .args(["stdin", "stdout"])
            .args(["--oem", &self.config.engine_mode.to_string()])
            .args(["--psm", &self.config.page_seg_mode.to_string()])
            .args(["-l", &self.config.language])
            .arg("tsv")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EngineError::NotAvailable(format!(
                    "{} not found (install tesseract-ocr)",
                    self.config.binary
                )));
            }
            Err(e) => return Err(EngineError::Io(e)),
        };

        // Tesseract reads all of stdin before writing anything
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(png)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Failed(format!("tesseract failed: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl RecognitionEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<RecognitionOutput, EngineError> {
        let png = encode_png(image)?;
        let tsv = self.run_tesseract(&png)?;
        parse_tsv(&tsv)
    }
}

/// Key that orders words into their text lines
type LineKey = (u32, u32, u32, u32);

/// Parse Tesseract TSV output.
///
/// Every row contributes its `conf` value in order, including the -1 rows
/// for pages, blocks, paragraphs and lines. Text is rebuilt from word rows:
/// words of one line are joined by spaces, lines by newlines, and blocks are
/// separated by an empty line.
pub fn parse_tsv(tsv: &str) -> Result<RecognitionOutput, EngineError> {
    let mut confidences = Vec::new();
    let mut lines: BTreeMap<LineKey, Vec<&str>> = BTreeMap::new();

    for (index, row) in tsv.lines().enumerate() {
        if row.trim().is_empty() || row.starts_with("level") {
            continue;
        }

        let columns: Vec<&str> = row.split('\t').collect();
        if columns.len() < 11 {
            return Err(EngineError::InvalidOutput(format!(
                "row {} has {} columns, expected 12",
                index,
                columns.len()
            )));
        }

        let number = |i: usize| -> Result<u32, EngineError> {
            columns[i].trim().parse::<u32>().map_err(|e| {
                EngineError::InvalidOutput(format!("row {} column {}: {}", index, i, e))
            })
        };

        let conf: f64 = columns[10].trim().parse().map_err(|e| {
            EngineError::InvalidOutput(format!("row {} confidence: {}", index, e))
        })?;
        confidences.push(conf);

        let level = number(0)?;
        let word = columns.get(11).map(|t| t.trim()).unwrap_or("");
        if level == 5 && !word.is_empty() {
            let key = (number(1)?, number(2)?, number(3)?, number(4)?);
            lines.entry(key).or_default().push(word);
        }
    }

    let mut text = String::new();
    let mut previous: Option<LineKey> = None;
    for (key, words) in &lines {
        if let Some(prev) = previous {
            text.push('\n');
            if (prev.0, prev.1) != (key.0, key.1) {
                text.push('\n');
            }
        }
        text.push_str(&words.join(" "));
        previous = Some(*key);
    }
    if !text.is_empty() {
        text.push('\n');
    }

    Ok(RecognitionOutput::new(text, confidences))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn sample_tsv() -> String {
        [
            HEADER,
            "1\t1\t0\t0\t0\t0\t0\t0\t800\t400\t-1\t",
            "2\t1\t1\t0\t0\t0\t10\t10\t300\t40\t-1\t",
            "3\t1\t1\t1\t0\t0\t10\t10\t300\t40\t-1\t",
            "4\t1\t1\t1\t1\t0\t10\t10\t300\t40\t-1\t",
            "5\t1\t1\t1\t1\t1\t10\t10\t120\t40\t95.5\tBlue",
            "5\t1\t1\t1\t1\t2\t140\t10\t120\t40\t91\tBackpack",
            "4\t1\t1\t1\t2\t0\t10\t60\t500\t40\t-1\t",
            "5\t1\t1\t1\t2\t1\t10\t60\t50\t40\t88\t123",
            "5\t1\t1\t1\t2\t2\t70\t60\t90\t40\t87\tMain",
            "5\t1\t1\t1\t2\t3\t170\t60\t40\t40\t0\t ",
            "2\t1\t2\t0\t0\t0\t10\t200\t300\t40\t-1\t",
            "3\t1\t2\t1\t0\t0\t10\t200\t300\t40\t-1\t",
            "4\t1\t2\t1\t1\t0\t10\t200\t300\t40\t-1\t",
            "5\t1\t2\t1\t1\t1\t10\t200\t60\t40\t80\tNow",
        ]
        .join("\n")
    }

    #[test]
    fn test_parse_tsv_text_lines() {
        let output = parse_tsv(&sample_tsv()).unwrap();

        assert_eq!(output.text, "Blue Backpack\n123 Main\n\nNow\n");
    }

    #[test]
    fn test_parse_tsv_keeps_every_confidence() {
        let output = parse_tsv(&sample_tsv()).unwrap();

        assert_eq!(output.token_confidences.len(), 14, "Header is skipped, all rows kept");
        assert_eq!(output.token_confidences[0], -1.0);
        assert_eq!(output.token_confidences[4], 95.5);
        assert_eq!(output.token_confidences[9], 0.0, "Blank word keeps its confidence");
    }

    #[test]
    fn test_parse_tsv_empty() {
        let output = parse_tsv(HEADER).unwrap();

        assert!(output.text.is_empty());
        assert!(output.token_confidences.is_empty());
    }

    #[test]
    fn test_parse_tsv_rejects_garbage() {
        let result = parse_tsv("this is not tsv");
        assert!(result.is_err(), "Free text should not parse as TSV");

        let bad_conf = format!("{}\n5\t1\t1\t1\t1\t1\t0\t0\t1\t1\thigh\tword", HEADER);
        assert!(matches!(parse_tsv(&bad_conf), Err(EngineError::InvalidOutput(_))));
    }

    #[test]
    fn test_missing_binary_is_not_available() {
        let engine = TesseractEngine::new(TesseractConfig {
            binary: "definitely-not-a-real-tesseract-binary".to_string(),
            ..TesseractConfig::default()
        });
        assert!(!engine.is_available());

        let image = DynamicImage::new_luma8(8, 8);
        let result = engine.recognize(&image);
        assert!(matches!(result, Err(EngineError::NotAvailable(_))));
    }
}
