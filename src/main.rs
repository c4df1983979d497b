//! Command-line driver: run the extraction pipeline over screenshot files
//! and print one JSON line per file.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracker_ocr::{
    extract_batch_async, init_tracing, AppConfig, BatchLimits, ConfigManager, EngineKind,
    ExtractionResult, LogFormat, ScreenshotPipeline,
};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EngineArg {
    Tesseract,
    Http,
}

#[derive(Debug, Parser)]
#[command(name = "tracker-ocr", version, about = "Extract tracker locations from Find My screenshots")]
struct Cli {
    /// Screenshot files or directories of screenshots
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long, env = "TRACKER_OCR_CONFIG")]
    config: Option<PathBuf>,

    /// Recognition engine
    #[arg(long, value_enum)]
    engine: Option<EngineArg>,

    /// OCR server base URL for the http engine
    #[arg(long)]
    server_url: Option<String>,

    /// Tesseract binary
    #[arg(long)]
    tesseract_bin: Option<String>,

    /// Per-screenshot timeout in seconds (0 disables)
    #[arg(long)]
    timeout: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Serialize)]
struct FileResult<'a> {
    file: &'a Path,
    result: &'a ExtractionResult,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigManager::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ConfigManager::new()?.load()?,
    };

    if let Some(engine) = cli.engine {
        config.engine.kind = match engine {
            EngineArg::Tesseract => EngineKind::Tesseract,
            EngineArg::Http => EngineKind::Http,
        };
    }
    if let Some(url) = &cli.server_url {
        config.engine.http.base_url = url.clone();
    }
    if let Some(binary) = &cli.tesseract_bin {
        config.engine.tesseract.binary = binary.clone();
    }
    if let Some(secs) = cli.timeout {
        config.pipeline.call_timeout_secs = (secs > 0).then_some(secs);
    }
    if cli.json_logs {
        config.logging.format = LogFormat::Json;
    }
    Ok(config)
}

/// Expand directories into their image files, sorted by name
fn collect_images(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in std::fs::read_dir(path).with_context(|| format!("cannot read {}", path.display()))? {
            let candidate = entry?.path();
            let is_image = candidate
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if is_image {
                found.push(candidate);
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.logging);

    let files = collect_images(&cli.paths)?;
    tracing::info!(count = files.len(), engine = ?config.engine.kind, "processing screenshots");

    let pipeline = Arc::new(ScreenshotPipeline::from_config(&config)?);
    let limits = BatchLimits::from(&config.pipeline);
    let chunk_size = limits.max_batch_size.max(1);

    let runtime = tokio::runtime::Runtime::new()?;
    for chunk in files.chunks(chunk_size) {
        // Unreadable files become error results like undecodable ones
        let images: Vec<Vec<u8>> = chunk
            .iter()
            .map(|path| std::fs::read(path).unwrap_or_default())
            .collect();

        let results = runtime.block_on(extract_batch_async(
            Arc::clone(&pipeline),
            images,
            BatchLimits {
                max_batch_size: chunk_size,
                ..limits
            },
        ))?;

        for (file, result) in chunk.iter().zip(&results) {
            let line = serde_json::to_string(&FileResult { file, result })?;
            println!("{}", line);
        }
    }

    Ok(())
}
