use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma};

use crate::models::config::PreprocessingConfig;

/// Image preprocessing service for OCR optimization
#[derive(Debug, Clone, Default)]
pub struct PreprocessingService {
    config: PreprocessingConfig,
}

impl PreprocessingService {
    /// Create a new preprocessing service with custom configuration
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    /// Full preprocessing pipeline: grayscale → contrast → scale
    pub fn preprocess(&self, image: &DynamicImage) -> DynamicImage {
        let gray = self.to_grayscale(image);
        let contrasted = self.enhance_contrast(&gray, self.config.contrast_factor);
        self.scale(&contrasted, self.config.scale_factor)
    }

    /// Convert image to grayscale
    pub fn to_grayscale(&self, image: &DynamicImage) -> DynamicImage {
        DynamicImage::ImageLuma8(image.to_luma8())
    }

    /// Stretch intensities away from the image mean by `factor`.
    ///
    /// Each pixel becomes `mean + factor * (pixel - mean)`, clamped to
    /// [0, 255]. A factor of 1.0 leaves the image unchanged.
    pub fn enhance_contrast(&self, image: &DynamicImage, factor: f64) -> DynamicImage {
        let gray = image.to_luma8();
        let mean = mean_intensity(&gray);

        let mut out = gray;
        for pixel in out.pixels_mut() {
            let value = mean + factor * (pixel[0] as f64 - mean);
            *pixel = Luma([value.round().clamp(0.0, 255.0) as u8]);
        }

        DynamicImage::ImageLuma8(out)
    }

    /// Scale image by factor
    pub fn scale(&self, image: &DynamicImage, factor: f64) -> DynamicImage {
        let (width, height) = image.dimensions();
        let new_width = ((width as f64 * factor) as u32).max(1);
        let new_height = ((height as f64 * factor) as u32).max(1);

        image.resize_exact(new_width, new_height, FilterType::Lanczos3)
    }
}

/// Mean pixel value rounded to the nearest integer
fn mean_intensity(image: &GrayImage) -> f64 {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = image.pixels().map(|p| p[0] as u64).sum();
    (sum as f64 / count as f64).round()
}
