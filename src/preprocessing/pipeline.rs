use crate::config::PipelineConfig;
use image::{DynamicImage, GrayImage};
use std::time::Instant;

use super::steps;

/// Single-channel image holding only [`steps::threshold::FOREGROUND`] and
/// [`steps::threshold::BACKGROUND`] pixels
pub type BinaryMask = GrayImage;

/// Timing information for a single preprocessing step
#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone)]
pub struct PreprocessingResult {
    /// Binary mask
    pub mask: BinaryMask,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Grayscale, blur, adaptive threshold. Always in that order.
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    blur_kernel: u32,
    threshold_block: u32,
    threshold_bias: i16,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl Preprocessor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            blur_kernel: config.blur_kernel,
            threshold_block: config.threshold_block,
            threshold_bias: config.threshold_bias,
        }
    }

    /// Binarize an image for contour extraction
    pub fn preprocess(&self, image: &DynamicImage) -> BinaryMask {
        self.process(image).mask
    }

    /// Binarize an image and report how long each step took
    pub fn process(&self, image: &DynamicImage) -> PreprocessingResult {
        let start = Instant::now();
        let mut steps_timing = Vec::new();

        let gray = run_step("grayscale", &mut steps_timing, || {
            steps::grayscale::apply(image)
        });
        let blurred = run_step("blur", &mut steps_timing, || {
            steps::blur::apply(&gray, self.blur_kernel)
        });
        let mask = run_step("threshold", &mut steps_timing, || {
            steps::threshold::apply(&blurred, self.threshold_block, self.threshold_bias)
        });

        let result = PreprocessingResult {
            mask,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: steps_timing,
        };

        tracing::debug!(
            "Preprocessed {}x{} frame in {}ms ({:?})",
            image.width(),
            image.height(),
            result.total_time_ms,
            result.steps
        );

        result
    }
}

fn run_step<F>(name: &str, timings: &mut Vec<StepTiming>, step_fn: F) -> GrayImage
where
    F: FnOnce() -> GrayImage,
{
    let step_start = Instant::now();
    let result = step_fn();
    timings.push(StepTiming {
        name: name.to_string(),
        time_ms: step_start.elapsed().as_millis() as u64,
    });
    result
}
