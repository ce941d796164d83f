//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use.

use super::models;
use crate::config::Config;
use crate::engine::TextRecognizer;
use crate::error::PlateError;
use image::{DynamicImage, GrayImage};
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

const DETECTION_MODEL_FILE: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILE: &str = "text-recognition.rten";

/// OCR Engine wrapping the ocrs library
pub struct OcrsEngine {
    engine: OcrsOcrEngine,
}

impl OcrsEngine {
    /// Load the models (downloading them if needed) and build the engine
    pub fn new(config: &Config) -> Result<Self, PlateError> {
        let model_dir = config.model_dir.clone().unwrap_or_else(models::cache_dir);

        let detection_model_path =
            models::ensure_downloaded(DETECTION_MODEL_URL, &model_dir, DETECTION_MODEL_FILE)?;
        let recognition_model_path =
            models::ensure_downloaded(RECOGNITION_MODEL_URL, &model_dir, RECOGNITION_MODEL_FILE)?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            PlateError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            PlateError::InitializationError(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| {
            PlateError::InitializationError(format!("Failed to create OCR engine: {}", e))
        })?;

        tracing::info!("ocrs engine initialized successfully");

        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies required"
    }

    fn recognize(&self, image: &GrayImage) -> Result<Vec<String>, PlateError> {
        // ImageSource::from_bytes expects HWC RGB data
        let rgb_img = DynamicImage::ImageLuma8(image.clone()).into_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions).map_err(|e| {
            PlateError::RecognitionError(format!("Failed to create image source: {}", e))
        })?;

        let ocr_input = self.engine.prepare_input(img_source).map_err(|e| {
            PlateError::RecognitionError(format!("Failed to prepare input: {}", e))
        })?;

        let word_rects = self
            .engine
            .detect_words(&ocr_input)
            .map_err(|e| PlateError::RecognitionError(format!("Failed to detect words: {}", e)))?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| {
                PlateError::RecognitionError(format!("Failed to recognize text: {}", e))
            })?;

        // Lines come back in reading order; that order is the ranking
        Ok(collect_lines(line_texts.iter().map(|line| {
            line.as_ref().map(|line| {
                line.words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
        })))
    }

    fn supported_languages(&self) -> Vec<String> {
        // ocrs currently only supports English/Latin alphabet
        vec!["eng".to_string()]
    }
}

/// Drop missing and blank lines, keeping the order of the rest
fn collect_lines<I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    lines
        .into_iter()
        .flatten()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
