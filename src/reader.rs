use crate::config::PipelineConfig;
use crate::engine::TextRecognizer;
use crate::error::PlateError;
use crate::extractor::TextExtractor;
use crate::locator::{ContourLocator, PlateLocator};
use crate::normalize::normalize;
use image::{imageops::FilterType, DynamicImage};
use std::sync::Arc;

pub const NOT_DETECTED_MESSAGE: &str = "License plate not detected.";
pub const UNRECOGNIZED_MESSAGE: &str = "Could not recognize the license plate.";

/// Terminal result of reading one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A plate was found and its text read
    Recognized { token: String },
    /// No plate-shaped region in the frame
    NotDetected,
    /// A plate region was found but no usable text came out of it
    Unrecognized,
}

impl Outcome {
    /// The token, or the fixed phrase standing in for it
    pub fn message(&self) -> &str {
        match self {
            Outcome::Recognized { token } => token,
            Outcome::NotDetected => NOT_DETECTED_MESSAGE,
            Outcome::Unrecognized => UNRECOGNIZED_MESSAGE,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Recognized { .. } => "recognized",
            Outcome::NotDetected => "not_detected",
            Outcome::Unrecognized => "unrecognized",
        }
    }
}

/// Resize, locate, extract, normalize.
///
/// Holds the OCR engine for its whole lifetime; each call to [`read`](Self::read)
/// is otherwise independent.
pub struct PlateReader {
    locator: Box<dyn PlateLocator>,
    extractor: TextExtractor,
    frame: (u32, u32),
}

impl PlateReader {
    /// Contour-based reader with the given engine
    pub fn new(config: &PipelineConfig, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self::with_locator(config, Box::new(ContourLocator::new(config)), recognizer)
    }

    /// Reader using a different localization strategy
    pub fn with_locator(
        config: &PipelineConfig,
        locator: Box<dyn PlateLocator>,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> Self {
        Self {
            locator,
            extractor: TextExtractor::new(recognizer),
            frame: config.frame,
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.extractor.engine_name()
    }

    pub fn frame(&self) -> (u32, u32) {
        self.frame
    }

    /// Read the plate in `image`.
    ///
    /// Detection failures are outcomes; only an OCR engine failure is an error.
    pub fn read(&self, image: &DynamicImage) -> Result<Outcome, PlateError> {
        let (width, height) = self.frame;
        // Aspect ratio is not preserved
        let frame = image.resize_exact(width, height, FilterType::Triangle);

        let Some(crop) = self.locator.locate(&frame) else {
            tracing::info!("No plate-shaped region found");
            return Ok(Outcome::NotDetected);
        };

        let Some(text) = self.extractor.extract(&crop)? else {
            tracing::info!("Plate region {:?} yielded no text", crop.region);
            return Ok(Outcome::Unrecognized);
        };

        let token = normalize(&text);
        if token.is_empty() {
            tracing::info!("OCR text {:?} normalized to an empty token", text);
            return Ok(Outcome::Unrecognized);
        }

        tracing::info!("Read plate {} from region {:?}", token, crop.region);
        Ok(Outcome::Recognized { token })
    }
}
