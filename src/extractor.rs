use crate::engine::TextRecognizer;
use crate::error::PlateError;
use crate::locator::PlateCrop;
use std::sync::Arc;

/// Reads the text of a plate crop through an OCR engine
#[derive(Clone)]
pub struct TextExtractor {
    recognizer: Arc<dyn TextRecognizer>,
}

impl TextExtractor {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    pub fn engine_name(&self) -> &'static str {
        self.recognizer.name()
    }

    /// Highest ranked detection for the crop, or `None` if the engine found nothing.
    ///
    /// Later detections are discarded; a plate crop is expected to hold a
    /// single line of text.
    pub fn extract(&self, crop: &PlateCrop) -> Result<Option<String>, PlateError> {
        let gray = crop.image.to_luma8();
        let detections = self.recognizer.recognize(&gray)?;

        tracing::debug!(
            "{} returned {} detection(s) for {}x{} crop",
            self.recognizer.name(),
            detections.len(),
            gray.width(),
            gray.height()
        );

        Ok(detections.into_iter().next())
    }
}
