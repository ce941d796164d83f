use crate::error::PlateError;
use image::GrayImage;
use parking_lot::Mutex;
use std::sync::Arc;

/// Trait that all OCR engines must implement
///
/// Engines are loaded once and shared between requests, so implementations
/// must tolerate concurrent `recognize` calls. Backends that cannot should be
/// wrapped in [`Serialized`].
pub trait TextRecognizer: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Detected text strings, in the engine's own ranking order.
    /// An empty vector means nothing was found.
    fn recognize(&self, image: &GrayImage) -> Result<Vec<String>, PlateError>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;
}

/// Runs every call of the wrapped engine under a single lock.
pub struct Serialized {
    inner: Arc<dyn TextRecognizer>,
    lock: Mutex<()>,
}

impl Serialized {
    pub fn new(inner: Arc<dyn TextRecognizer>) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }
}

impl TextRecognizer for Serialized {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn description(&self) -> &'static str {
        self.inner.description()
    }

    fn recognize(&self, image: &GrayImage) -> Result<Vec<String>, PlateError> {
        let _guard = self.lock.lock();
        self.inner.recognize(image)
    }

    fn supported_languages(&self) -> Vec<String> {
        self.inner.supported_languages()
    }
}
