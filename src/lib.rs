//! License plate reading pipeline and the HTTP service around it.
//!
//! A photo is resized to a fixed frame, binarized, searched for the largest
//! quadrilateral contour, and the matching crop is handed to an OCR engine.
//! The first line the engine reports is reduced to `[A-Z0-9]` and returned.

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod extractor;
pub mod locator;
pub mod normalize;
pub mod preprocessing;
pub mod reader;
pub mod server;

pub use engine::{Serialized, TextRecognizer};
pub use error::PlateError;
pub use locator::{CandidateRegion, ContourLocator, PlateCrop, PlateLocator};
pub use reader::{Outcome, PlateReader};
