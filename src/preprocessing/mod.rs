//! Image preprocessing for plate localization
//!
//! Turns a colour frame into a binary mask whose foreground traces the dark
//! side of local contrast edges, ready for contour extraction.

pub mod pipeline;
pub mod steps;

pub use pipeline::{BinaryMask, PreprocessingResult, Preprocessor, StepTiming};
