use image::{DynamicImage, GrayImage};

/// Convert image to grayscale
/// This is the foundation for the blur and threshold steps
pub fn apply(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}
