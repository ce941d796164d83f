use super::blur;
use image::{GrayImage, Luma};
use imageproc::filter::separable_filter_equal;

/// Foreground and background levels of the mask
pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Adaptive threshold against a Gaussian-weighted local mean
///
/// A pixel becomes foreground when it is at least `bias` levels darker than
/// the weighted mean of its `block_size` x `block_size` neighbourhood. Flat
/// regions therefore stay background whatever their brightness.
pub fn apply(image: &GrayImage, block_size: u32, bias: i16) -> GrayImage {
    let kernel = blur::gaussian_kernel(block_size);
    let local_mean = separable_filter_equal(image, kernel.as_slice());

    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let pixel = image.get_pixel(x, y).0[0] as i16;
        let mean = local_mean.get_pixel(x, y).0[0] as i16;
        if pixel <= mean - bias {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}
