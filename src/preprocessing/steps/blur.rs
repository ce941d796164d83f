use image::GrayImage;
use imageproc::filter::separable_filter_equal;

/// Smoothing kernels used for small sizes instead of the sampled Gaussian
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Sigma implied by a kernel size when none is given
pub fn sigma_for(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1D Gaussian kernel of odd `size`, sigma derived from the size
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) | 1;
    if size <= 7 {
        return SMALL_KERNELS[(size / 2) as usize].to_vec();
    }

    let sigma = sigma_for(size);
    let center = (size / 2) as f32;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Gaussian blur with a square `kernel_size` window
/// Suppresses sensor noise that would otherwise break contours apart
pub fn apply(image: &GrayImage, kernel_size: u32) -> GrayImage {
    let kernel = gaussian_kernel(kernel_size);
    separable_filter_equal(image, kernel.as_slice())
}
