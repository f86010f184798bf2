//! Gaussian smoothing applied before thresholding.

use image::GrayImage;
use imageproc::filter::separable_filter_equal;

/// Fixed binomial kernels used for small odd sizes when no sigma is given.
const SMALL_GAUSSIAN_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[
        0.031_25, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.031_25,
    ],
];

/// Sigma derived from the kernel size when the caller passes a non-positive sigma.
pub fn auto_sigma(size: u32) -> f64 {
    0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Builds a normalized 1D Gaussian kernel of `size` taps.
///
/// With `sigma <= 0` and a size of 1, 3, 5 or 7 the fixed binomial table is
/// used; otherwise the sampled Gaussian with [`auto_sigma`] (or the given
/// sigma) is normalized to sum to one.
pub fn gaussian_kernel(size: u32, sigma: f64) -> Vec<f32> {
    if sigma <= 0.0 && size % 2 == 1 && size <= 7 {
        return SMALL_GAUSSIAN_KERNELS[(size / 2) as usize].to_vec();
    }

    let sigma = if sigma > 0.0 { sigma } else { auto_sigma(size) };
    let center = (size as f64 - 1.0) / 2.0;
    let scale = -0.5 / (sigma * sigma);

    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();

    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Smooths `image` with a `size` x `size` Gaussian, applied separably.
pub fn gaussian_blur(image: &GrayImage, size: u32, sigma: f64) -> GrayImage {
    if size <= 1 {
        return image.clone();
    }
    let kernel = gaussian_kernel(size, sigma);
    separable_filter_equal(image, &kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_small_kernel_table() {
        assert_eq!(gaussian_kernel(5, 0.0), vec![0.0625, 0.25, 0.375, 0.25, 0.0625]);
        assert_eq!(gaussian_kernel(1, 0.0), vec![1.0]);
    }

    #[test]
    fn test_sampled_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(9, 0.0);
        assert_eq!(kernel.len(), 9);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..4 {
            assert!((kernel[i] - kernel[8 - i]).abs() < 1e-7);
        }
        assert!(kernel[4] > kernel[3]);
    }

    #[test]
    fn test_auto_sigma() {
        assert!((auto_sigma(5) - 1.1).abs() < 1e-12);
        assert!((auto_sigma(9) - 1.7).abs() < 1e-12);
    }

    #[test]
    fn test_blur_preserves_uniform_image() {
        let image = GrayImage::from_pixel(20, 20, Luma([120]));
        let blurred = gaussian_blur(&image, 5, 0.0);
        assert!(blurred.pixels().all(|p| p[0] == 120));
    }

    #[test]
    fn test_blur_spreads_isolated_pixel() {
        let mut image = GrayImage::new(11, 11);
        image.put_pixel(5, 5, Luma([255]));
        let blurred = gaussian_blur(&image, 5, 0.0);
        assert!(blurred.get_pixel(5, 5)[0] < 255);
        assert!(blurred.get_pixel(5, 5)[0] > blurred.get_pixel(6, 5)[0]);
        assert_eq!(blurred.get_pixel(0, 0)[0], 0);
    }
}
