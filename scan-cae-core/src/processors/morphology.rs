//! [`MorphologyOps`] backed by imageproc.

use crate::core::traits::MorphologyOps;
use crate::processors::geometry::Contour;
use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::morphology;

/// Default mask backend.
///
/// Repeated 3x3 square passes are expressed as a single chessboard-distance
/// (`Norm::LInf`) operation of radius `iterations`, which is the same set
/// operation. Pixels outside the frame never erode the mask.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocMorphology;

impl ImageprocMorphology {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl MorphologyOps for ImageprocMorphology {
    fn threshold(&self, image: &GrayImage, level: u8) -> GrayImage {
        let mut mask = image.clone();
        for pixel in mask.pixels_mut() {
            *pixel = if pixel[0] > level { Luma([255]) } else { Luma([0]) };
        }
        mask
    }

    fn erode(&self, mask: &GrayImage, iterations: u8) -> GrayImage {
        if iterations == 0 {
            return mask.clone();
        }
        morphology::erode(mask, Norm::LInf, iterations)
    }

    fn dilate(&self, mask: &GrayImage, iterations: u8) -> GrayImage {
        if iterations == 0 {
            return mask.clone();
        }
        morphology::dilate(mask, Norm::LInf, iterations)
    }

    fn find_external_contours(&self, mask: &GrayImage) -> Vec<Contour> {
        find_contours::<i32>(mask)
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(Contour::from_imageproc)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with_rect(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_threshold_is_strict() {
        let image = GrayImage::from_fn(3, 1, |x, _| Luma([44 + x as u8]));
        let mask = ImageprocMorphology.threshold(&image, 45);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(1, 0)[0], 0);
        assert_eq!(mask.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_erode_then_dilate_removes_small_blobs() {
        let mut mask = mask_with_rect(64, 64, 20, 20, 44, 44);
        // 3x3 speck far from the main region
        for y in 2..5 {
            for x in 2..5 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }

        let backend = ImageprocMorphology;
        let cleaned = backend.dilate(&backend.erode(&mask, 2), 2);

        assert_eq!(cleaned.get_pixel(3, 3)[0], 0);
        assert_eq!(cleaned.get_pixel(20, 20)[0], 255);
        assert_eq!(cleaned.get_pixel(43, 43)[0], 255);
        assert_eq!(cleaned.get_pixel(44, 44)[0], 0);
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let mask = mask_with_rect(16, 16, 4, 4, 8, 8);
        let backend = ImageprocMorphology;
        assert_eq!(backend.erode(&mask, 0), mask);
        assert_eq!(backend.dilate(&mask, 0), mask);
    }

    #[test]
    fn test_external_contours_skip_nested_regions() {
        // Ring with a blob inside its hole, plus a separate square.
        let mut mask = mask_with_rect(80, 80, 5, 5, 45, 45);
        for y in 10..40 {
            for x in 10..40 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        for y in 20..30 {
            for x in 20..30 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        for y in 60..70 {
            for x in 60..70 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }

        let contours = ImageprocMorphology.find_external_contours(&mask);
        assert_eq!(contours.len(), 2);

        let largest = contours
            .iter()
            .map(|c| ImageprocMorphology.contour_area(c))
            .fold(0.0, f64::max);
        assert_eq!(largest, 39.0 * 39.0);
    }

    #[test]
    fn test_no_contours_on_empty_mask() {
        let mask = GrayImage::new(32, 32);
        assert!(ImageprocMorphology.find_external_contours(&mask).is_empty());
    }
}
