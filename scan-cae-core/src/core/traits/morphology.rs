//! The binary-mask capability set the region extractor depends on.
//!
//! [`RegionExtractor`](crate::processors::RegionExtractor) never calls an
//! image-processing library directly for mask work; it goes through this trait
//! so another backend can be swapped in as long as it provides thresholding,
//! erosion, dilation, external contour tracing and contour area.

use crate::processors::Contour;
use image::GrayImage;
use std::fmt::Debug;

/// Operations on single-channel 8-bit masks.
pub trait MorphologyOps: Debug + Send + Sync {
    /// Binarizes `image`: pixels strictly greater than `level` become 255, others 0.
    fn threshold(&self, image: &GrayImage, level: u8) -> GrayImage;

    /// Applies `iterations` passes of erosion with a 3x3 square structuring element.
    ///
    /// Zero iterations returns the mask unchanged.
    fn erode(&self, mask: &GrayImage, iterations: u8) -> GrayImage;

    /// Applies `iterations` passes of dilation with a 3x3 square structuring element.
    ///
    /// Zero iterations returns the mask unchanged.
    fn dilate(&self, mask: &GrayImage, iterations: u8) -> GrayImage;

    /// Traces the outer boundaries of foreground regions that are not nested
    /// inside another region.
    fn find_external_contours(&self, mask: &GrayImage) -> Vec<Contour>;

    /// Area enclosed by `contour`.
    fn contour_area(&self, contour: &Contour) -> f64 {
        contour.area()
    }
}
