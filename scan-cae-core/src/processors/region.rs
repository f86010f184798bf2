//! Contour-based region-of-interest extraction.
//!
//! The [`RegionExtractor`] resizes a scan to a fixed working frame, builds a
//! cleaned binary mask of the bright foreground, picks the external contour
//! with the largest enclosed area and crops the working image to that
//! contour's extreme points:
//!
//! ```text
//! load ─▶ resize 224² (cubic) ─▶ gray ─▶ blur 5x5 ─▶ threshold > 45
//!      ─▶ erode x2 ─▶ dilate x2 ─▶ external contours ─▶ largest area
//!      ─▶ extreme points ─▶ padded, clamped crop of the working image
//! ```
//!
//! Every constant in that chain comes from [`RegionExtractorConfig`].

use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::{
    DEFAULT_BLUR_KERNEL_SIZE, DEFAULT_BLUR_SIGMA, DEFAULT_CROP_PADDING, DEFAULT_DILATE_ITERATIONS,
    DEFAULT_ERODE_ITERATIONS, DEFAULT_FOREGROUND_THRESHOLD, DEFAULT_WORKING_SIZE,
};
use crate::core::errors::{ScanError, ScanResult};
use crate::core::traits::MorphologyOps;
use crate::processors::filter::gaussian_blur;
use crate::processors::geometry::{Contour, CropRegion, ExtremePoints};
use crate::processors::morphology::ImageprocMorphology;
use crate::utils::image::{load_image, load_image_from_bytes};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Parameters of the region extractor.
///
/// Defaults reproduce the reference preprocessing exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionExtractorConfig {
    /// Side length of the square working frame (default: 224).
    #[serde(default = "RegionExtractorConfig::default_working_size")]
    pub working_size: u32,
    /// Gaussian kernel size, odd (default: 5).
    #[serde(default = "RegionExtractorConfig::default_blur_kernel_size")]
    pub blur_kernel_size: u32,
    /// Gaussian sigma; 0 derives it from the kernel size (default: 0).
    #[serde(default = "RegionExtractorConfig::default_blur_sigma")]
    pub blur_sigma: f64,
    /// Intensities strictly above this become foreground (default: 45).
    #[serde(default = "RegionExtractorConfig::default_threshold")]
    pub threshold: u8,
    /// Erosion passes on the binary mask (default: 2).
    #[serde(default = "RegionExtractorConfig::default_erode_iterations")]
    pub erode_iterations: u8,
    /// Dilation passes on the eroded mask (default: 2).
    #[serde(default = "RegionExtractorConfig::default_dilate_iterations")]
    pub dilate_iterations: u8,
    /// Margin added on every side of the crop before clamping (default: 0).
    #[serde(default = "RegionExtractorConfig::default_padding")]
    pub padding: u32,
}

impl RegionExtractorConfig {
    /// Creates a configuration with the reference defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working frame size.
    pub fn with_working_size(mut self, size: u32) -> Self {
        self.working_size = size;
        self
    }

    /// Sets the blur kernel size and sigma.
    pub fn with_blur(mut self, kernel_size: u32, sigma: f64) -> Self {
        self.blur_kernel_size = kernel_size;
        self.blur_sigma = sigma;
        self
    }

    /// Sets the foreground threshold.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the erosion and dilation pass counts.
    pub fn with_morphology(mut self, erode_iterations: u8, dilate_iterations: u8) -> Self {
        self.erode_iterations = erode_iterations;
        self.dilate_iterations = dilate_iterations;
        self
    }

    /// Sets the crop padding.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    fn default_working_size() -> u32 {
        DEFAULT_WORKING_SIZE
    }

    fn default_blur_kernel_size() -> u32 {
        DEFAULT_BLUR_KERNEL_SIZE
    }

    fn default_blur_sigma() -> f64 {
        DEFAULT_BLUR_SIGMA
    }

    fn default_threshold() -> u8 {
        DEFAULT_FOREGROUND_THRESHOLD
    }

    fn default_erode_iterations() -> u8 {
        DEFAULT_ERODE_ITERATIONS
    }

    fn default_dilate_iterations() -> u8 {
        DEFAULT_DILATE_ITERATIONS
    }

    fn default_padding() -> u32 {
        DEFAULT_CROP_PADDING
    }
}

impl Default for RegionExtractorConfig {
    fn default() -> Self {
        Self {
            working_size: Self::default_working_size(),
            blur_kernel_size: Self::default_blur_kernel_size(),
            blur_sigma: Self::default_blur_sigma(),
            threshold: Self::default_threshold(),
            erode_iterations: Self::default_erode_iterations(),
            dilate_iterations: Self::default_dilate_iterations(),
            padding: Self::default_padding(),
        }
    }
}

impl ConfigValidator for RegionExtractorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_image_dimensions(self.working_size, self.working_size)?;
        self.validate_odd_kernel(self.blur_kernel_size, "blur_kernel_size")?;
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "blur_sigma must be finite and non-negative, got {}",
                    self.blur_sigma
                ),
            });
        }
        if self.padding >= self.working_size {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "padding {} must be smaller than the working size {}",
                    self.padding, self.working_size
                ),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// The result of region extraction.
#[derive(Debug, Clone)]
pub struct RegionCrop {
    /// The cropped color image, cut from the working-resolution frame.
    pub image: RgbImage,
    /// The rectangle that was cut, in working-frame coordinates.
    pub region: CropRegion,
    /// Extreme points of the selected contour, in working-frame coordinates.
    pub extremes: ExtremePoints,
    /// Area enclosed by the selected contour.
    pub contour_area: f64,
}

/// The selected contour and everything derived from it on the working frame.
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "visualization"), allow(dead_code))]
pub(crate) struct LocatedRegion {
    pub(crate) contour: Contour,
    pub(crate) area: f64,
    pub(crate) extremes: ExtremePoints,
}

/// Finds the dominant foreground blob of a scan and crops to it.
#[derive(Debug, Clone)]
pub struct RegionExtractor<M: MorphologyOps = ImageprocMorphology> {
    config: RegionExtractorConfig,
    morphology: M,
}

impl RegionExtractor<ImageprocMorphology> {
    /// Creates an extractor with the imageproc backend.
    pub fn new(config: RegionExtractorConfig) -> ScanResult<Self> {
        Self::with_backend(config, ImageprocMorphology)
    }
}

impl Default for RegionExtractor<ImageprocMorphology> {
    fn default() -> Self {
        Self {
            config: RegionExtractorConfig::default(),
            morphology: ImageprocMorphology,
        }
    }
}

impl<M: MorphologyOps> RegionExtractor<M> {
    /// Creates an extractor with a custom mask backend.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::ConfigError` if the configuration is invalid.
    pub fn with_backend(config: RegionExtractorConfig, morphology: M) -> ScanResult<Self> {
        config.validate()?;
        Ok(Self { config, morphology })
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &RegionExtractorConfig {
        &self.config
    }

    /// Loads the image at `path` and extracts its dominant region.
    ///
    /// # Errors
    ///
    /// * `ScanError::Io` / `ScanError::ImageLoad` if the file cannot be read or decoded.
    /// * `ScanError::NoRegionFound` if no foreground contour survives the mask cleanup.
    /// * `ScanError::EmptyRegion` if the selected contour spans zero rows or columns.
    pub fn extract(&self, path: &Path) -> ScanResult<RegionCrop> {
        let image = load_image(path)?;
        self.extract_from_image(&DynamicImage::ImageRgb8(image))
    }

    /// Decodes an in-memory image and extracts its dominant region.
    pub fn extract_from_bytes(&self, bytes: &[u8]) -> ScanResult<RegionCrop> {
        let image = load_image_from_bytes(bytes)?;
        self.extract_from_image(&DynamicImage::ImageRgb8(image))
    }

    /// Extracts the dominant region of an already decoded image.
    pub fn extract_from_image(&self, image: &DynamicImage) -> ScanResult<RegionCrop> {
        let working = self.to_working_frame(image);
        let located = self.locate(&working)?;

        let (width, height) = working.dimensions();
        let region = CropRegion::from_extremes(&located.extremes, self.config.padding, width, height);
        if region.clamped {
            debug!(
                padding = self.config.padding,
                ?region,
                "crop rectangle clamped to the working frame"
            );
        }
        if region.is_empty() {
            return Err(ScanError::EmptyRegion {
                width: region.width(),
                height: region.height(),
            });
        }

        let cropped = imageops::crop_imm(
            &working,
            region.left,
            region.top,
            region.width(),
            region.height(),
        )
        .to_image();

        debug!(
            left = region.left,
            top = region.top,
            width = region.width(),
            height = region.height(),
            "cropped region of interest"
        );

        Ok(RegionCrop {
            image: cropped,
            region,
            extremes: located.extremes,
            contour_area: located.area,
        })
    }

    /// Resizes `image` to the square working frame with cubic interpolation.
    ///
    /// Images already at the working size are copied unchanged.
    pub fn to_working_frame(&self, image: &DynamicImage) -> RgbImage {
        let size = self.config.working_size;
        let rgb = image.to_rgb8();
        if rgb.dimensions() == (size, size) {
            return rgb;
        }
        imageops::resize(&rgb, size, size, FilterType::CatmullRom)
    }

    /// Builds the cleaned binary mask of a working-frame image.
    pub fn foreground_mask(&self, working: &RgbImage) -> GrayImage {
        let gray = imageops::grayscale(working);
        let blurred = gaussian_blur(&gray, self.config.blur_kernel_size, self.config.blur_sigma);
        let binary = self.morphology.threshold(&blurred, self.config.threshold);
        let eroded = self.morphology.erode(&binary, self.config.erode_iterations);
        self.morphology.dilate(&eroded, self.config.dilate_iterations)
    }

    /// Selects the largest external contour of the working frame.
    pub(crate) fn locate(&self, working: &RgbImage) -> ScanResult<LocatedRegion> {
        let mask = self.foreground_mask(working);
        let contours = self.morphology.find_external_contours(&mask);
        debug!(contours = contours.len(), "traced external contours");

        let (contour, area) = self.largest_contour(contours).ok_or_else(|| {
            let foreground_pixels = mask.pixels().filter(|p| p[0] > 0).count();
            ScanError::NoRegionFound { foreground_pixels }
        })?;

        let extremes = contour.extreme_points().ok_or(ScanError::NoRegionFound {
            foreground_pixels: 0,
        })?;
        debug!(area, ?extremes, "selected dominant contour");

        Ok(LocatedRegion {
            contour,
            area,
            extremes,
        })
    }

    /// Returns the contour with the largest area; ties keep the earliest contour.
    fn largest_contour(&self, contours: Vec<Contour>) -> Option<(Contour, f64)> {
        let mut best: Option<(Contour, f64)> = None;
        for contour in contours {
            let area = self.morphology.contour_area(&contour);
            if best.as_ref().is_none_or(|(_, best_area)| area > *best_area) {
                best = Some((contour, area));
            }
        }
        best
    }

    /// Renders the selected contour and its extreme points on the working frame.
    #[cfg(feature = "visualization")]
    pub fn debug_overlay(&self, image: &DynamicImage) -> ScanResult<RgbImage> {
        let working = self.to_working_frame(image);
        let located = self.locate(&working)?;
        Ok(crate::utils::visualization::draw_region_overlay(
            &working,
            &located.contour,
            &located.extremes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::processors::geometry::Point;
    use image::Rgb;

    fn disk_image(size: u32, cx: i32, cy: i32, radius: i32, color: Rgb<u8>) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            let dx = x as i32 - cx;
            let dy = y as i32 - cy;
            if dx * dx + dy * dy <= radius * radius {
                color
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    fn rect_image(size: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    fn near(p: Point, x: i32, y: i32, tol_x: i32, tol_y: i32) -> bool {
        (p.x - x).abs() <= tol_x && (p.y - y).abs() <= tol_y
    }

    #[test]
    fn test_all_black_image_has_no_region() {
        let extractor = RegionExtractor::default();
        let image = DynamicImage::ImageRgb8(RgbImage::new(224, 224));
        let err = extractor.extract_from_image(&image).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoRegionFound);
        assert!(matches!(
            err,
            ScanError::NoRegionFound {
                foreground_pixels: 0
            }
        ));
    }

    #[test]
    fn test_disk_extreme_points() {
        let extractor = RegionExtractor::default();
        let image = DynamicImage::ImageRgb8(disk_image(224, 112, 112, 50, Rgb([255, 255, 255])));
        let crop = extractor.extract_from_image(&image).unwrap();

        // The disk boundary is flat over a short run at each extreme and the
        // first traced point of the run wins, so only the on-axis coordinate
        // is tight.
        let ext = crop.extremes;
        assert!(near(ext.left, 62, 112, 3, 12), "left {:?}", ext.left);
        assert!(near(ext.right, 162, 112, 3, 12), "right {:?}", ext.right);
        assert!(near(ext.top, 112, 62, 12, 3), "top {:?}", ext.top);
        assert!(near(ext.bottom, 112, 162, 12, 3), "bottom {:?}", ext.bottom);

        let region = crop.region;
        assert!((region.left as i32 - 62).abs() <= 3, "{region:?}");
        assert!((region.right as i32 - 162).abs() <= 3, "{region:?}");
        assert!((region.top as i32 - 62).abs() <= 3, "{region:?}");
        assert!((region.bottom as i32 - 162).abs() <= 3, "{region:?}");

        let (w, h) = crop.image.dimensions();
        assert!((94..=106).contains(&w), "width {w}");
        assert!((94..=106).contains(&h), "height {h}");
        assert!(crop.contour_area > 7000.0);
    }

    #[test]
    fn test_padded_crop_contains_blob_bounding_box() {
        let config = RegionExtractorConfig::default().with_padding(2);
        let extractor = RegionExtractor::new(config).unwrap();
        let image = DynamicImage::ImageRgb8(rect_image(224, 50, 60, 150, 170));
        let crop = extractor.extract_from_image(&image).unwrap();

        let region = crop.region;
        assert!(region.left < 50);
        assert!(region.top < 60);
        assert!(region.right > 150);
        assert!(region.bottom > 170);
        assert!(!region.clamped);
        assert_eq!(crop.image.dimensions(), (region.width(), region.height()));
    }

    #[test]
    fn test_padding_near_border_is_clamped() {
        let config = RegionExtractorConfig::default().with_padding(20);
        let extractor = RegionExtractor::new(config).unwrap();
        let image = DynamicImage::ImageRgb8(rect_image(224, 5, 5, 120, 120));
        let crop = extractor.extract_from_image(&image).unwrap();

        assert!(crop.region.clamped);
        assert_eq!(crop.region.left, 0);
        assert_eq!(crop.region.top, 0);
        assert!(crop.region.right <= 224);
    }

    #[test]
    fn test_largest_blob_wins_and_noise_is_removed() {
        let mut image = rect_image(224, 120, 120, 200, 200);
        // small bright blob: larger than noise but smaller than the main region
        for y in 20..50 {
            for x in 20..50 {
                image.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        // speckle noise removed by the opening
        image.put_pixel(5, 200, Rgb([255, 255, 255]));
        image.put_pixel(6, 200, Rgb([255, 255, 255]));

        let extractor = RegionExtractor::default();
        let crop = extractor
            .extract_from_image(&DynamicImage::ImageRgb8(image))
            .unwrap();
        assert!(crop.region.left >= 115);
        assert!(crop.region.top >= 115);
    }

    #[test]
    fn test_extremes_invariant_under_channel_order() {
        let rgb = disk_image(224, 100, 120, 60, Rgb([220, 140, 60]));
        let bgr = disk_image(224, 100, 120, 60, Rgb([60, 140, 220]));

        let extractor = RegionExtractor::default();
        let a = extractor
            .extract_from_image(&DynamicImage::ImageRgb8(rgb))
            .unwrap()
            .extremes;
        let b = extractor
            .extract_from_image(&DynamicImage::ImageRgb8(bgr))
            .unwrap()
            .extremes;

        assert!(near(a.left, b.left.x, b.left.y, 2, 8));
        assert!(near(a.right, b.right.x, b.right.y, 2, 8));
        assert!(near(a.top, b.top.x, b.top.y, 8, 2));
        assert!(near(a.bottom, b.bottom.x, b.bottom.y, 8, 2));
    }

    #[test]
    fn test_working_frame_resize() {
        let extractor = RegionExtractor::default();
        let large = DynamicImage::ImageRgb8(disk_image(512, 256, 256, 120, Rgb([200, 200, 200])));
        assert_eq!(extractor.to_working_frame(&large).dimensions(), (224, 224));

        let exact = disk_image(224, 112, 112, 40, Rgb([200, 200, 200]));
        let working = extractor.to_working_frame(&DynamicImage::ImageRgb8(exact.clone()));
        assert_eq!(working, exact);
    }

    #[test]
    fn test_larger_input_is_cropped_in_working_coordinates() {
        // Disk covering the central half of a 448x448 scan maps to ~[56, 168) in the frame.
        let extractor = RegionExtractor::default();
        let image = DynamicImage::ImageRgb8(disk_image(448, 224, 224, 112, Rgb([255, 255, 255])));
        let crop = extractor.extract_from_image(&image).unwrap();
        assert!((crop.region.left as i32 - 56).abs() <= 4);
        assert!((crop.region.right as i32 - 168).abs() <= 4);
    }

    #[test]
    fn test_one_pixel_wide_region_is_empty() {
        let config = RegionExtractorConfig::default()
            .with_blur(1, 0.0)
            .with_morphology(0, 0);
        let extractor = RegionExtractor::new(config).unwrap();
        let line = RgbImage::from_fn(224, 224, |x, y| {
            if x == 100 && (50..150).contains(&y) {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });

        let err = extractor
            .extract_from_image(&DynamicImage::ImageRgb8(line))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyRegion);
        assert!(matches!(err, ScanError::EmptyRegion { width: 0, .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = RegionExtractorConfig::default().with_blur(4, 0.0);
        assert!(RegionExtractor::new(config).is_err());

        let config = RegionExtractorConfig::default().with_padding(224);
        assert!(RegionExtractor::new(config).is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: RegionExtractorConfig =
            serde_json::from_str(r#"{"threshold": 30, "padding": 4}"#).unwrap();
        assert_eq!(config.threshold, 30);
        assert_eq!(config.padding, 4);
        assert_eq!(config.working_size, 224);
        assert_eq!(config.erode_iterations, 2);
        assert_eq!(config.dilate_iterations, 2);
    }

    #[test]
    fn test_unreadable_bytes() {
        let extractor = RegionExtractor::default();
        let err = extractor.extract_from_bytes(b"not an image").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnreadableImage);
    }
}
