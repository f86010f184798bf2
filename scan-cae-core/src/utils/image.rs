//! Utility functions for loading and converting scan images.
//!
//! Scans are decoded with the `image` crate into 8-bit RGB, whatever their
//! on-disk format and channel layout.

use crate::core::errors::ScanResult;
use image::{DynamicImage, RgbImage};
use std::path::Path;

/// Converts a DynamicImage to an RgbImage.
///
/// # Arguments
///
/// * `img` - The DynamicImage to convert
///
/// # Returns
///
/// * `RgbImage` - The converted RGB image
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// Returns `ScanError::Io` if the file cannot be read and
/// `ScanError::ImageLoad` if its contents cannot be decoded.
pub fn load_image(path: &Path) -> ScanResult<RgbImage> {
    let img = image::open(path)?;
    Ok(dynamic_to_rgb(img))
}

/// Decodes an image held in memory, guessing the format from its header.
///
/// # Errors
///
/// Returns `ScanError::ImageLoad` if the bytes are not a supported image.
pub fn load_image_from_bytes(bytes: &[u8]) -> ScanResult<RgbImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(dynamic_to_rgb(img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ErrorKind, ScanError};
    use image::{GrayImage, Rgb};
    use std::io::Cursor;

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_load_image_from_bytes() {
        let image = RgbImage::from_pixel(8, 6, Rgb([10, 20, 30]));
        let decoded = load_image_from_bytes(&png_bytes(&image)).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_grayscale_input_is_expanded_to_rgb() {
        let gray = GrayImage::from_pixel(4, 4, image::Luma([77]));
        let rgb = dynamic_to_rgb(DynamicImage::ImageLuma8(gray));
        assert_eq!(rgb.get_pixel(2, 2), &Rgb([77, 77, 77]));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, ScanError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::UnreadableImage);
    }
}
