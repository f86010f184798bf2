//! Geometric primitives for region extraction.
//!
//! This module provides the integer point type used by traced contours, the
//! contour itself with its enclosed area, the four extreme points of a contour
//! and the clamped crop rectangle derived from them.

use imageproc::point::Point as ImageProcPoint;
use serde::{Deserialize, Serialize};

/// A 2D point with integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// X-coordinate (column) of the point.
    pub x: i32,
    /// Y-coordinate (row) of the point.
    pub y: i32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Creates a point from an imageproc point.
    pub fn from_imageproc_point(p: ImageProcPoint<i32>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// An ordered sequence of points describing the closed boundary of a
/// connected foreground region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Boundary points in tracing order.
    pub points: Vec<Point>,
}

impl Contour {
    /// Creates a contour from a vector of points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Creates a contour from an imageproc contour.
    pub fn from_imageproc(contour: &imageproc::contours::Contour<i32>) -> Self {
        let points = contour
            .points
            .iter()
            .map(|p| Point::from_imageproc_point(*p))
            .collect();
        Self { points }
    }

    /// Number of points on the boundary.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true when the contour has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Calculates the enclosed area using the shoelace formula.
    ///
    /// Returns 0.0 if the contour has fewer than 3 points.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }

        let n = self.points.len();
        let mut twice_area = 0i64;
        for i in 0..n {
            let j = (i + 1) % n;
            let (a, b) = (self.points[i], self.points[j]);
            twice_area += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
        }
        twice_area.abs() as f64 / 2.0
    }

    /// Computes the extreme points of the contour.
    ///
    /// Returns `None` for an empty contour.
    pub fn extreme_points(&self) -> Option<ExtremePoints> {
        ExtremePoints::from_points(&self.points)
    }
}

/// The four boundary points that achieve the minimum and maximum on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtremePoints {
    /// Point with the smallest x.
    pub left: Point,
    /// Point with the largest x.
    pub right: Point,
    /// Point with the smallest y.
    pub top: Point,
    /// Point with the largest y.
    pub bottom: Point,
}

impl ExtremePoints {
    /// Scans `points` once and keeps, for each axis extreme, the first point
    /// in scan order that achieves it.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let mut extremes = Self {
            left: first,
            right: first,
            top: first,
            bottom: first,
        };

        for &p in rest {
            if p.x < extremes.left.x {
                extremes.left = p;
            }
            if p.x > extremes.right.x {
                extremes.right = p;
            }
            if p.y < extremes.top.y {
                extremes.top = p;
            }
            if p.y > extremes.bottom.y {
                extremes.bottom = p;
            }
        }

        Some(extremes)
    }
}

/// Axis-aligned crop rectangle with exclusive `right` and `bottom` edges.
///
/// Built from [`ExtremePoints`] as `[top.y, bottom.y) x [left.x, right.x)`,
/// grown by a symmetric padding and clamped to the image frame, so
/// `left <= right` and `top <= bottom` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    /// First column inside the region.
    pub left: u32,
    /// First row inside the region.
    pub top: u32,
    /// First column past the region.
    pub right: u32,
    /// First row past the region.
    pub bottom: u32,
    /// True when padding pushed the rectangle past the frame and it was clamped.
    pub clamped: bool,
}

impl CropRegion {
    /// Derives the crop rectangle for an image of `width` x `height` pixels.
    pub fn from_extremes(
        extremes: &ExtremePoints,
        padding: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let pad = padding as i64;
        let raw_left = extremes.left.x as i64 - pad;
        let raw_right = extremes.right.x as i64 + pad;
        let raw_top = extremes.top.y as i64 - pad;
        let raw_bottom = extremes.bottom.y as i64 + pad;

        let clamp_x = |v: i64| v.clamp(0, width as i64) as u32;
        let clamp_y = |v: i64| v.clamp(0, height as i64) as u32;

        let left = clamp_x(raw_left);
        let right = clamp_x(raw_right).max(left);
        let top = clamp_y(raw_top);
        let bottom = clamp_y(raw_bottom).max(top);

        let clamped = left as i64 != raw_left
            || right as i64 != raw_right
            || top as i64 != raw_top
            || bottom as i64 != raw_bottom;

        Self {
            left,
            top,
            right,
            bottom,
            clamped,
        }
    }

    /// Width of the region in pixels.
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Height of the region in pixels.
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Returns true when the region covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Returns true when the pixel `(x, y)` lies inside the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.left..self.right).contains(&x) && (self.top..self.bottom).contains(&y)
    }
}
