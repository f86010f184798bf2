//! Debug overlay for region extraction.
//!
//! Draws the selected contour and its four extreme points on the working
//! frame so threshold and morphology settings can be checked by eye.

use crate::processors::{Contour, ExtremePoints, Point};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

const CONTOUR_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const CONTOUR_HALF_THICKNESS: i32 = 2;
const MARKER_RADIUS: i32 = 8;
const LEFT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const RIGHT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TOP_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const BOTTOM_COLOR: Rgb<u8> = Rgb([0, 255, 255]);

/// Returns a copy of `working` with the contour (yellow, 4 px) and the extreme
/// points (left red, right green, top blue, bottom cyan) drawn on it.
pub fn draw_region_overlay(
    working: &RgbImage,
    contour: &Contour,
    extremes: &ExtremePoints,
) -> RgbImage {
    let mut canvas = working.clone();

    let points = &contour.points;
    for (i, start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        for offset in -CONTOUR_HALF_THICKNESS + 1..=CONTOUR_HALF_THICKNESS {
            draw_line_segment_mut(
                &mut canvas,
                ((start.x + offset) as f32, start.y as f32),
                ((end.x + offset) as f32, end.y as f32),
                CONTOUR_COLOR,
            );
            draw_line_segment_mut(
                &mut canvas,
                (start.x as f32, (start.y + offset) as f32),
                (end.x as f32, (end.y + offset) as f32),
                CONTOUR_COLOR,
            );
        }
    }

    let markers: [(Point, Rgb<u8>); 4] = [
        (extremes.left, LEFT_COLOR),
        (extremes.right, RIGHT_COLOR),
        (extremes.top, TOP_COLOR),
        (extremes.bottom, BOTTOM_COLOR),
    ];
    for (point, color) in markers {
        draw_filled_circle_mut(&mut canvas, (point.x, point.y), MARKER_RADIUS, color);
    }

    canvas
}
