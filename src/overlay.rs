//! Debug visualization of the tracker state. Never read back by the tracker.

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_polygon_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;

use crate::geometry::Point;
use crate::tracker::{TrackState, TrackedObject};

const TRACKED: Rgb<u8> = Rgb([0, 200, 0]);
const OCCLUDED: Rgb<u8> = Rgb([255, 160, 0]);
const STALE: Rgb<u8> = Rgb([200, 0, 0]);
const CENTER: Rgb<u8> = Rgb([0, 120, 255]);

/// Render `mask` in gray with each object on top: tracked objects filled,
/// occluded and stale objects outlined by their rotated rectangle, and a
/// cross at every center.
pub fn render(mask: &GrayImage, objects: &[TrackedObject]) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(mask.clone()).to_rgb8();
    for object in objects {
        match object.state {
            TrackState::Tracked => fill(&mut canvas, &object.points, TRACKED),
            TrackState::Occluded => outline(&mut canvas, &object.shape.points(), OCCLUDED),
            TrackState::NotTracked => outline(&mut canvas, &object.shape.points(), STALE),
        }
        draw_cross_mut(
            &mut canvas,
            CENTER,
            object.center.x.round() as i32,
            object.center.y.round() as i32,
        );
    }
    canvas
}

fn fill(canvas: &mut RgbImage, points: &[Point], color: Rgb<u8>) {
    let mut pixels: Vec<PixelPoint<i32>> = points
        .iter()
        .map(|p| PixelPoint::new(p.x.round() as i32, p.y.round() as i32))
        .collect();
    pixels.dedup();
    while pixels.len() > 1 && pixels.first() == pixels.last() {
        pixels.pop();
    }
    if pixels.len() >= 3 {
        draw_polygon_mut(canvas, &pixels, color);
    }
}

fn outline(canvas: &mut RgbImage, points: &[Point], color: Rgb<u8>) {
    let corners: Vec<PixelPoint<f32>> = points.iter().map(|p| PixelPoint::new(p.x, p.y)).collect();
    draw_hollow_polygon_mut(canvas, &corners, color);
}
