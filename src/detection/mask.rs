//! Binary-mask operations. Non-zero pixels are foreground.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_polygon_mut;
use imageproc::morphology::{dilate, erode};
use imageproc::point::Point as PixelPoint;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::frame::DepthImage;
use crate::geometry::{Point, Rect, RotatedRect};

/// Order of the two morphology passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphologyOrder {
    #[default]
    ErodeThenDilate,
    DilateThenErode,
}

/// Fill a polygon given in pixel coordinates. Polygons that collapse to
/// fewer than three distinct pixels are skipped.
pub fn fill_polygon(mask: &mut GrayImage, points: &[Point], value: u8) {
    let mut pixels: Vec<PixelPoint<i32>> = points
        .iter()
        .map(|p| PixelPoint::new(p.x.round() as i32, p.y.round() as i32))
        .collect();
    pixels.dedup();
    while pixels.len() > 1 && pixels.first() == pixels.last() {
        pixels.pop();
    }
    if pixels.len() < 3 {
        return;
    }
    draw_polygon_mut(mask, &pixels, Luma([value]));
}

pub fn fill_rotated_rect(mask: &mut GrayImage, rect: &RotatedRect, value: u8) {
    fill_polygon(mask, &rect.points(), value);
}

/// Erode and dilate with a square (chessboard) structuring element whose
/// radius is the iteration count. A count of zero skips that pass.
pub fn erode_dilate(mask: &GrayImage, erode_by: u8, dilate_by: u8, order: MorphologyOrder) -> GrayImage {
    let eroded = |image: GrayImage| {
        if erode_by > 0 {
            erode(&image, Norm::LInf, erode_by)
        } else {
            image
        }
    };
    let dilated = |image: GrayImage| {
        if dilate_by > 0 {
            dilate(&image, Norm::LInf, dilate_by)
        } else {
            image
        }
    };
    match order {
        MorphologyOrder::ErodeThenDilate => dilated(eroded(mask.clone())),
        MorphologyOrder::DilateThenErode => eroded(dilated(mask.clone())),
    }
}

/// Copy of `image` restricted to the non-zero pixels of `region`.
pub fn masked(image: &GrayImage, region: &GrayImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if region.get_pixel(x, y)[0] != 0 {
            *image.get_pixel(x, y)
        } else {
            Luma([0])
        }
    })
}

/// Bitwise OR of `src` onto `dst`. Both must have the same dimensions.
pub fn or_into(dst: &mut GrayImage, src: &GrayImage) {
    for (d, s) in dst.pixels_mut().zip(src.pixels()) {
        d[0] |= s[0];
    }
}

pub fn count_non_zero(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] != 0).count()
}

/// Copy out a whole-pixel region of interest. An empty ROI yields an empty image.
pub fn crop(image: &GrayImage, roi: &Rect) -> GrayImage {
    if roi.is_empty() {
        return GrayImage::new(0, 0);
    }
    imageops::crop_imm(
        image,
        roi.x as u32,
        roi.y as u32,
        roi.width as u32,
        roi.height as u32,
    )
    .to_image()
}

/// Binary depth map at the frame resolution: non-zero depth at or below
/// `cutoff` is foreground, everything else (including missing depth) is
/// background.
pub fn threshold_depth(depth: &DepthImage, cutoff: u16, width: u32, height: u32) -> GrayImage {
    let resized: DepthImage;
    let depth = if depth.dimensions() != (width, height) {
        debug!(
            "resizing depth {}x{} to frame {width}x{height}",
            depth.width(),
            depth.height()
        );
        resized = imageops::resize(depth, width, height, FilterType::Nearest);
        &resized
    } else {
        depth
    };

    GrayImage::from_fn(width, height, |x, y| {
        let d = depth.get_pixel(x, y)[0];
        Luma([if d != 0 && d <= cutoff { 255 } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    #[test]
    fn test_fill_rotated_rect() {
        let mut mask = GrayImage::new(50, 50);
        let rect = RotatedRect::new(Point::new(25.0, 25.0), Size::new(20.0, 10.0), 0.0);
        fill_rotated_rect(&mut mask, &rect, 255);
        assert_eq!(mask.get_pixel(25, 25)[0], 255);
        assert_eq!(mask.get_pixel(25, 35)[0], 0);
        let filled = count_non_zero(&mask);
        assert!((200..=260).contains(&filled), "filled {filled}");
    }

    #[test]
    fn test_degenerate_polygon_is_skipped() {
        let mut mask = GrayImage::new(10, 10);
        fill_polygon(&mut mask, &[Point::new(2.0, 2.0), Point::new(2.2, 2.1)], 255);
        assert_eq!(count_non_zero(&mask), 0);
    }

    #[test]
    fn test_erode_then_dilate_removes_speckle() {
        let mut mask = GrayImage::new(30, 30);
        mask.put_pixel(3, 3, Luma([255]));
        for y in 10..20 {
            for x in 10..20 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let opened = erode_dilate(&mask, 1, 1, MorphologyOrder::ErodeThenDilate);
        assert_eq!(opened.get_pixel(3, 3)[0], 0);
        assert_eq!(count_non_zero(&opened), 100);

        let untouched = erode_dilate(&mask, 0, 0, MorphologyOrder::DilateThenErode);
        assert_eq!(untouched, mask);
    }

    #[test]
    fn test_masked_and_or() {
        let mut image = GrayImage::new(4, 1);
        image.put_pixel(0, 0, Luma([255]));
        image.put_pixel(1, 0, Luma([255]));
        let mut region = GrayImage::new(4, 1);
        region.put_pixel(1, 0, Luma([255]));
        region.put_pixel(2, 0, Luma([255]));

        let only = masked(&image, &region);
        assert_eq!(count_non_zero(&only), 1);
        assert_eq!(only.get_pixel(1, 0)[0], 255);

        let mut merged = only.clone();
        or_into(&mut merged, &region);
        assert_eq!(count_non_zero(&merged), 2);
    }

    #[test]
    fn test_crop() {
        let mut image = GrayImage::new(10, 10);
        image.put_pixel(5, 6, Luma([255]));
        let cropped = crop(&image, &Rect::new(4.0, 4.0, 3.0, 3.0));
        assert_eq!(cropped.dimensions(), (3, 3));
        assert_eq!(cropped.get_pixel(1, 2)[0], 255);
        assert_eq!(crop(&image, &Rect::default()).dimensions(), (0, 0));
    }

    #[test]
    fn test_threshold_depth_resizes() {
        let mut depth = DepthImage::new(2, 2);
        depth.put_pixel(0, 0, Luma([500]));
        depth.put_pixel(1, 0, Luma([1500]));
        let binary = threshold_depth(&depth, 1000, 4, 4);
        assert_eq!(binary.dimensions(), (4, 4));
        assert_eq!(binary.get_pixel(0, 0)[0], 255);
        assert_eq!(binary.get_pixel(1, 1)[0], 255);
        assert_eq!(binary.get_pixel(2, 0)[0], 0);
        assert_eq!(binary.get_pixel(0, 3)[0], 0);
    }
}
