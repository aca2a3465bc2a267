#![allow(dead_code)]

use image::{GrayImage, Luma};
use ndarray::Array2;
use nucleiseg::segmentation::{PixelEncoding, RawImage};

pub const BACKGROUND: u8 = 0;
pub const NUCLEUS: u8 = 200;

fn inside_any(row: usize, col: usize, disks: &[(f64, f64, f64)]) -> bool {
    disks.iter().any(|&(cr, cc, radius)| {
        let dr = row as f64 - cr;
        let dc = col as f64 - cc;
        dr * dr + dc * dc <= radius * radius
    })
}

/// Bright disks `(center_row, center_col, radius)` on a dark background
pub fn disks_image(rows: usize, cols: usize, disks: &[(f64, f64, f64)]) -> RawImage {
    let pixels = Array2::from_shape_fn((rows, cols), |(r, c)| {
        if inside_any(r, c, disks) {
            NUCLEUS as f64
        } else {
            BACKGROUND as f64
        }
    });
    RawImage::new(pixels, PixelEncoding::U8)
}

/// Same drawing as [`disks_image`], as an 8-bit image file payload
pub fn disks_gray(rows: usize, cols: usize, disks: &[(f64, f64, f64)]) -> GrayImage {
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        if inside_any(y as usize, x as usize, disks) {
            Luma([NUCLEUS])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// Footprint of a single disk
pub fn disk_footprint(rows: usize, cols: usize, disk: (f64, f64, f64)) -> Array2<bool> {
    Array2::from_shape_fn((rows, cols), |(r, c)| inside_any(r, c, &[disk]))
}

/// Bright axis-aligned ellipse with semi-axes `half_width` (columns) and
/// `half_height` (rows)
pub fn ellipse_image(
    rows: usize,
    cols: usize,
    center: (f64, f64),
    half_width: f64,
    half_height: f64,
) -> RawImage {
    let pixels = Array2::from_shape_fn((rows, cols), |(r, c)| {
        let dr = (r as f64 - center.0) / half_height;
        let dc = (c as f64 - center.1) / half_width;
        if dr * dr + dc * dc <= 1.0 {
            NUCLEUS as f64
        } else {
            BACKGROUND as f64
        }
    });
    RawImage::new(pixels, PixelEncoding::U8)
}
