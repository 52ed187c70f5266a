//! Pixel-level image filters used by the pre-render passes.
//!
//! Binary images are `GrayImage`s whose pixels are either 0 or a maximum
//! value; anything non-zero counts as foreground.

use crate::domain::model::{BoundingBox, ThresholdMethod, ThresholdParams};
use crate::utils::error::{EleganceError, Result};
use image::{DynamicImage, GenericImageView, GrayImage, Luma, Rgb, RgbImage};

pub fn to_gray(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

fn map_pixels(gray: &GrayImage, f: impl Fn(u8) -> u8) -> GrayImage {
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = f(pixel.0[0]);
    }
    out
}

/// Pixels above `level` become `max_value`, the rest 0.
pub fn threshold_binary(gray: &GrayImage, level: u8, max_value: u8) -> GrayImage {
    map_pixels(gray, |v| if v > level { max_value } else { 0 })
}

/// Pixels above `level` become 0, the rest `max_value`.
pub fn threshold_binary_inv(gray: &GrayImage, level: u8, max_value: u8) -> GrayImage {
    map_pixels(gray, |v| if v > level { 0 } else { max_value })
}

pub fn histogram(gray: &GrayImage) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for pixel in gray.pixels() {
        hist[pixel.0[0] as usize] += 1;
    }
    hist
}

/// Otsu's method: the level maximising the between-class variance of
/// `<= level` and `> level`. A single-valued image returns that value.
pub fn otsu_level(gray: &GrayImage) -> u8 {
    let hist = histogram(gray);
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 0;
    }

    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(value, count)| value as f64 * *count as f64)
        .sum();

    let mut weight_bg = 0u64;
    let mut sum_bg = 0.0;
    let mut best: Option<(u8, f64)> = None;

    for (level, count) in hist.iter().enumerate() {
        weight_bg += count;
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }

        sum_bg += level as f64 * *count as f64;
        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;
        let variance = weight_bg as f64 * weight_fg as f64 * (mean_bg - mean_fg).powi(2);

        if best.map_or(true, |(_, v)| variance > v) {
            best = Some((level as u8, variance));
        }
    }

    match best {
        Some((level, _)) => level,
        None => hist.iter().position(|c| *c > 0).unwrap_or(0) as u8,
    }
}

/// Returns the level that was applied together with the binary image.
pub fn apply_threshold(gray: &GrayImage, params: &ThresholdParams) -> (u8, GrayImage) {
    let level = match params.method {
        ThresholdMethod::Fixed => params.level,
        ThresholdMethod::Otsu => otsu_level(gray),
    };
    (level, threshold_binary(gray, level, params.max_value))
}

pub fn absolute_difference(a: &DynamicImage, b: &DynamicImage) -> Result<RgbImage> {
    if a.dimensions() != b.dimensions() {
        return Err(EleganceError::DimensionMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }

    let (a, b) = (a.to_rgb8(), b.to_rgb8());
    let mut out = RgbImage::new(a.width(), a.height());
    for ((dst, pa), pb) in out.pixels_mut().zip(a.pixels()).zip(b.pixels()) {
        *dst = Rgb([
            pa.0[0].abs_diff(pb.0[0]),
            pa.0[1].abs_diff(pb.0[1]),
            pa.0[2].abs_diff(pb.0[2]),
        ]);
    }
    Ok(out)
}

// 3x3 square kernel, applied as a horizontal then a vertical pass.
fn morph_once(src: &GrayImage, op: fn(u8, u8) -> u8) -> GrayImage {
    let (width, height) = src.dimensions();

    let horizontal = GrayImage::from_fn(width, height, |x, y| {
        let mut acc = src.get_pixel(x, y).0[0];
        if x > 0 {
            acc = op(acc, src.get_pixel(x - 1, y).0[0]);
        }
        if x + 1 < width {
            acc = op(acc, src.get_pixel(x + 1, y).0[0]);
        }
        Luma([acc])
    });

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc = horizontal.get_pixel(x, y).0[0];
        if y > 0 {
            acc = op(acc, horizontal.get_pixel(x, y - 1).0[0]);
        }
        if y + 1 < height {
            acc = op(acc, horizontal.get_pixel(x, y + 1).0[0]);
        }
        Luma([acc])
    })
}

fn morph(src: &GrayImage, iterations: u32, op: fn(u8, u8) -> u8) -> GrayImage {
    let mut out = src.clone();
    for _ in 0..iterations {
        out = morph_once(&out, op);
    }
    out
}

pub fn erode(binary: &GrayImage, iterations: u32) -> GrayImage {
    morph(binary, iterations, u8::min)
}

pub fn dilate(binary: &GrayImage, iterations: u32) -> GrayImage {
    morph(binary, iterations, u8::max)
}

/// Outline from `(x, y)` to `(x + width, y + height)`, growing `thickness`
/// pixels inward. Parts outside the image are skipped.
pub fn draw_rectangle(image: &mut GrayImage, bbox: &BoundingBox, value: u8, thickness: u32) {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let x0 = bbox.x as i64;
    let y0 = bbox.y as i64;
    let x1 = x0 + bbox.width as i64;
    let y1 = y0 + bbox.height as i64;

    let mut put = |x: i64, y: i64| {
        if x >= 0 && y >= 0 && x < width && y < height {
            image.put_pixel(x as u32, y as u32, Luma([value]));
        }
    };

    for t in 0..thickness.max(1) as i64 {
        let (left, top, right, bottom) = (x0 + t, y0 + t, x1 - t, y1 - t);
        if left > right || top > bottom {
            break;
        }
        for x in left..=right {
            put(x, top);
            put(x, bottom);
        }
        for y in top..=bottom {
            put(left, y);
            put(right, y);
        }
    }
}
