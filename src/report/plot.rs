use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::Result;
use crate::train::history::CurveHistory;

const PANEL_WIDTH: u32 = 600;
const HEIGHT: u32 = 400;
const MARGIN: u32 = 40;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME: Rgb<u8> = Rgb([60, 60, 60]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const LOSS_COLOR: Rgb<u8> = Rgb([31, 119, 180]);
const ACC_COLOR: Rgb<u8> = Rgb([214, 39, 40]);

/// Draws test loss (left) and test accuracy (right) against evaluation
/// index and writes the figure as PNG.
///
/// The loss panel spans `[0, max loss]`; the accuracy panel spans `[0, 1]`.
pub fn render_curves(history: &CurveHistory, path: &Path) -> Result<()> {
    let mut img = RgbImage::from_pixel(PANEL_WIDTH * 2, HEIGHT, BACKGROUND);

    let max_loss = history.losses.iter().cloned().fold(0.0_f64, f64::max);
    let loss_top = if max_loss > 0.0 { max_loss } else { 1.0 };
    draw_panel(&mut img, 0, &history.losses, loss_top, LOSS_COLOR);
    draw_panel(&mut img, PANEL_WIDTH, &history.accuracies, 1.0, ACC_COLOR);

    img.save(path)?;
    Ok(())
}

fn draw_panel(img: &mut RgbImage, x_offset: u32, values: &[f64], top: f64, color: Rgb<u8>) {
    let left = x_offset + MARGIN;
    let right = x_offset + PANEL_WIDTH - MARGIN;
    let upper = MARGIN;
    let lower = HEIGHT - MARGIN;

    for i in 1..4 {
        let y = lower - (lower - upper) * i / 4;
        line(img, (left as i64, y as i64), (right as i64, y as i64), GRID);
    }
    rect(img, left, upper, right, lower, FRAME);

    let to_pixel = |i: usize, v: f64| -> (i64, i64) {
        let span = values.len().saturating_sub(1).max(1) as f64;
        let x = left as f64 + (right - left) as f64 * i as f64 / span;
        let frac = (v / top).clamp(0.0, 1.0);
        let y = lower as f64 - (lower - upper) as f64 * frac;
        (x.round() as i64, y.round() as i64)
    };

    let points: Vec<(i64, i64)> = values.iter().enumerate().map(|(i, &v)| to_pixel(i, v)).collect();
    for pair in points.windows(2) {
        line(img, pair[0], pair[1], color);
    }
    for &p in &points {
        marker(img, p, color);
    }
}

fn rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    line(img, (x0, y0), (x1, y0), color);
    line(img, (x1, y0), (x1, y1), color);
    line(img, (x1, y1), (x0, y1), color);
    line(img, (x0, y1), (x0, y0), color);
}

fn marker(img: &mut RgbImage, (cx, cy): (i64, i64), color: Rgb<u8>) {
    for dy in -2..=2 {
        for dx in -2..=2 {
            put(img, cx + dx, cy + dy, color);
        }
    }
}

// Bresenham.
fn line(img: &mut RgbImage, (mut x0, mut y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put(img, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_two_panel_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curves.png");
        let history = CurveHistory {
            losses: vec![0.4, 0.2, 0.1],
            accuracies: vec![0.3, 0.6, 0.8],
        };
        render_curves(&history, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (PANEL_WIDTH * 2, HEIGHT));
        // Final accuracy 0.8 sits at the right edge of the right panel.
        let x = PANEL_WIDTH * 2 - MARGIN;
        let y = HEIGHT - MARGIN - ((HEIGHT - 2 * MARGIN) as f64 * 0.8).round() as u32;
        assert_eq!(*img.get_pixel(x, y), ACC_COLOR);
    }

    #[test]
    fn single_evaluation_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.png");
        let history = CurveHistory { losses: vec![0.0], accuracies: vec![1.0] };
        render_curves(&history, &path).unwrap();
        assert!(path.exists());
    }
}
