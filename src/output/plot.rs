use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::{GanError, Result};
use crate::train::LossHistory;

pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const LIGHT_GRAY: Rgb<u8> = Rgb([200, 200, 200]);
    pub const BLUE: Rgb<u8> = Rgb([33, 150, 243]);
    pub const ORANGE: Rgb<u8> = Rgb([255, 152, 0]);
}

pub const PLOT_WIDTH: u32 = 800;
pub const PLOT_HEIGHT: u32 = 400;
const MARGIN: u32 = 20;

/// Writes one row per epoch with every loss and accuracy component.
pub fn write_loss_csv(history: &LossHistory, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in history.records() {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|e| GanError::io(path, e))?;
    Ok(())
}

/// Draws discriminator loss (blue) and generator loss (orange) against epoch.
///
/// Both curves share one y-axis scaled to the largest finite loss. Non-finite
/// points break the line instead of being drawn.
pub fn plot_losses(history: &LossHistory, width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, colors::WHITE);
    if width <= 2 * MARGIN || height <= 2 * MARGIN {
        return img;
    }

    let (x0, y0) = (MARGIN as i64, (height - MARGIN) as i64);
    let (x1, y1) = ((width - MARGIN) as i64, MARGIN as i64);
    draw_line(&mut img, (x0, y0), (x1, y0), colors::LIGHT_GRAY);
    draw_line(&mut img, (x0, y0), (x0, y1), colors::LIGHT_GRAY);

    let d = history.d_losses();
    let g = history.g_losses();
    let max = d.iter().chain(g.iter())
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if d.is_empty() || max <= 0.0 {
        return img;
    }

    let n = d.len();
    let to_point = |i: usize, v: f64| -> (i64, i64) {
        let fx = if n == 1 { 0.0 } else { i as f64 / (n - 1) as f64 };
        let x = x0 + (fx * (x1 - x0) as f64).round() as i64;
        let y = y0 - ((v / max) * (y0 - y1) as f64).round() as i64;
        (x, y)
    };

    for (series, color) in [(&d, colors::BLUE), (&g, colors::ORANGE)] {
        let mut prev: Option<(i64, i64)> = None;
        for (i, &v) in series.iter().enumerate() {
            if !v.is_finite() {
                prev = None;
                continue;
            }
            let p = to_point(i, v);
            match prev {
                Some(q) => draw_line(&mut img, q, p, color),
                None => put(&mut img, p, color),
            }
            prev = Some(p);
        }
    }
    img
}

pub fn save_loss_plot(history: &LossHistory, path: &Path) -> Result<()> {
    plot_losses(history, PLOT_WIDTH, PLOT_HEIGHT).save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

fn put(img: &mut RgbImage, (x, y): (i64, i64), color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

// Bresenham.
fn draw_line(img: &mut RgbImage, (mut x, mut y): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put(img, (x, y), color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::EpochRecord;

    fn record(epoch: usize, d: f64, g: f64) -> EpochRecord {
        EpochRecord {
            epoch, d_loss: d, d_acc: 0.5, g_loss: g,
            d_loss_real: d, d_loss_fake: d, d_acc_real: 0.5, d_acc_fake: 0.5,
        }
    }

    #[test]
    fn curves_are_drawn_in_their_colors() {
        let mut h = LossHistory::new();
        h.push(record(0, 1.0, 0.5));
        h.push(record(1, 0.5, 1.0));
        let img = plot_losses(&h, 100, 60);
        let pixels: Vec<_> = img.pixels().collect();
        assert!(pixels.iter().any(|p| **p == colors::BLUE));
        assert!(pixels.iter().any(|p| **p == colors::ORANGE));
        // d_loss starts at the top-left of the plot area.
        assert_eq!(*img.get_pixel(MARGIN, MARGIN), colors::BLUE);
    }

    #[test]
    fn empty_history_gives_a_blank_axis() {
        let img = plot_losses(&LossHistory::new(), 100, 60);
        assert!(img.pixels().all(|p| *p != colors::BLUE));
    }

    #[test]
    fn csv_has_a_header_and_one_row_per_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("losses.csv");
        let mut h = LossHistory::new();
        h.push(record(0, 0.7, 0.6));
        h.push(record(1, 0.6, f64::NAN));
        write_loss_csv(&h, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("epoch,d_loss,d_acc,g_loss"));
        assert!(lines[1].starts_with("0,0.7,"));
    }
}
