use std::path::Path;

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use crate::data::Image;
use crate::error::{GanError, Result};

/// Converts a unit-range value to an 8-bit pixel.
fn to_byte(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Tiles `rows × cols` images into one picture, row-major, with no spacing.
///
/// Pixels are mapped from [-1, 1] back to [0, 255]. Single-channel images
/// give a grayscale grid; three-channel images give an RGB grid.
pub fn render_grid(images: &[Image], rows: usize, cols: usize) -> Result<DynamicImage> {
    if images.len() != rows * cols {
        return Err(GanError::Config(format!(
            "a {}x{} grid needs {} images, got {}",
            rows, cols, rows * cols, images.len()
        )));
    }
    let Some(first) = images.first() else {
        return Err(GanError::Config("grid must hold at least one image".into()));
    };
    let shape = first.shape();
    if images.iter().any(|img| img.shape() != shape) {
        return Err(GanError::Config("grid images must all share one shape".into()));
    }

    let (h, w) = (shape.height, shape.width);
    let (grid_w, grid_h) = ((cols * w) as u32, (rows * h) as u32);

    match shape.channels {
        1 => {
            let mut canvas = GrayImage::new(grid_w, grid_h);
            for (n, img) in images.iter().enumerate() {
                let (r, c) = (n / cols, n % cols);
                let unit = img.to_unit_range();
                for y in 0..h {
                    for x in 0..w {
                        let v = to_byte(unit[shape.index(0, y, x)]);
                        canvas.put_pixel((c * w + x) as u32, (r * h + y) as u32, Luma([v]));
                    }
                }
            }
            Ok(DynamicImage::ImageLuma8(canvas))
        }
        3 => {
            let mut canvas = RgbImage::new(grid_w, grid_h);
            for (n, img) in images.iter().enumerate() {
                let (r, c) = (n / cols, n % cols);
                let unit = img.to_unit_range();
                for y in 0..h {
                    for x in 0..w {
                        let px = [0, 1, 2].map(|ch| to_byte(unit[shape.index(ch, y, x)]));
                        canvas.put_pixel((c * w + x) as u32, (r * h + y) as u32, Rgb(px));
                    }
                }
            }
            Ok(DynamicImage::ImageRgb8(canvas))
        }
        other => Err(GanError::Config(format!(
            "cannot render {}-channel images; expected 1 or 3", other
        ))),
    }
}

/// Renders a grid and writes it as PNG.
pub fn save_grid(images: &[Image], rows: usize, cols: usize, path: &Path) -> Result<()> {
    let grid = render_grid(images, rows, cols)?;
    grid.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ImageShape;

    fn flat(shape: ImageShape, v: f64) -> Image {
        Image::new(shape, vec![v; shape.len()]).unwrap()
    }

    #[test]
    fn tiles_are_placed_row_major() {
        let shape = ImageShape::new(1, 2, 3);
        let images = vec![flat(shape, -1.0), flat(shape, 1.0), flat(shape, 0.0), flat(shape, -1.0)];
        let grid = render_grid(&images, 2, 2).unwrap().to_luma8();
        assert_eq!(grid.dimensions(), (6, 4));
        assert_eq!(grid.get_pixel(0, 0)[0], 0);
        assert_eq!(grid.get_pixel(3, 0)[0], 255);
        assert_eq!(grid.get_pixel(0, 2)[0], 128);
        assert_eq!(grid.get_pixel(5, 3)[0], 0);
    }

    #[test]
    fn unit_range_maps_onto_the_byte_range() {
        assert_eq!(to_byte(0.0), 0);
        assert_eq!(to_byte(0.5), 128);
        assert_eq!(to_byte(1.0), 255);
        assert_eq!(to_byte(1.2), 255);
    }

    #[test]
    fn wrong_count_is_rejected() {
        let shape = ImageShape::new(1, 2, 2);
        assert!(render_grid(&[flat(shape, 0.0)], 2, 2).is_err());
    }

    #[test]
    fn rgb_images_keep_their_channels() {
        let shape = ImageShape::new(3, 1, 1);
        let img = Image::new(shape, vec![1.0, -1.0, 1.0]).unwrap();
        let grid = render_grid(&[img], 1, 1).unwrap().to_rgb8();
        assert_eq!(grid.get_pixel(0, 0).0, [255, 0, 255]);
    }
}
