use crate::error::{GanError, Result};
use crate::math::ImageShape;

/// One image with values in the generator's output range `[-1, 1]`.
///
/// Immutable once built: the trainer only ever reads samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    shape: ImageShape,
    pixels: Vec<f64>,
}

impl Image {
    pub fn new(shape: ImageShape, pixels: Vec<f64>) -> Result<Image> {
        if pixels.len() != shape.len() {
            return Err(GanError::Shape { expected: shape.len(), actual: pixels.len() });
        }
        Ok(Image { shape, pixels })
    }

    pub fn shape(&self) -> ImageShape {
        self.shape
    }

    pub fn pixels(&self) -> &[f64] {
        &self.pixels
    }

    /// Maps `[-1, 1]` back to `[0, 1]` for display, clamping stragglers.
    pub fn to_unit_range(&self) -> Vec<f64> {
        self.pixels.iter().map(|&x| (0.5 * x + 0.5).clamp(0.0, 1.0)).collect()
    }
}

/// Rescales a raw 8-bit pixel to `[-1, 1]`.
#[inline]
pub fn normalize_pixel(px: u8) -> f64 {
    px as f64 / 255.0 * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_range_is_symmetric() {
        assert_eq!(normalize_pixel(0), -1.0);
        assert_eq!(normalize_pixel(255), 1.0);
    }

    #[test]
    fn wrong_pixel_count_is_rejected() {
        assert!(Image::new(ImageShape::new(1, 2, 2), vec![0.0; 3]).is_err());
    }

    #[test]
    fn unit_range_inverts_normalization() {
        let img = Image::new(ImageShape::new(1, 1, 3), vec![-1.0, 0.0, 1.0]).unwrap();
        assert_eq!(img.to_unit_range(), vec![0.0, 0.5, 1.0]);
    }
}
