use serde::{Serialize, Deserialize};
use std::fmt;

/// Shape of one image-like activation, stored channel-major:
/// index `(c, y, x)` lives at `c * height * width + y * width + x`.
///
/// For single-channel images this is plain row-major `height × width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageShape {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl ImageShape {
    pub const fn new(channels: usize, height: usize, width: usize) -> ImageShape {
        ImageShape { channels, height, width }
    }

    /// 28×28 grayscale, the MNIST digit shape.
    pub const fn mnist() -> ImageShape {
        ImageShape::new(1, 28, 28)
    }

    /// Number of values in one image of this shape.
    pub const fn len(&self) -> usize {
        self.channels * self.height * self.width
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn plane(&self) -> usize {
        self.height * self.width
    }

    #[inline]
    pub fn index(&self, c: usize, y: usize, x: usize) -> usize {
        (c * self.height + y) * self.width + x
    }
}

impl fmt::Display for ImageShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}
