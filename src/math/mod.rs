pub mod matrix;
pub mod shape;

pub use matrix::{Matrix, sample_standard_normal};
pub use shape::ImageShape;
