pub mod dataset;
pub mod idx;
pub mod image;

pub use dataset::Dataset;
pub use image::Image;
