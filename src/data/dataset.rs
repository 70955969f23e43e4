use std::path::Path;

use rand::Rng;
use tracing::info;

use crate::data::idx;
use crate::data::image::Image;
use crate::error::{GanError, Result};
use crate::math::ImageShape;

/// MNIST training split file names, in the two spellings found in the wild.
const TRAIN_IMAGES: [&str; 2] = ["train-images-idx3-ubyte", "train-images.idx3-ubyte"];
const TRAIN_LABELS: [&str; 2] = ["train-labels-idx1-ubyte", "train-labels.idx1-ubyte"];

/// In-memory pool of real images the discriminator learns from.
///
/// Labels are kept when the source has them but nothing in GAN training
/// reads them.
#[derive(Debug, Clone)]
pub struct Dataset {
    shape: ImageShape,
    images: Vec<Image>,
    labels: Vec<u8>,
}

impl Dataset {
    /// Wraps a non-empty set of same-shape images.
    pub fn from_images(images: Vec<Image>) -> Result<Dataset> {
        let shape = images.first()
            .map(Image::shape)
            .ok_or_else(|| GanError::Dataset("dataset has no images".into()))?;
        if let Some((i, img)) = images.iter().enumerate().find(|(_, img)| img.shape() != shape) {
            return Err(GanError::Dataset(format!(
                "image {} has shape {} but the dataset shape is {}",
                i, img.shape(), shape
            )));
        }
        Ok(Dataset { shape, images, labels: Vec::new() })
    }

    pub fn with_labels(mut self, labels: Vec<u8>) -> Result<Dataset> {
        if labels.len() != self.images.len() {
            return Err(GanError::Dataset(format!(
                "image file declares {} items but label file declares {}",
                self.images.len(), labels.len()
            )));
        }
        self.labels = labels;
        Ok(self)
    }

    /// Loads the MNIST training split from IDX files in `dir`.
    ///
    /// The label file is optional.
    pub fn load_mnist(dir: impl AsRef<Path>) -> Result<Dataset> {
        let dir = dir.as_ref();
        let image_path = find_file(dir, &TRAIN_IMAGES).ok_or_else(|| {
            GanError::Dataset(format!("no {} file found in {}", TRAIN_IMAGES[0], dir.display()))
        })?;
        let bytes = std::fs::read(&image_path).map_err(|e| GanError::io(&image_path, e))?;
        let mut dataset = Dataset::from_images(idx::parse_images(&bytes)?)?;

        if let Some(label_path) = find_file(dir, &TRAIN_LABELS) {
            let bytes = std::fs::read(&label_path).map_err(|e| GanError::io(&label_path, e))?;
            dataset = dataset.with_labels(idx::parse_labels(&bytes)?)?;
        }

        info!(
            "Loaded {} images of shape {} from {}",
            dataset.len(), dataset.shape(), dir.display()
        );
        Ok(dataset)
    }

    pub fn shape(&self) -> ImageShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Draws `batch_size` images uniformly at random, with replacement.
    pub fn sample_batch<R: Rng + ?Sized>(&self, rng: &mut R, batch_size: usize) -> Vec<&Image> {
        (0..batch_size)
            .map(|_| &self.images[rng.gen_range(0..self.images.len())])
            .collect()
    }
}

fn find_file(dir: &Path, names: &[&str]) -> Option<std::path::PathBuf> {
    names.iter().map(|name| dir.join(name)).find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::idx::tests::{idx1, idx3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn loads_mnist_layout_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TRAIN_IMAGES[0]), idx3(2, 2, &[vec![0; 4], vec![255; 4]])).unwrap();
        std::fs::write(dir.path().join(TRAIN_LABELS[0]), idx1(&[4, 9])).unwrap();

        let ds = Dataset::load_mnist(dir.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.shape(), ImageShape::new(1, 2, 2));
        assert_eq!(ds.labels(), &[4, 9]);
    }

    #[test]
    fn missing_files_are_a_dataset_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Dataset::load_mnist(dir.path()), Err(GanError::Dataset(_))));
    }

    #[test]
    fn label_count_must_match() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TRAIN_IMAGES[1]), idx3(1, 1, &[vec![0], vec![1]])).unwrap();
        std::fs::write(dir.path().join(TRAIN_LABELS[1]), idx1(&[4])).unwrap();
        assert!(Dataset::load_mnist(dir.path()).is_err());
    }

    #[test]
    fn batches_sample_with_replacement() {
        let shape = ImageShape::new(1, 1, 1);
        let ds = Dataset::from_images(vec![Image::new(shape, vec![0.25]).unwrap()]).unwrap();
        let batch = ds.sample_batch(&mut StdRng::seed_from_u64(0), 5);
        assert_eq!(batch.len(), 5);
        assert!(batch.iter().all(|img| img.pixels() == [0.25]));
    }

    #[test]
    fn mixed_shapes_are_rejected() {
        let a = Image::new(ImageShape::new(1, 1, 1), vec![0.0]).unwrap();
        let b = Image::new(ImageShape::new(1, 1, 2), vec![0.0, 0.0]).unwrap();
        assert!(Dataset::from_images(vec![a, b]).is_err());
    }
}
