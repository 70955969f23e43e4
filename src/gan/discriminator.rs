use rand::Rng;

use crate::data::Image;
use crate::error::{GanError, Result};
use crate::math::ImageShape;
use crate::network::{Network, NetworkSpec};

/// Scores an image with the probability that it came from the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    network: Network,
    image: ImageShape,
}

impl Discriminator {
    /// Wraps a network that reads one `image` and emits a single score.
    pub fn new(network: Network, image: ImageShape) -> Result<Discriminator> {
        network.validate()?;
        if network.input_len() != image.len() {
            return Err(GanError::Architecture(format!(
                "discriminator network takes {} inputs but image {} has {}",
                network.input_len(), image, image.len()
            )));
        }
        if network.output_len() != 1 {
            return Err(GanError::Architecture(format!(
                "discriminator network must produce one score, got {}",
                network.output_len()
            )));
        }
        Ok(Discriminator { network, image })
    }

    pub fn from_spec<R: Rng + ?Sized>(
        spec: &NetworkSpec,
        image: ImageShape,
        rng: &mut R,
    ) -> Result<Discriminator> {
        Discriminator::new(spec.build(rng)?, image)
    }

    pub fn image_shape(&self) -> ImageShape {
        self.image
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub(crate) fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn discriminate(&self, image: &Image) -> Result<f64> {
        if image.shape() != self.image {
            return Err(GanError::Shape { expected: self.image.len(), actual: image.pixels().len() });
        }
        Ok(self.network.forward(image.pixels())?[0])
    }
}
