use rand::Rng;

use crate::data::Image;
use crate::error::{GanError, Result};
use crate::math::ImageShape;
use crate::network::{Network, NetworkSpec};
use super::sample_latent;

/// Maps a latent vector to an image.
///
/// `generate` is a pure function of the latent vector and the current
/// parameters; all randomness lives with the caller that draws the latents.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    network: Network,
    latent_dim: usize,
    image: ImageShape,
}

impl Generator {
    /// Wraps a network whose input is `latent_dim` long and whose output is
    /// one `image`.
    pub fn new(network: Network, latent_dim: usize, image: ImageShape) -> Result<Generator> {
        network.validate()?;
        if network.input_len() != latent_dim {
            return Err(GanError::Architecture(format!(
                "generator network takes {} inputs but latent_dim is {}",
                network.input_len(), latent_dim
            )));
        }
        if network.output_len() != image.len() {
            return Err(GanError::Architecture(format!(
                "generator network produces {} values but image {} needs {}",
                network.output_len(), image, image.len()
            )));
        }
        Ok(Generator { network, latent_dim, image })
    }

    pub fn from_spec<R: Rng + ?Sized>(
        spec: &NetworkSpec,
        latent_dim: usize,
        image: ImageShape,
        rng: &mut R,
    ) -> Result<Generator> {
        Generator::new(spec.build(rng)?, latent_dim, image)
    }

    pub fn latent_dim(&self) -> usize {
        self.latent_dim
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

    pub fn generate(&self, latent: &[f64]) -> Result<Image> {
        if latent.len() != self.latent_dim {
            return Err(GanError::Shape { expected: self.latent_dim, actual: latent.len() });
        }
        Image::new(self.image, self.network.forward(latent)?)
    }

    pub fn generate_batch(&self, latents: &[Vec<f64>]) -> Result<Vec<Image>> {
        latents.iter().map(|z| self.generate(z)).collect()
    }

    /// Draws `count` latent vectors from `rng` and generates one image each.
    pub fn generate_random<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Vec<Image>> {
        (0..count)
            .map(|_| self.generate(&sample_latent(rng, self.latent_dim)))
            .collect()
    }
}
