//! Default DCGAN layer stacks for both players.

use serde::{Deserialize, Serialize};

use crate::activation::ActivationFunction;
use crate::error::{GanError, Result};
use crate::math::ImageShape;
use crate::network::{LayerSpec, ModelMetadata, ModelRole, NetworkSpec};

/// Channel widths and slope of the DCGAN stacks.
///
/// Generator: Dense(latent → g0·(H/4)·(W/4)) → ConvT(g0 → g0, k4 s2) →
/// ConvT(g0 → g1, k4 s2) → ConvT(g1 → C, k7 s1, tanh).
///
/// Discriminator: Conv(C → d0, k4 s2) → Conv(d0 → d1, k4 s2) →
/// Dense(d1·(H/4)·(W/4) → 1, sigmoid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    pub generator_channels: [usize; 2],
    pub discriminator_channels: [usize; 2],
    pub leaky_alpha: f64,
}

impl Default for ArchitectureConfig {
    fn default() -> Self {
        ArchitectureConfig {
            generator_channels: [128, 64],
            discriminator_channels: [64, 128],
            leaky_alpha: 0.2,
        }
    }
}

impl ArchitectureConfig {
    pub fn validate(&self, image: ImageShape) -> Result<()> {
        if image.is_empty() || image.height % 4 != 0 || image.width % 4 != 0 {
            return Err(GanError::Config(format!(
                "image {} must be non-empty with height and width divisible by 4", image
            )));
        }
        if self.generator_channels.contains(&0) || self.discriminator_channels.contains(&0) {
            return Err(GanError::Config("channel widths must be non-zero".into()));
        }
        if !(self.leaky_alpha.is_finite() && self.leaky_alpha >= 0.0) {
            return Err(GanError::Config(format!("leaky_alpha {} is not a valid slope", self.leaky_alpha)));
        }
        Ok(())
    }

    fn leaky(&self) -> ActivationFunction {
        ActivationFunction::LeakyReLU { alpha: self.leaky_alpha }
    }

    pub fn generator_spec(&self, latent_dim: usize, image: ImageShape) -> Result<NetworkSpec> {
        self.validate(image)?;
        if latent_dim == 0 {
            return Err(GanError::Config("latent_dim must be at least 1".into()));
        }
        let [g0, g1] = self.generator_channels;
        let (h4, w4) = (image.height / 4, image.width / 4);
        let seed = ImageShape::new(g0, h4, w4);

        Ok(NetworkSpec {
            name: "generator".into(),
            layers: vec![
                LayerSpec::Dense { size: seed.len(), input_size: latent_dim, activation: self.leaky() },
                LayerSpec::ConvTranspose2d {
                    input: seed,
                    out_channels: g0, kernel: 4, stride: 2, padding: 1,
                    activation: self.leaky(),
                },
                LayerSpec::ConvTranspose2d {
                    input: ImageShape::new(g0, h4 * 2, w4 * 2),
                    out_channels: g1, kernel: 4, stride: 2, padding: 1,
                    activation: self.leaky(),
                },
                LayerSpec::ConvTranspose2d {
                    input: ImageShape::new(g1, image.height, image.width),
                    out_channels: image.channels, kernel: 7, stride: 1, padding: 3,
                    activation: ActivationFunction::Tanh,
                },
            ],
            metadata: Some(ModelMetadata {
                description: Some("DCGAN generator".into()),
                role: Some(ModelRole::Generator),
                latent_dim: Some(latent_dim),
                image: Some(image),
                epochs_trained: None,
            }),
        })
    }

    pub fn discriminator_spec(&self, image: ImageShape) -> Result<NetworkSpec> {
        self.validate(image)?;
        let [d0, d1] = self.discriminator_channels;

        Ok(NetworkSpec {
            name: "discriminator".into(),
            layers: vec![
                LayerSpec::Conv2d {
                    input: image,
                    out_channels: d0, kernel: 4, stride: 2, padding: 1,
                    activation: self.leaky(),
                },
                LayerSpec::Conv2d {
                    input: ImageShape::new(d0, image.height / 2, image.width / 2),
                    out_channels: d1, kernel: 4, stride: 2, padding: 1,
                    activation: self.leaky(),
                },
                LayerSpec::Dense {
                    size: 1,
                    input_size: d1 * (image.height / 4) * (image.width / 4),
                    activation: ActivationFunction::Sigmoid,
                },
            ],
            metadata: Some(ModelMetadata {
                description: Some("DCGAN discriminator".into()),
                role: Some(ModelRole::Discriminator),
                latent_dim: None,
                image: Some(image),
                epochs_trained: None,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnist_stacks_chain() {
        let arch = ArchitectureConfig::default();
        let g = arch.generator_spec(100, ImageShape::mnist()).unwrap();
        g.validate().unwrap();
        assert_eq!(g.input_len(), 100);
        assert_eq!(g.output_len().unwrap(), 784);

        let d = arch.discriminator_spec(ImageShape::mnist()).unwrap();
        d.validate().unwrap();
        assert_eq!(d.input_len(), 784);
        assert_eq!(d.output_len().unwrap(), 1);
    }

    #[test]
    fn smallest_image_still_chains() {
        let arch = ArchitectureConfig { generator_channels: [2, 2], discriminator_channels: [2, 2], leaky_alpha: 0.2 };
        let image = ImageShape::new(1, 4, 4);
        assert_eq!(arch.generator_spec(1, image).unwrap().output_len().unwrap(), 16);
        assert_eq!(arch.discriminator_spec(image).unwrap().output_len().unwrap(), 1);
    }

    #[test]
    fn rejects_sizes_not_divisible_by_four() {
        let arch = ArchitectureConfig::default();
        assert!(matches!(
            arch.discriminator_spec(ImageShape::new(1, 30, 30)),
            Err(GanError::Config(_))
        ));
    }
}
