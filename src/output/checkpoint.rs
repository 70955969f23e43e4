use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GanError, Result};
use crate::gan::{Discriminator, Generator};
use crate::json;
use crate::network::{ModelMetadata, ModelRole, Network};

/// A network together with the metadata needed to use it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedModel {
    pub metadata: ModelMetadata,
    pub network: Network,
}

/// Both halves of the adversarial pair in one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedModel {
    pub generator: SavedModel,
    pub discriminator: SavedModel,
}

impl SavedModel {
    pub fn from_generator(generator: &Generator, epochs_trained: usize) -> SavedModel {
        SavedModel {
            metadata: ModelMetadata {
                description: Some("DCGAN generator".into()),
                role: Some(ModelRole::Generator),
                latent_dim: Some(generator.latent_dim()),
                image: Some(generator.image_shape()),
                epochs_trained: Some(epochs_trained),
            },
            network: generator.network().clone(),
        }
    }

    pub fn from_discriminator(discriminator: &Discriminator, epochs_trained: usize) -> SavedModel {
        SavedModel {
            metadata: ModelMetadata {
                description: Some("DCGAN discriminator".into()),
                role: Some(ModelRole::Discriminator),
                latent_dim: None,
                image: Some(discriminator.image_shape()),
                epochs_trained: Some(epochs_trained),
            },
            network: discriminator.network().clone(),
        }
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        json::save_json(self, path.as_ref())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<SavedModel> {
        json::load_json(path.as_ref())
    }

    /// Rebuilds a generator, checking the saved role and shapes.
    pub fn into_generator(self) -> Result<Generator> {
        let meta = self.metadata;
        if meta.role != Some(ModelRole::Generator) {
            return Err(GanError::Architecture(format!(
                "saved model has role {:?}, not generator", meta.role
            )));
        }
        let (Some(latent_dim), Some(image)) = (meta.latent_dim, meta.image) else {
            return Err(GanError::Architecture(
                "saved generator is missing its latent size or image shape".into(),
            ));
        };
        Generator::new(self.network, latent_dim, image)
    }

    pub fn into_discriminator(self) -> Result<Discriminator> {
        let meta = self.metadata;
        if meta.role != Some(ModelRole::Discriminator) {
            return Err(GanError::Architecture(format!(
                "saved model has role {:?}, not discriminator", meta.role
            )));
        }
        let Some(image) = meta.image else {
            return Err(GanError::Architecture("saved discriminator is missing its image shape".into()));
        };
        Discriminator::new(self.network, image)
    }
}

impl CombinedModel {
    pub fn new(generator: &Generator, discriminator: &Discriminator, epochs_trained: usize) -> CombinedModel {
        CombinedModel {
            generator: SavedModel::from_generator(generator, epochs_trained),
            discriminator: SavedModel::from_discriminator(discriminator, epochs_trained),
        }
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        json::save_json(self, path.as_ref())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<CombinedModel> {
        json::load_json(path.as_ref())
    }
}

/// Loads a generator from either a standalone generator file or a combined
/// model file.
pub fn load_generator(path: impl AsRef<Path>) -> Result<Generator> {
    let path = path.as_ref();
    let value: serde_json::Value = json::load_json(path)?;
    let saved: SavedModel = if value.get("generator").is_some() {
        serde_json::from_value::<CombinedModel>(value)?.generator
    } else {
        serde_json::from_value(value)?
    };
    saved.into_generator()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gan::ArchitectureConfig;
    use crate::math::ImageShape;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pair() -> (Generator, Discriminator) {
        let arch = ArchitectureConfig { generator_channels: [2, 2], discriminator_channels: [2, 2], leaky_alpha: 0.2 };
        let image = ImageShape::new(1, 4, 4);
        let mut rng = StdRng::seed_from_u64(5);
        let g = Generator::from_spec(&arch.generator_spec(3, image).unwrap(), 3, image, &mut rng).unwrap();
        let d = Discriminator::from_spec(&arch.discriminator_spec(image).unwrap(), image, &mut rng).unwrap();
        (g, d)
    }

    #[test]
    fn generator_survives_both_file_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let (g, d) = pair();

        let single = dir.path().join("generator.json");
        SavedModel::from_generator(&g, 12).save_json(&single).unwrap();
        assert_eq!(load_generator(&single).unwrap(), g);

        let combined = dir.path().join("gan.json");
        CombinedModel::new(&g, &d, 12).save_json(&combined).unwrap();
        assert_eq!(load_generator(&combined).unwrap(), g);

        let loaded = CombinedModel::load_json(&combined).unwrap();
        assert_eq!(loaded.discriminator.metadata.epochs_trained, Some(12));
        assert_eq!(loaded.discriminator.into_discriminator().unwrap(), d);
    }

    #[test]
    fn damaged_weights_fail_to_load_instead_of_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.json");
        let (g, _) = pair();
        let mut saved = SavedModel::from_generator(&g, 1);
        saved.network.layers[1].parameters_mut().0.data.truncate(1);
        saved.save_json(&path).unwrap();

        assert!(matches!(load_generator(&path), Err(GanError::Architecture(_))));
    }

    #[test]
    fn discriminator_file_is_not_a_generator() {
        let (_, d) = pair();
        let saved = SavedModel::from_discriminator(&d, 0);
        assert!(matches!(saved.into_generator(), Err(GanError::Architecture(_))));
    }
}
