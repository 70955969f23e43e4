use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GanError, Result};
use crate::gan::ArchitectureConfig;
use crate::json;
use crate::math::ImageShape;
use crate::optim::OptimizerConfig;

/// Size of the preview grid rendered at each sampling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig { rows: 5, cols: 5 }
    }
}

/// Where the dataset is read from and where outputs are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the MNIST IDX files.
    pub data_dir: PathBuf,
    /// Grid PNGs, one per sampling interval, named `{epoch}.png`.
    pub samples_dir: PathBuf,
    /// Final generator, discriminator and combined model JSON files.
    pub model_dir: PathBuf,
    /// Loss record CSV and loss plot PNG.
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            data_dir: PathBuf::from("data/mnist"),
            samples_dir: PathBuf::from("output/samples"),
            model_dir: PathBuf::from("output/model"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl PathsConfig {
    /// Re-roots every output directory under `root`, keeping `data_dir`.
    pub fn with_output_root(&self, root: impl AsRef<Path>) -> PathsConfig {
        let root = root.as_ref();
        PathsConfig {
            data_dir: self.data_dir.clone(),
            samples_dir: root.join("samples"),
            model_dir: root.join("model"),
            output_dir: root.to_path_buf(),
        }
    }
}

/// Configuration for a `GanSession` run.
///
/// # Fields
/// - `latent_dim`       — length of the generator's noise input
/// - `batch_size`       — real images (and fakes) per update
/// - `epochs`           — training loop iterations; one epoch is one
///                        discriminator step plus one generator step, not a
///                        pass over the dataset
/// - `sample_interval`  — render a preview grid every N epochs, from epoch 0
/// - `report_interval`  — log losses every N epochs, from epoch 0
/// - `d_steps`/`g_steps` — discriminator and generator steps per epoch
/// - `seed`             — drives initialisation, batch selection and noise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanConfig {
    pub latent_dim: usize,
    pub batch_size: usize,
    pub epochs: usize,
    pub sample_interval: usize,
    pub report_interval: usize,
    pub d_steps: usize,
    pub g_steps: usize,
    pub discriminator_optimizer: OptimizerConfig,
    pub generator_optimizer: OptimizerConfig,
    pub seed: u64,
    pub image: ImageShape,
    pub architecture: ArchitectureConfig,
    pub grid: GridConfig,
    pub paths: PathsConfig,
}

impl Default for GanConfig {
    fn default() -> Self {
        GanConfig {
            latent_dim: 100,
            batch_size: 2,
            epochs: 300_000,
            sample_interval: 3000,
            report_interval: 100,
            d_steps: 1,
            g_steps: 1,
            discriminator_optimizer: OptimizerConfig::adam(0.002, 0.5),
            generator_optimizer: OptimizerConfig::adam(0.0002, 0.5),
            seed: 42,
            image: ImageShape::mnist(),
            architecture: ArchitectureConfig::default(),
            grid: GridConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl GanConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("latent_dim", self.latent_dim),
            ("batch_size", self.batch_size),
            ("sample_interval", self.sample_interval),
            ("report_interval", self.report_interval),
            ("d_steps", self.d_steps),
            ("g_steps", self.g_steps),
            ("grid.rows", self.grid.rows),
            ("grid.cols", self.grid.cols),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(GanError::Config(format!("{} must be at least 1", name)));
        }
        for (name, opt) in [
            ("discriminator_optimizer", &self.discriminator_optimizer),
            ("generator_optimizer", &self.generator_optimizer),
        ] {
            let lr = opt.learning_rate();
            if !(lr.is_finite() && lr > 0.0) {
                return Err(GanError::Config(format!("{} learning rate {} must be positive", name, lr)));
            }
            if let OptimizerConfig::Adam { beta1, beta2, epsilon, .. } = *opt {
                if !(0.0..1.0).contains(&beta1) || !(0.0..1.0).contains(&beta2) || epsilon <= 0.0 {
                    return Err(GanError::Config(format!(
                        "{}: betas must lie in [0, 1) and epsilon must be positive", name
                    )));
                }
            }
        }
        self.architecture.validate(self.image)
    }

    /// Reads a config from JSON; absent fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<GanConfig> {
        let config: GanConfig = json::load_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        json::save_json(self, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_reference_run() {
        let c = GanConfig::default();
        assert_eq!((c.latent_dim, c.batch_size, c.epochs), (100, 2, 300_000));
        assert_eq!((c.sample_interval, c.report_interval), (3000, 100));
        assert_eq!(c.discriminator_optimizer, OptimizerConfig::adam(0.002, 0.5));
        assert_eq!(c.generator_optimizer, OptimizerConfig::adam(0.0002, 0.5));
        c.validate().unwrap();
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let c = GanConfig { sample_interval: 0, ..GanConfig::default() };
        assert!(matches!(c.validate(), Err(GanError::Config(_))));
    }

    #[test]
    fn json_round_trip_and_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gan.json");
        let config = GanConfig { epochs: 10, seed: 7, ..GanConfig::default() };
        config.save_json(&path).unwrap();
        assert_eq!(GanConfig::load_json(&path).unwrap(), config);

        std::fs::write(&path, r#"{ "batch_size": 8 }"#).unwrap();
        let partial = GanConfig::load_json(&path).unwrap();
        assert_eq!(partial.batch_size, 8);
        assert_eq!(partial.latent_dim, 100);
    }

    #[test]
    fn output_root_moves_every_output_directory() {
        let paths = PathsConfig::default().with_output_root("/tmp/run1");
        assert_eq!(paths.samples_dir, PathBuf::from("/tmp/run1/samples"));
        assert_eq!(paths.data_dir, PathBuf::from("data/mnist"));
    }
}
