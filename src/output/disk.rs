use std::fs;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::error::{GanError, Result};
use crate::gan::{Discriminator, Generator};
use crate::output::checkpoint::{CombinedModel, SavedModel};
use crate::output::{grid, plot, Sampler};
use crate::train::{GridConfig, LossHistory, PathsConfig};

pub const GENERATOR_FILE: &str = "generator.json";
pub const DISCRIMINATOR_FILE: &str = "discriminator.json";
pub const COMBINED_FILE: &str = "gan.json";
pub const LOSS_CSV_FILE: &str = "losses.csv";
pub const LOSS_PLOT_FILE: &str = "losses.png";

/// Writes preview grids, final models and loss plots under the configured
/// directories.
///
/// Latents for preview grids come from the sampler's own random stream, so
/// rendering never perturbs the training sequence.
pub struct DiskSampler {
    paths: PathsConfig,
    grid: GridConfig,
    rng: StdRng,
}

impl DiskSampler {
    /// Creates every output directory up front so that a bad path fails
    /// before training starts.
    pub fn new(paths: PathsConfig, grid: GridConfig, seed: u64) -> Result<DiskSampler> {
        for dir in [&paths.samples_dir, &paths.model_dir, &paths.output_dir] {
            fs::create_dir_all(dir).map_err(|e| GanError::io(dir, e))?;
        }
        Ok(DiskSampler { paths, grid, rng: StdRng::seed_from_u64(seed) })
    }

    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }

    pub fn sample_path(&self, epoch: usize) -> PathBuf {
        self.paths.samples_dir.join(format!("{}.png", epoch))
    }

    fn model_path(&self, file: &str) -> PathBuf {
        self.paths.model_dir.join(file)
    }

    fn output_path(&self, file: &str) -> PathBuf {
        self.paths.output_dir.join(file)
    }
}

impl Sampler for DiskSampler {
    fn render(&mut self, generator: &Generator, epoch: usize) -> Result<()> {
        let count = self.grid.rows * self.grid.cols;
        let images = generator.generate_random(count, &mut self.rng)?;
        let path = self.sample_path(epoch);
        grid::save_grid(&images, self.grid.rows, self.grid.cols, &path)?;
        info!("Saved samples to {}", path.display());
        Ok(())
    }

    fn persist(&mut self, generator: &Generator, discriminator: &Discriminator, epochs_trained: usize) -> Result<()> {
        SavedModel::from_generator(generator, epochs_trained).save_json(self.model_path(GENERATOR_FILE))?;
        SavedModel::from_discriminator(discriminator, epochs_trained)
            .save_json(self.model_path(DISCRIMINATOR_FILE))?;
        CombinedModel::new(generator, discriminator, epochs_trained).save_json(self.model_path(COMBINED_FILE))?;
        info!("Saved models to {}", self.paths.model_dir.display());
        Ok(())
    }

    fn plot(&mut self, history: &LossHistory) -> Result<()> {
        plot::write_loss_csv(history, &self.output_path(LOSS_CSV_FILE))?;
        plot::save_loss_plot(history, &self.output_path(LOSS_PLOT_FILE))?;
        info!("Saved loss record to {}", self.paths.output_dir.display());
        Ok(())
    }
}
