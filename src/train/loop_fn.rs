use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::data::{Dataset, Image};
use crate::error::{GanError, Result};
use crate::gan::{sample_latent, Discriminator, Generator};
use crate::optim::Optimizer;
use crate::output::Sampler;
use crate::train::epoch_stats::{EpochRecord, LossHistory};
use crate::train::train_config::GanConfig;
use crate::train::trainer::{discriminator_update, generator_update, FAKE_LABEL, REAL_LABEL};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An adversarial training run over one dataset.
///
/// The session owns the generator, the discriminator, their optimizers and
/// the random stream. Its lifecycle is `new` → `run` (any number of times;
/// epoch numbering carries on) → `finalize`, which consumes the session.
pub struct GanSession {
    config: GanConfig,
    dataset: Dataset,
    generator: Generator,
    discriminator: Discriminator,
    g_optimizer: Box<dyn Optimizer>,
    d_optimizer: Box<dyn Optimizer>,
    rng: StdRng,
    history: LossHistory,
    epoch: usize,
}

/// What a finished session hands back.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub generator: Generator,
    pub discriminator: Discriminator,
    pub history: LossHistory,
    pub epochs: usize,
}

impl GanSession {
    /// Validates `config`, then builds both networks from its architecture.
    ///
    /// All randomness (initial weights, batch selection and noise) comes from
    /// one generator seeded with `config.seed`.
    pub fn new(config: GanConfig, dataset: Dataset) -> Result<GanSession> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let g_spec = config.architecture.generator_spec(config.latent_dim, config.image)?;
        let d_spec = config.architecture.discriminator_spec(config.image)?;
        let generator = Generator::from_spec(&g_spec, config.latent_dim, config.image, &mut rng)?;
        let discriminator = Discriminator::from_spec(&d_spec, config.image, &mut rng)?;
        Self::assemble(config, dataset, generator, discriminator, rng)
    }

    /// Starts a session from existing networks, e.g. a custom architecture
    /// or a resumed run.
    pub fn with_networks(
        config: GanConfig,
        dataset: Dataset,
        generator: Generator,
        discriminator: Discriminator,
    ) -> Result<GanSession> {
        config.validate()?;
        if generator.latent_dim() != config.latent_dim {
            return Err(GanError::Config(format!(
                "generator takes {} latent values but latent_dim is {}",
                generator.latent_dim(), config.latent_dim
            )));
        }
        if generator.image_shape() != config.image || discriminator.image_shape() != config.image {
            return Err(GanError::Architecture(format!(
                "networks must both work on {} images", config.image
            )));
        }
        let rng = StdRng::seed_from_u64(config.seed);
        Self::assemble(config, dataset, generator, discriminator, rng)
    }

    fn assemble(
        config: GanConfig,
        dataset: Dataset,
        generator: Generator,
        discriminator: Discriminator,
        rng: StdRng,
    ) -> Result<GanSession> {
        if dataset.is_empty() {
            return Err(GanError::Dataset("cannot train on an empty dataset".into()));
        }
        if dataset.shape() != config.image {
            return Err(GanError::Config(format!(
                "dataset holds {} images but the config expects {}",
                dataset.shape(), config.image
            )));
        }

        info!(
            "Generator: {} parameters, discriminator: {} parameters",
            generator.network().parameter_count(),
            discriminator.network().parameter_count()
        );

        Ok(GanSession {
            g_optimizer: config.generator_optimizer.build(),
            d_optimizer: config.discriminator_optimizer.build(),
            config,
            dataset,
            generator,
            discriminator,
            rng,
            history: LossHistory::new(),
            epoch: 0,
        })
    }

    pub fn config(&self) -> &GanConfig {
        &self.config
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }

    pub fn history(&self) -> &LossHistory {
        &self.history
    }

    pub fn epochs_completed(&self) -> usize {
        self.epoch
    }

    // -----------------------------------------------------------------------
    // Training
    // -----------------------------------------------------------------------

    /// Runs one epoch: `d_steps` discriminator steps (a real batch, then a
    /// fake batch) followed by `g_steps` generator steps. The returned record
    /// is also appended to the history.
    pub fn step(&mut self) -> Result<EpochRecord> {
        let batch_size = self.config.batch_size;
        let latent_dim = self.config.latent_dim;

        let (mut loss_real, mut loss_fake, mut acc_real, mut acc_fake) = (0.0, 0.0, 0.0, 0.0);
        for _ in 0..self.config.d_steps {
            let real = self.dataset.sample_batch(&mut self.rng, batch_size);
            let latents: Vec<Vec<f64>> =
                (0..batch_size).map(|_| sample_latent(&mut self.rng, latent_dim)).collect();
            let fakes = self.generator.generate_batch(&latents)?;
            let fakes: Vec<&Image> = fakes.iter().collect();

            let r = discriminator_update(&mut self.discriminator, self.d_optimizer.as_mut(), &real, REAL_LABEL)?;
            let f = discriminator_update(&mut self.discriminator, self.d_optimizer.as_mut(), &fakes, FAKE_LABEL)?;
            loss_real += r.loss;
            loss_fake += f.loss;
            acc_real += r.accuracy;
            acc_fake += f.accuracy;
        }

        let mut g_loss = 0.0;
        for _ in 0..self.config.g_steps {
            let latents: Vec<Vec<f64>> =
                (0..batch_size).map(|_| sample_latent(&mut self.rng, latent_dim)).collect();
            g_loss += generator_update(
                &mut self.generator,
                self.g_optimizer.as_mut(),
                &self.discriminator,
                &latents,
            )?;
        }

        let d = self.config.d_steps as f64;
        let (loss_real, loss_fake) = (loss_real / d, loss_fake / d);
        let (acc_real, acc_fake) = (acc_real / d, acc_fake / d);
        let record = EpochRecord {
            epoch: self.epoch,
            d_loss: 0.5 * (loss_real + loss_fake),
            d_acc: 0.5 * (acc_real + acc_fake),
            g_loss: g_loss / self.config.g_steps as f64,
            d_loss_real: loss_real,
            d_loss_fake: loss_fake,
            d_acc_real: acc_real,
            d_acc_fake: acc_fake,
        };

        if !record.is_finite() {
            warn!(
                "epoch {}: non-finite loss (d_loss: {}, g_loss: {})",
                record.epoch, record.d_loss, record.g_loss
            );
        }

        self.history.push(record.clone());
        self.epoch += 1;
        Ok(record)
    }

    /// Trains for `epochs` further epochs.
    ///
    /// Losses are logged every `report_interval` epochs and a preview grid is
    /// rendered every `sample_interval` epochs, both counted from epoch 0.
    /// A failed render is logged and training continues.
    pub fn run(&mut self, epochs: usize, sampler: &mut dyn Sampler) -> Result<()> {
        let total = self.epoch + epochs;
        info!(
            "Training for {} epochs (batch size {}, latent dim {})",
            epochs, self.config.batch_size, self.config.latent_dim
        );

        for _ in 0..epochs {
            let record = self.step()?;
            let epoch = record.epoch;

            if epoch % self.config.report_interval == 0 {
                info!(
                    "epoch: {}/{}, d_loss: {:.2}, d_acc: {:.2}, g_loss: {:.2}",
                    epoch + 1, total, record.d_loss, record.d_acc, record.g_loss
                );
            } else {
                debug!("epoch {}: d_loss {:.4}, g_loss {:.4}", epoch, record.d_loss, record.g_loss);
            }

            if epoch % self.config.sample_interval == 0 {
                if let Err(e) = sampler.render(&self.generator, epoch) {
                    warn!("epoch {}: failed to render samples: {}", epoch, e);
                }
            }
        }
        Ok(())
    }

    /// Persists both networks and the loss plot, then ends the session.
    pub fn finalize(self, sampler: &mut dyn Sampler) -> Result<TrainingSummary> {
        sampler.persist(&self.generator, &self.discriminator, self.epoch)?;
        sampler.plot(&self.history)?;

        if let Some(last) = self.history.last() {
            info!(
                "Finished after {} epochs: d_loss {:.4}, d_acc {:.2}, g_loss {:.4}",
                self.epoch, last.d_loss, last.d_acc, last.g_loss
            );
        } else {
            info!("Finished without training");
        }

        Ok(TrainingSummary {
            generator: self.generator,
            discriminator: self.discriminator,
            history: self.history,
            epochs: self.epoch,
        })
    }
}
