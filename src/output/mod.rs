pub mod checkpoint;
pub mod disk;
pub mod grid;
pub mod plot;

use crate::error::Result;
use crate::gan::{Discriminator, Generator};
use crate::train::LossHistory;

pub use checkpoint::{load_generator, CombinedModel, SavedModel};
pub use disk::DiskSampler;

/// Receives the side outputs of a training run.
///
/// `render` is called every sampling interval with the current generator;
/// `persist` and `plot` are called once when the session is finalized.
pub trait Sampler {
    fn render(&mut self, generator: &Generator, epoch: usize) -> Result<()>;

    fn persist(&mut self, generator: &Generator, discriminator: &Discriminator, epochs_trained: usize) -> Result<()>;

    fn plot(&mut self, history: &LossHistory) -> Result<()>;
}

/// Discards every output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSampler;

impl Sampler for NullSampler {
    fn render(&mut self, _generator: &Generator, _epoch: usize) -> Result<()> {
        Ok(())
    }

    fn persist(&mut self, _generator: &Generator, _discriminator: &Discriminator, _epochs_trained: usize) -> Result<()> {
        Ok(())
    }

    fn plot(&mut self, _history: &LossHistory) -> Result<()> {
        Ok(())
    }
}
