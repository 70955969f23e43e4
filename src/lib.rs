pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod data;
pub mod gan;
pub mod train;
pub mod output;
pub mod error;

mod json;

// Convenience re-exports
pub use math::{ImageShape, Matrix};
pub use activation::ActivationFunction;
pub use layers::Layer;
pub use network::{Network, NetworkSpec};
pub use loss::BceLoss;
pub use optim::{Adam, Optimizer, OptimizerConfig, Sgd};
pub use data::{Dataset, Image};
pub use gan::{sample_latent, ArchitectureConfig, Discriminator, Generator};
pub use train::{GanConfig, GanSession, LossHistory, TrainingSummary};
pub use output::{DiskSampler, NullSampler, Sampler};
pub use error::{GanError, Result};
