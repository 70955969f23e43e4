pub mod trainer;
pub mod epoch_stats;
pub mod train_config;
pub mod loop_fn;

pub use trainer::{discriminator_update, generator_update, BatchOutcome};
pub use epoch_stats::{EpochRecord, LossHistory};
pub use train_config::{GanConfig, GridConfig, PathsConfig};
pub use loop_fn::{GanSession, TrainingSummary};
