pub mod adam;
pub mod sgd;

use serde::{Deserialize, Serialize};

use crate::network::{Gradients, Network};

pub use adam::Adam;
pub use sgd::Sgd;

/// Applies gradients to the parameters of one network.
///
/// An optimizer may keep per-parameter state, so each network gets its own
/// instance.
pub trait Optimizer {
    fn step(&mut self, network: &mut Network, gradients: &Gradients);
}

/// Serializable optimizer choice and hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Adam {
        learning_rate: f64,
        beta1: f64,
        #[serde(default = "default_beta2")]
        beta2: f64,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
    Sgd {
        learning_rate: f64,
    },
}

fn default_beta2() -> f64 {
    0.999
}

fn default_epsilon() -> f64 {
    1e-7
}

impl OptimizerConfig {
    /// Adam with the given learning rate and first-moment decay, defaults
    /// for the rest.
    pub fn adam(learning_rate: f64, beta1: f64) -> OptimizerConfig {
        OptimizerConfig::Adam {
            learning_rate,
            beta1,
            beta2: default_beta2(),
            epsilon: default_epsilon(),
        }
    }

    pub fn learning_rate(&self) -> f64 {
        match *self {
            OptimizerConfig::Adam { learning_rate, .. } | OptimizerConfig::Sgd { learning_rate } => learning_rate,
        }
    }

    pub fn build(&self) -> Box<dyn Optimizer> {
        match *self {
            OptimizerConfig::Adam { learning_rate, beta1, beta2, epsilon } => {
                Box::new(Adam::new(learning_rate, beta1, beta2, epsilon))
            }
            OptimizerConfig::Sgd { learning_rate } => Box::new(Sgd::new(learning_rate)),
        }
    }
}
