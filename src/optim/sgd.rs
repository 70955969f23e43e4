use crate::network::{Gradients, Network};
use super::Optimizer;

/// Plain stochastic gradient descent: `θ ← θ - lr · g`.
#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, network: &mut Network, gradients: &Gradients) {
        let lr = self.learning_rate;
        for (layer, grads) in network.layers.iter_mut().zip(&gradients.layers) {
            let (weights, biases) = layer.parameters_mut();
            for (p, g) in weights.data.iter_mut().zip(&grads.weights.data) {
                *p -= lr * g;
            }
            for (p, g) in biases.data.iter_mut().zip(&grads.biases.data) {
                *p -= lr * g;
            }
        }
    }
}
