use crate::network::{Gradients, Network};
use super::Optimizer;

/// First and second moment estimates for one parameter matrix.
#[derive(Debug, Clone, Default)]
struct Moments {
    m: Vec<f64>,
    v: Vec<f64>,
}

impl Moments {
    fn zeros(len: usize) -> Moments {
        Moments { m: vec![0.0; len], v: vec![0.0; len] }
    }
}

/// Adam (Kingma & Ba) with bias correction folded into the step size.
///
/// Moment buffers are created on the first step and bound to the network
/// they were created for; one `Adam` instance per network.
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: u64,
    /// One `(weights, biases)` pair per layer.
    state: Vec<(Moments, Moments)>,
}

impl Adam {
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Adam {
        Adam { learning_rate, beta1, beta2, epsilon, t: 0, state: Vec::new() }
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u64 {
        self.t
    }

    fn update(&self, moments: &mut Moments, params: &mut [f64], grads: &[f64], lr_t: f64) {
        let (b1, b2, eps) = (self.beta1, self.beta2, self.epsilon);
        for i in 0..params.len() {
            let g = grads[i];
            moments.m[i] = b1 * moments.m[i] + (1.0 - b1) * g;
            moments.v[i] = b2 * moments.v[i] + (1.0 - b2) * g * g;
            params[i] -= lr_t * moments.m[i] / (moments.v[i].sqrt() + eps);
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, network: &mut Network, gradients: &Gradients) {
        if self.state.len() != network.layers.len() {
            self.state = network.layers.iter()
                .map(|layer| {
                    let (w, b) = layer.parameters();
                    (Moments::zeros(w.len()), Moments::zeros(b.len()))
                })
                .collect();
        }

        self.t += 1;
        let t = self.t as i32;
        let lr_t = self.learning_rate * (1.0 - self.beta2.powi(t)).sqrt() / (1.0 - self.beta1.powi(t));

        let mut state = std::mem::take(&mut self.state);
        for ((layer, grads), (w_mom, b_mom)) in network.layers.iter_mut()
            .zip(&gradients.layers)
            .zip(state.iter_mut())
        {
            let (weights, biases) = layer.parameters_mut();
            self.update(w_mom, &mut weights.data, &grads.weights.data, lr_t);
            self.update(b_mom, &mut biases.data, &grads.biases.data, lr_t);
        }
        self.state = state;
    }
}
