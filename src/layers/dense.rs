use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};
use super::LayerGradients;

/// Fully connected layer: `a = σ(x·W + b)`.
///
/// `weights` has shape `(input_size, size)`, `biases` shape `(1, size)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    pub size: usize,
    pub input_size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction,
}

impl Dense {
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Dense {
        let weights = if activation.is_rectifier() {
            Matrix::he(input_size, size, input_size, rng)
        } else {
            Matrix::xavier(input_size, size, input_size, rng)
        };

        Dense {
            size,
            input_size,
            weights,
            biases: Matrix::zeros(1, size),
            activator: activation,
        }
    }

    /// Returns `(z, a)`: the pre-activation and the activation.
    pub fn feed_from(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let z = &(&Matrix::row(input) * &self.weights) + &self.biases;
        let a = z.map(|x| self.activator.function(x));
        (z.data, a.data)
    }

    /// Computes `(gradients, ∂L/∂input)` from `delta`, the error with respect
    /// to this layer's activation.
    pub fn compute_gradients(
        &self,
        input: &[f64],
        pre_activation: &[f64],
        delta: &[f64],
    ) -> (LayerGradients, Vec<f64>) {
        // Use pre-activation z so that derivative(z) = σ'(z) is computed correctly
        let act_derivative = Matrix::row(pre_activation).map(|x| self.activator.derivative(x));
        // δ = error ⊙ σ'(z)
        let layer_delta = Matrix::row(delta).hadamard(&act_derivative);

        let weights_grad = &Matrix::row(input).transpose() * &layer_delta;
        let input_delta = &layer_delta * &self.weights.transpose();

        (
            LayerGradients { weights: weights_grad, biases: layer_delta },
            input_delta.data,
        )
    }
}
