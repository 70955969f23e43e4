pub mod dense;
pub mod conv;
pub mod conv_transpose;

use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{GanError, Result};
use crate::math::matrix::Matrix;

pub use dense::Dense;
pub use conv::Conv2d;
pub use conv_transpose::ConvTranspose2d;

/// One trainable layer. Every variant holds a `weights` and a `biases` matrix,
/// which is what the optimizers update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    Dense(Dense),
    Conv2d(Conv2d),
    ConvTranspose2d(ConvTranspose2d),
}

/// Gradients of the loss with respect to one layer's parameters; shapes match
/// the layer's `weights` and `biases`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    pub weights: Matrix,
    pub biases: Matrix,
}

impl LayerGradients {
    pub fn zeros_like(layer: &Layer) -> LayerGradients {
        let (w, b) = layer.parameters();
        LayerGradients {
            weights: Matrix::zeros(w.rows, w.cols),
            biases: Matrix::zeros(b.rows, b.cols),
        }
    }

    pub fn accumulate(&mut self, other: &LayerGradients) {
        self.weights = &self.weights + &other.weights;
        self.biases = &self.biases + &other.biases;
    }

    pub fn scale(&mut self, factor: f64) {
        self.weights = self.weights.map(|x| x * factor);
        self.biases = self.biases.map(|x| x * factor);
    }
}

impl Layer {
    pub fn input_len(&self) -> usize {
        match self {
            Layer::Dense(l) => l.input_size,
            Layer::Conv2d(l) => l.input.len(),
            Layer::ConvTranspose2d(l) => l.input.len(),
        }
    }

    pub fn output_len(&self) -> usize {
        match self {
            Layer::Dense(l) => l.size,
            Layer::Conv2d(l) => l.output.len(),
            Layer::ConvTranspose2d(l) => l.output.len(),
        }
    }

    pub fn activator(&self) -> ActivationFunction {
        match self {
            Layer::Dense(l) => l.activator,
            Layer::Conv2d(l) => l.activator,
            Layer::ConvTranspose2d(l) => l.activator,
        }
    }

    /// Returns `(z, a)` for one sample.
    pub fn feed_from(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        match self {
            Layer::Dense(l) => l.feed_from(input),
            Layer::Conv2d(l) => l.feed_from(input),
            Layer::ConvTranspose2d(l) => l.feed_from(input),
        }
    }

    pub fn compute_gradients(
        &self,
        input: &[f64],
        pre_activation: &[f64],
        delta: &[f64],
    ) -> (LayerGradients, Vec<f64>) {
        match self {
            Layer::Dense(l) => l.compute_gradients(input, pre_activation, delta),
            Layer::Conv2d(l) => l.compute_gradients(input, pre_activation, delta),
            Layer::ConvTranspose2d(l) => l.compute_gradients(input, pre_activation, delta),
        }
    }

    pub fn parameters(&self) -> (&Matrix, &Matrix) {
        match self {
            Layer::Dense(l) => (&l.weights, &l.biases),
            Layer::Conv2d(l) => (&l.weights, &l.biases),
            Layer::ConvTranspose2d(l) => (&l.weights, &l.biases),
        }
    }

    pub fn parameters_mut(&mut self) -> (&mut Matrix, &mut Matrix) {
        match self {
            Layer::Dense(l) => (&mut l.weights, &mut l.biases),
            Layer::Conv2d(l) => (&mut l.weights, &mut l.biases),
            Layer::ConvTranspose2d(l) => (&mut l.weights, &mut l.biases),
        }
    }

    pub fn parameter_count(&self) -> usize {
        let (w, b) = self.parameters();
        w.len() + b.len()
    }

    /// Checks that the stored parameters agree with the declared geometry.
    ///
    /// Constructors always produce consistent layers; this guards layers
    /// that arrive through deserialization.
    pub fn validate(&self) -> Result<()> {
        let (name, weights_shape, out_len) = match self {
            Layer::Dense(l) => {
                if l.size == 0 || l.input_size == 0 {
                    return Err(GanError::Architecture("dense layer has a zero-sized side".into()));
                }
                ("dense", (l.input_size, l.size), l.size)
            }
            Layer::Conv2d(l) => {
                let expected = Conv2d::output_shape(l.input, l.output.channels, l.kernel, l.stride, l.padding)?;
                if expected != l.output {
                    return Err(GanError::Architecture(format!(
                        "conv2d declares output {} but its geometry gives {}", l.output, expected
                    )));
                }
                ("conv2d", (l.output.channels, l.input.channels * l.kernel * l.kernel), l.output.channels)
            }
            Layer::ConvTranspose2d(l) => {
                let expected =
                    ConvTranspose2d::output_shape(l.input, l.output.channels, l.kernel, l.stride, l.padding)?;
                if expected != l.output {
                    return Err(GanError::Architecture(format!(
                        "conv_transpose2d declares output {} but its geometry gives {}", l.output, expected
                    )));
                }
                ("conv_transpose2d", (l.input.channels, l.output.channels * l.kernel * l.kernel), l.output.channels)
            }
        };

        let (w, b) = self.parameters();
        check_matrix(name, "weights", w, weights_shape)?;
        check_matrix(name, "biases", b, (1, out_len))
    }
}

fn check_matrix(layer: &str, role: &str, m: &Matrix, (rows, cols): (usize, usize)) -> Result<()> {
    if m.rows != rows || m.cols != cols || m.data.len() != rows * cols {
        return Err(GanError::Architecture(format!(
            "{} {} must be {}x{} ({} values), found {}x{} with {} values",
            layer, role, rows, cols, rows * cols, m.rows, m.cols, m.data.len()
        )));
    }
    Ok(())
}

/// Input coordinate read by output position `out_pos` through kernel offset
/// `k` of a strided, zero-padded convolution; `None` when it falls in the
/// padding.
#[inline]
pub(crate) fn source_index(out_pos: usize, k: usize, stride: usize, padding: usize, size: usize) -> Option<usize> {
    let i = (out_pos * stride + k).checked_sub(padding)?;
    (i < size).then_some(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ImageShape;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Loss used for gradient checks: L = Σ a_i * w_i with fixed weights w.
    fn probe_loss(layer: &Layer, input: &[f64], probe: &[f64]) -> f64 {
        let (_, a) = layer.feed_from(input);
        a.iter().zip(probe).map(|(x, w)| x * w).sum()
    }

    fn check_gradients(mut layer: Layer, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let input: Vec<f64> = (0..layer.input_len()).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect();
        let probe: Vec<f64> = (0..layer.output_len()).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect();
        {
            let (_, b) = layer.parameters_mut();
            b.data.iter_mut().for_each(|x| *x = rng.gen::<f64>() * 0.2 - 0.1);
        }

        let (z, _) = layer.feed_from(&input);
        let (grads, input_delta) = layer.compute_gradients(&input, &z, &probe);
        let h = 1e-6;

        for idx in 0..layer.parameters().0.len() {
            let orig = layer.parameters().0.data[idx];
            layer.parameters_mut().0.data[idx] = orig + h;
            let up = probe_loss(&layer, &input, &probe);
            layer.parameters_mut().0.data[idx] = orig - h;
            let down = probe_loss(&layer, &input, &probe);
            layer.parameters_mut().0.data[idx] = orig;
            assert_relative_eq!(grads.weights.data[idx], (up - down) / (2.0 * h), epsilon = 1e-5);
        }

        for idx in 0..layer.parameters().1.len() {
            let orig = layer.parameters().1.data[idx];
            layer.parameters_mut().1.data[idx] = orig + h;
            let up = probe_loss(&layer, &input, &probe);
            layer.parameters_mut().1.data[idx] = orig - h;
            let down = probe_loss(&layer, &input, &probe);
            layer.parameters_mut().1.data[idx] = orig;
            assert_relative_eq!(grads.biases.data[idx], (up - down) / (2.0 * h), epsilon = 1e-5);
        }

        for idx in 0..input.len() {
            let mut shifted = input.clone();
            shifted[idx] += h;
            let up = probe_loss(&layer, &shifted, &probe);
            shifted[idx] -= 2.0 * h;
            let down = probe_loss(&layer, &shifted, &probe);
            assert_relative_eq!(input_delta[idx], (up - down) / (2.0 * h), epsilon = 1e-5);
        }
    }

    #[test]
    fn dense_backward_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(1);
        let layer = Dense::new(3, 4, ActivationFunction::Tanh, &mut rng);
        check_gradients(Layer::Dense(layer), 11);
    }

    #[test]
    fn conv2d_backward_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(2);
        let layer = Conv2d::new(
            ImageShape::new(2, 4, 4), 3, 4, 2, 1,
            ActivationFunction::Sigmoid, &mut rng,
        ).unwrap();
        assert_eq!(layer.output, ImageShape::new(3, 2, 2));
        check_gradients(Layer::Conv2d(layer), 12);
    }

    #[test]
    fn conv_transpose2d_backward_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = ConvTranspose2d::new(
            ImageShape::new(2, 2, 2), 2, 4, 2, 1,
            ActivationFunction::Tanh, &mut rng,
        ).unwrap();
        assert_eq!(layer.output, ImageShape::new(2, 4, 4));
        check_gradients(Layer::ConvTranspose2d(layer), 13);
    }

    #[test]
    fn same_padding_transpose_keeps_size() {
        let shape = ConvTranspose2d::output_shape(ImageShape::new(64, 28, 28), 1, 7, 1, 3).unwrap();
        assert_eq!(shape, ImageShape::mnist());
    }

    #[test]
    fn validate_catches_damaged_parameters() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut layer = Layer::Conv2d(Conv2d::new(
            ImageShape::new(1, 4, 4), 2, 4, 2, 1,
            ActivationFunction::ReLU, &mut rng,
        ).unwrap());
        layer.validate().unwrap();

        layer.parameters_mut().0.data.truncate(1);
        assert!(matches!(layer.validate(), Err(GanError::Architecture(_))));

        let mut dense = Layer::Dense(Dense::new(3, 2, ActivationFunction::Tanh, &mut rng));
        dense.parameters_mut().1.cols = 4;
        assert!(dense.validate().is_err());
    }

    #[test]
    fn impossible_geometry_is_rejected() {
        assert!(Conv2d::output_shape(ImageShape::new(1, 2, 2), 1, 7, 1, 0).is_err());
        assert!(ConvTranspose2d::output_shape(ImageShape::new(1, 1, 1), 1, 2, 1, 1).is_err());
    }
}
