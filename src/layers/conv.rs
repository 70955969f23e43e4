use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{GanError, Result};
use crate::math::{Matrix, ImageShape};
use super::{LayerGradients, source_index};

/// Strided 2-D convolution with zero padding.
///
/// `weights` has shape `(out_channels, in_channels * kernel * kernel)`; column
/// `(c * kernel + ky) * kernel + kx` holds the tap for input channel `c` at
/// kernel offset `(ky, kx)`. `biases` has shape `(1, out_channels)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conv2d {
    pub input: ImageShape,
    pub output: ImageShape,
    pub kernel: usize,
    pub stride: usize,
    pub padding: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction,
}

impl Conv2d {
    /// Output shape of a convolution, or an error if the geometry is invalid.
    ///
    /// `out = (in + 2 * padding - kernel) / stride + 1` on each spatial axis.
    pub fn output_shape(
        input: ImageShape,
        out_channels: usize,
        kernel: usize,
        stride: usize,
        padding: usize,
    ) -> Result<ImageShape> {
        if kernel == 0 || stride == 0 || out_channels == 0 || input.is_empty() {
            return Err(GanError::Architecture(format!(
                "conv2d over {} needs non-zero kernel, stride and channels \
                 (kernel={}, stride={}, out_channels={})",
                input, kernel, stride, out_channels
            )));
        }
        let axis = |size: usize| -> Result<usize> {
            let padded = size + 2 * padding;
            if padded < kernel {
                return Err(GanError::Architecture(format!(
                    "conv2d kernel {} does not fit input {} with padding {}",
                    kernel, input, padding
                )));
            }
            Ok((padded - kernel) / stride + 1)
        };
        Ok(ImageShape::new(out_channels, axis(input.height)?, axis(input.width)?))
    }

    pub fn new<R: Rng + ?Sized>(
        input: ImageShape,
        out_channels: usize,
        kernel: usize,
        stride: usize,
        padding: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Result<Conv2d> {
        let output = Conv2d::output_shape(input, out_channels, kernel, stride, padding)?;
        let fan_in = input.channels * kernel * kernel;
        let weights = if activation.is_rectifier() {
            Matrix::he(out_channels, fan_in, fan_in, rng)
        } else {
            Matrix::xavier(out_channels, fan_in, fan_in, rng)
        };

        Ok(Conv2d {
            input,
            output,
            kernel,
            stride,
            padding,
            weights,
            biases: Matrix::zeros(1, out_channels),
            activator: activation,
        })
    }

    #[inline]
    fn tap(&self, c: usize, ky: usize, kx: usize) -> usize {
        (c * self.kernel + ky) * self.kernel + kx
    }

    /// Returns `(z, a)`: the pre-activation and the activation.
    pub fn feed_from(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let (inp, out, k) = (self.input, self.output, self.kernel);
        let mut z = vec![0.0; out.len()];

        for o in 0..out.channels {
            let bias = self.biases.get(0, o);
            for oy in 0..out.height {
                for ox in 0..out.width {
                    let mut sum = bias;
                    for c in 0..inp.channels {
                        for ky in 0..k {
                            let Some(iy) = source_index(oy, ky, self.stride, self.padding, inp.height) else {
                                continue;
                            };
                            for kx in 0..k {
                                let Some(ix) = source_index(ox, kx, self.stride, self.padding, inp.width) else {
                                    continue;
                                };
                                sum += self.weights.get(o, self.tap(c, ky, kx)) * input[inp.index(c, iy, ix)];
                            }
                        }
                    }
                    z[out.index(o, oy, ox)] = sum;
                }
            }
        }

        let a = z.iter().map(|&x| self.activator.function(x)).collect();
        (z, a)
    }

    /// Computes `(gradients, ∂L/∂input)` from `delta`, the error with respect
    /// to this layer's activation.
    pub fn compute_gradients(
        &self,
        input: &[f64],
        pre_activation: &[f64],
        delta: &[f64],
    ) -> (LayerGradients, Vec<f64>) {
        let (inp, out, k) = (self.input, self.output, self.kernel);
        let layer_delta: Vec<f64> = delta.iter().zip(pre_activation)
            .map(|(d, &z)| d * self.activator.derivative(z))
            .collect();

        let mut weights_grad = Matrix::zeros(self.weights.rows, self.weights.cols);
        let mut biases_grad = Matrix::zeros(1, out.channels);
        let mut input_delta = vec![0.0; inp.len()];

        for o in 0..out.channels {
            for oy in 0..out.height {
                for ox in 0..out.width {
                    let dz = layer_delta[out.index(o, oy, ox)];
                    if dz == 0.0 {
                        continue;
                    }
                    biases_grad.data[o] += dz;
                    for c in 0..inp.channels {
                        for ky in 0..k {
                            let Some(iy) = source_index(oy, ky, self.stride, self.padding, inp.height) else {
                                continue;
                            };
                            for kx in 0..k {
                                let Some(ix) = source_index(ox, kx, self.stride, self.padding, inp.width) else {
                                    continue;
                                };
                                let col = self.tap(c, ky, kx);
                                let src = inp.index(c, iy, ix);
                                weights_grad.data[o * self.weights.cols + col] += dz * input[src];
                                input_delta[src] += dz * self.weights.get(o, col);
                            }
                        }
                    }
                }
            }
        }

        (LayerGradients { weights: weights_grad, biases: biases_grad }, input_delta)
    }
}
