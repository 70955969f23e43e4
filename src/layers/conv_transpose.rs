use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{GanError, Result};
use crate::math::{Matrix, ImageShape};
use super::LayerGradients;

/// Transposed (fractionally strided) 2-D convolution, the upsampling layer of
/// the generator.
///
/// Every input pixel scatters a `kernel × kernel` patch into the output,
/// offset by `stride` per input step and cropped by `padding` on each side.
/// `weights` has shape `(in_channels, out_channels * kernel * kernel)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvTranspose2d {
    pub input: ImageShape,
    pub output: ImageShape,
    pub kernel: usize,
    pub stride: usize,
    pub padding: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction,
}

impl ConvTranspose2d {
    /// Output shape: `out = (in - 1) * stride - 2 * padding + kernel` per axis.
    pub fn output_shape(
        input: ImageShape,
        out_channels: usize,
        kernel: usize,
        stride: usize,
        padding: usize,
    ) -> Result<ImageShape> {
        if kernel == 0 || stride == 0 || out_channels == 0 || input.is_empty() {
            return Err(GanError::Architecture(format!(
                "conv_transpose2d over {} needs non-zero kernel, stride and channels \
                 (kernel={}, stride={}, out_channels={})",
                input, kernel, stride, out_channels
            )));
        }
        let axis = |size: usize| -> Result<usize> {
            let full = (size - 1) * stride + kernel;
            if full <= 2 * padding {
                return Err(GanError::Architecture(format!(
                    "conv_transpose2d padding {} crops away the whole output for input {}",
                    padding, input
                )));
            }
            Ok(full - 2 * padding)
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
    ) -> Result<ConvTranspose2d> {
        let output = ConvTranspose2d::output_shape(input, out_channels, kernel, stride, padding)?;
        // Each output pixel receives roughly in_channels * (kernel / stride)² taps.
        let per_axis = (kernel + stride - 1) / stride;
        let fan_in = (input.channels * per_axis * per_axis).max(1);
        let cols = out_channels * kernel * kernel;
        let weights = if activation.is_rectifier() {
            Matrix::he(input.channels, cols, fan_in, rng)
        } else {
            Matrix::xavier(input.channels, cols, fan_in, rng)
        };

        Ok(ConvTranspose2d {
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
    fn tap(&self, o: usize, ky: usize, kx: usize) -> usize {
        (o * self.kernel + ky) * self.kernel + kx
    }

    /// Output coordinate hit by input position `pos` through kernel offset `k`.
    #[inline]
    fn target(&self, pos: usize, k: usize, size: usize) -> Option<usize> {
        let t = (pos * self.stride + k).checked_sub(self.padding)?;
        (t < size).then_some(t)
    }

    /// Returns `(z, a)`: the pre-activation and the activation.
    pub fn feed_from(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let (inp, out, k) = (self.input, self.output, self.kernel);
        let mut z = vec![0.0; out.len()];
        for o in 0..out.channels {
            let bias = self.biases.get(0, o);
            z[o * out.plane()..(o + 1) * out.plane()].iter_mut().for_each(|v| *v = bias);
        }

        for c in 0..inp.channels {
            for iy in 0..inp.height {
                for ix in 0..inp.width {
                    let v = input[inp.index(c, iy, ix)];
                    if v == 0.0 {
                        continue;
                    }
                    for o in 0..out.channels {
                        for ky in 0..k {
                            let Some(oy) = self.target(iy, ky, out.height) else { continue };
                            for kx in 0..k {
                                let Some(ox) = self.target(ix, kx, out.width) else { continue };
                                z[out.index(o, oy, ox)] += v * self.weights.get(c, self.tap(o, ky, kx));
                            }
                        }
                    }
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
            biases_grad.data[o] = layer_delta[o * out.plane()..(o + 1) * out.plane()].iter().sum();
        }

        for c in 0..inp.channels {
            for iy in 0..inp.height {
                for ix in 0..inp.width {
                    let src = inp.index(c, iy, ix);
                    let v = input[src];
                    let mut acc = 0.0;
                    for o in 0..out.channels {
                        for ky in 0..k {
                            let Some(oy) = self.target(iy, ky, out.height) else { continue };
                            for kx in 0..k {
                                let Some(ox) = self.target(ix, kx, out.width) else { continue };
                                let dz = layer_delta[out.index(o, oy, ox)];
                                let col = self.tap(o, ky, kx);
                                weights_grad.data[c * self.weights.cols + col] += v * dz;
                                acc += self.weights.get(c, col) * dz;
                            }
                        }
                    }
                    input_delta[src] = acc;
                }
            }
        }

        (LayerGradients { weights: weights_grad, biases: biases_grad }, input_delta)
    }
}
