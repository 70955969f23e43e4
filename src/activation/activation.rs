use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Element-wise activation applied after a layer's linear transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    Tanh,
    LeakyReLU { alpha: f64 },
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
        }
    }

    /// Derivative with respect to the pre-activation `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            },
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
        }
    }

    /// Whether He initialization suits the layer feeding this activation.
    /// Sigmoid/Tanh/Identity layers get Xavier instead.
    pub fn is_rectifier(&self) -> bool {
        matches!(self, ActivationFunction::ReLU | ActivationFunction::LeakyReLU { .. })
    }

    /// The closed range every output of this activation lies in, if bounded.
    pub fn output_range(&self) -> Option<(f64, f64)> {
        match self {
            ActivationFunction::Sigmoid => Some((0.0, 1.0)),
            ActivationFunction::Tanh => Some((-1.0, 1.0)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derivatives_match_finite_differences() {
        let fns = [
            ActivationFunction::Sigmoid,
            ActivationFunction::Tanh,
            ActivationFunction::Identity,
            ActivationFunction::LeakyReLU { alpha: 0.2 },
        ];
        let h = 1e-6;
        for f in fns {
            for &x in &[-2.0, -0.3, 0.7, 1.9] {
                let numeric = (f.function(x + h) - f.function(x - h)) / (2.0 * h);
                assert_relative_eq!(f.derivative(x), numeric, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn leaky_relu_scales_negatives() {
        let f = ActivationFunction::LeakyReLU { alpha: 0.2 };
        assert_eq!(f.function(-5.0), -1.0);
        assert_eq!(f.function(3.0), 3.0);
    }
}
