use std::path::Path;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{GanError, Result};
use crate::json;
use crate::layers::{Conv2d, ConvTranspose2d, Dense, Layer};
use crate::math::ImageShape;
use crate::network::metadata::ModelMetadata;
use crate::network::network::Network;

/// Describes one layer in a network specification.
///
/// Convolutional layers carry their input shape; the output shape follows
/// from the geometry. A dense layer after a convolution sees the flattened
/// activation, so its `input_size` is `shape.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    Dense {
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
    },
    Conv2d {
        input: ImageShape,
        out_channels: usize,
        kernel: usize,
        stride: usize,
        padding: usize,
        activation: ActivationFunction,
    },
    ConvTranspose2d {
        input: ImageShape,
        out_channels: usize,
        kernel: usize,
        stride: usize,
        padding: usize,
        activation: ActivationFunction,
    },
}

impl LayerSpec {
    fn input_len(&self) -> usize {
        match self {
            LayerSpec::Dense { input_size, .. } => *input_size,
            LayerSpec::Conv2d { input, .. } | LayerSpec::ConvTranspose2d { input, .. } => input.len(),
        }
    }

    /// Flattened output length, or an architecture error for impossible geometry.
    fn output_len(&self) -> Result<usize> {
        match *self {
            LayerSpec::Dense { size, .. } => Ok(size),
            LayerSpec::Conv2d { input, out_channels, kernel, stride, padding, .. } => {
                Ok(Conv2d::output_shape(input, out_channels, kernel, stride, padding)?.len())
            }
            LayerSpec::ConvTranspose2d { input, out_channels, kernel, stride, padding, .. } => {
                Ok(ConvTranspose2d::output_shape(input, out_channels, kernel, stride, padding)?.len())
            }
        }
    }

    fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Layer> {
        Ok(match *self {
            LayerSpec::Dense { size, input_size, activation } => {
                Layer::Dense(Dense::new(size, input_size, activation, rng))
            }
            LayerSpec::Conv2d { input, out_channels, kernel, stride, padding, activation } => {
                Layer::Conv2d(Conv2d::new(input, out_channels, kernel, stride, padding, activation, rng)?)
            }
            LayerSpec::ConvTranspose2d { input, out_channels, kernel, stride, padding, activation } => {
                Layer::ConvTranspose2d(ConvTranspose2d::new(
                    input, out_channels, kernel, stride, padding, activation, rng,
                )?)
            }
        })
    }
}

/// A fully serializable description of a network architecture plus optional
/// metadata.
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of the
/// trained weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used as the model file stem.
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl NetworkSpec {
    /// Checks that every layer is buildable and that each layer's input size
    /// equals the previous layer's output size.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(GanError::Architecture(format!("network '{}' has no layers", self.name)));
        }
        let mut previous: Option<usize> = None;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.input_len() == 0 {
                return Err(GanError::Architecture(format!(
                    "network '{}': layer {} has an empty input", self.name, i
                )));
            }
            if let Some(prev) = previous {
                if prev != layer.input_len() {
                    return Err(GanError::Architecture(format!(
                        "network '{}': layer {} expects {} inputs but layer {} produces {}",
                        self.name, i, layer.input_len(), i - 1, prev
                    )));
                }
            }
            let out = layer.output_len()?;
            if out == 0 {
                return Err(GanError::Architecture(format!(
                    "network '{}': layer {} produces no outputs", self.name, i
                )));
            }
            previous = Some(out);
        }
        Ok(())
    }

    /// Validates the spec and initialises a fresh network from `rng`.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        self.validate()?;
        let layers = self.layers.iter()
            .map(|spec| spec.build(rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Network::new(layers))
    }

    pub fn input_len(&self) -> usize {
        self.layers.first().map(LayerSpec::input_len).unwrap_or(0)
    }

    pub fn output_len(&self) -> Result<usize> {
        match self.layers.last() {
            Some(layer) => layer.output_len(),
            None => Ok(0),
        }
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        json::save_json(self, path.as_ref())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        json::load_json(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn mismatched_chain_is_rejected() {
        let spec = NetworkSpec {
            name: "broken".into(),
            layers: vec![
                LayerSpec::Dense { size: 8, input_size: 4, activation: ActivationFunction::ReLU },
                LayerSpec::Conv2d {
                    input: ImageShape::new(1, 3, 3),
                    out_channels: 2, kernel: 3, stride: 1, padding: 1,
                    activation: ActivationFunction::ReLU,
                },
            ],
            metadata: None,
        };
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, GanError::Architecture(_)));
    }

    #[test]
    fn dense_into_conv_chains_through_flattened_shape() {
        let spec = NetworkSpec {
            name: "ok".into(),
            layers: vec![
                LayerSpec::Dense { size: 9, input_size: 4, activation: ActivationFunction::ReLU },
                LayerSpec::Conv2d {
                    input: ImageShape::new(1, 3, 3),
                    out_channels: 2, kernel: 3, stride: 1, padding: 1,
                    activation: ActivationFunction::Tanh,
                },
            ],
            metadata: None,
        };
        let net = spec.build(&mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(net.input_len(), 4);
        assert_eq!(net.output_len(), 18);
        assert_eq!(spec.output_len().unwrap(), 18);
    }

    #[test]
    fn empty_spec_is_rejected() {
        let spec = NetworkSpec { name: "empty".into(), layers: vec![], metadata: None };
        assert!(spec.build(&mut StdRng::seed_from_u64(0)).is_err());
    }
}
