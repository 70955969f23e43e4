use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::{GanError, Result};
use crate::json;
use crate::layers::{Layer, LayerGradients};

/// An ordered stack of layers. Inference and backpropagation never mutate the
/// network; only an optimizer step holding `&mut Network` changes parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
}

/// Every intermediate value of one forward pass, kept for backprop.
///
/// `activations[0]` is the input; `activations[i + 1]` and
/// `pre_activations[i]` belong to layer `i`.
#[derive(Debug, Clone)]
pub struct ForwardTrace {
    pub activations: Vec<Vec<f64>>,
    pub pre_activations: Vec<Vec<f64>>,
}

impl ForwardTrace {
    pub fn output(&self) -> &[f64] {
        self.activations.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Per-layer gradients for a whole network.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub layers: Vec<LayerGradients>,
}

impl Gradients {
    pub fn zeros_for(network: &Network) -> Gradients {
        Gradients {
            layers: network.layers.iter().map(LayerGradients::zeros_like).collect(),
        }
    }

    pub fn accumulate(&mut self, other: &Gradients) {
        for (acc, g) in self.layers.iter_mut().zip(&other.layers) {
            acc.accumulate(g);
        }
    }

    pub fn scale(&mut self, factor: f64) {
        self.layers.iter_mut().for_each(|g| g.scale(factor));
    }
}

impl Network {
    pub fn new(layers: Vec<Layer>) -> Network {
        Network { layers }
    }

    pub fn input_len(&self) -> usize {
        self.layers.first().map(Layer::input_len).unwrap_or(0)
    }

    pub fn output_len(&self) -> usize {
        self.layers.last().map(Layer::output_len).unwrap_or(0)
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Checks every layer's parameters and that each layer's output feeds
    /// the next layer's input.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(GanError::Architecture("network has no layers".into()));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate().map_err(|e| match e {
                GanError::Architecture(msg) => GanError::Architecture(format!("layer {}: {}", i, msg)),
                other => other,
            })?;
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].output_len() != pair[1].input_len() {
                return Err(GanError::Architecture(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i, pair[0].output_len(), i + 1, pair[1].input_len()
                )));
            }
        }
        Ok(())
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_len() {
            return Err(GanError::Shape { expected: self.input_len(), actual: input.len() });
        }
        Ok(())
    }

    /// Inference-only forward pass.
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.check_input(input)?;
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.feed_from(&current).1;
        }
        Ok(current)
    }

    /// Forward pass that keeps every activation for a later `backward`.
    pub fn forward_trace(&self, input: &[f64]) -> Result<ForwardTrace> {
        self.check_input(input)?;
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        activations.push(input.to_vec());
        for layer in &self.layers {
            let (z, a) = layer.feed_from(activations.last().map(Vec::as_slice).unwrap_or(&[]));
            pre_activations.push(z);
            activations.push(a);
        }
        Ok(ForwardTrace { activations, pre_activations })
    }

    /// Backpropagates `output_delta` (∂L/∂output) through the trace.
    ///
    /// Returns the parameter gradients and ∂L/∂input. The input gradient is
    /// what lets the generator learn through a frozen discriminator.
    pub fn backward(&self, trace: &ForwardTrace, output_delta: &[f64]) -> (Gradients, Vec<f64>) {
        let mut grads = Vec::with_capacity(self.layers.len());
        let mut delta = output_delta.to_vec();

        for i in (0..self.layers.len()).rev() {
            let (layer_grads, input_delta) = self.layers[i].compute_gradients(
                &trace.activations[i],
                &trace.pre_activations[i],
                &delta,
            );
            grads.push(layer_grads);
            delta = input_delta;
        }

        grads.reverse();
        (Gradients { layers: grads }, delta)
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        json::save_json(self, path.as_ref())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Network> {
        let network: Network = json::load_json(path.as_ref())?;
        network.validate()?;
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction;
    use crate::layers::Dense;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiny() -> Network {
        let mut rng = StdRng::seed_from_u64(5);
        Network::new(vec![
            Layer::Dense(Dense::new(3, 2, ActivationFunction::ReLU, &mut rng)),
            Layer::Dense(Dense::new(1, 3, ActivationFunction::Sigmoid, &mut rng)),
        ])
    }

    #[test]
    fn forward_rejects_wrong_length() {
        let err = tiny().forward(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, GanError::Shape { expected: 2, actual: 3 }));
    }

    #[test]
    fn trace_output_equals_forward() {
        let net = tiny();
        let trace = net.forward_trace(&[0.5, -0.25]).unwrap();
        assert_eq!(trace.output(), net.forward(&[0.5, -0.25]).unwrap().as_slice());
        assert_eq!(trace.activations.len(), 3);
    }

    #[test]
    fn backward_yields_one_gradient_per_layer() {
        let net = tiny();
        let trace = net.forward_trace(&[0.5, -0.25]).unwrap();
        let (grads, input_delta) = net.backward(&trace, &[1.0]);
        assert_eq!(grads.layers.len(), 2);
        assert_eq!(grads.layers[0].weights.rows, 2);
        assert_eq!(input_delta.len(), 2);
    }

    #[test]
    fn validate_rejects_broken_chaining_and_empty_networks() {
        let mut rng = StdRng::seed_from_u64(6);
        tiny().validate().unwrap();
        let broken = Network::new(vec![
            Layer::Dense(Dense::new(3, 2, ActivationFunction::ReLU, &mut rng)),
            Layer::Dense(Dense::new(1, 4, ActivationFunction::Sigmoid, &mut rng)),
        ]);
        assert!(matches!(broken.validate(), Err(GanError::Architecture(_))));
        assert!(Network::new(Vec::new()).validate().is_err());
    }

    #[test]
    fn load_rejects_truncated_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.json");
        let mut net = tiny();
        net.layers[1].parameters_mut().0.data.truncate(1);
        net.save_json(&path).unwrap();
        assert!(matches!(Network::load_json(&path), Err(GanError::Architecture(_))));
    }

    #[test]
    fn json_round_trip_preserves_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.json");
        let net = tiny();
        net.save_json(&path).unwrap();
        assert_eq!(Network::load_json(&path).unwrap(), net);
    }
}
