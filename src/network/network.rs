use rand::{rngs::StdRng, SeedableRng};

use crate::error::{Result, TrainError};
use crate::layers::dense::Layer;
use crate::network::model::{Model, Param};
use crate::network::spec::NetworkSpec;
use crate::network::state::{LayerState, NetworkState};

/// Sequential stack of dense layers.
pub struct Network {
    pub layers: Vec<Layer>,
    training: bool,
    dropout_rng: StdRng,
}

impl Network {
    /// Builds a network from a validated spec. `seed` drives both weight
    /// initialization and the dropout masks.
    pub fn from_spec(spec: &NetworkSpec, seed: u64) -> Result<Network> {
        spec.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let layers = spec.layers.iter()
            .map(|l| Layer::new(l.size, l.input_size, l.activation, l.dropout, &mut rng))
            .collect();
        Ok(Network {
            layers,
            training: true,
            dropout_rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
        })
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.size)
    }

    pub fn num_parameters(&self) -> usize {
        self.layers.iter()
            .map(|l| l.weights.data.len() + l.biases.data.len())
            .sum()
    }

    /// Loads parameters from a checkpoint written by a previous run.
    pub fn load_checkpoint(&mut self, path: &std::path::Path) -> Result<()> {
        let state = NetworkState::load_json(path)?;
        self.restore(&state)
    }
}

impl Model for Network {
    type State = NetworkState;

    fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        let rng = &mut self.dropout_rng;
        let training = self.training;
        let mut current = input.to_vec();
        for layer in self.layers.iter_mut() {
            let layer_rng = if training { Some(&mut *rng) } else { None };
            current = layer.forward(&current, layer_rng);
        }
        current
    }

    fn infer(&self, input: &[f64]) -> Vec<f64> {
        self.layers.iter().fold(input.to_vec(), |current, layer| layer.infer(&current))
    }

    fn backward(&mut self, grad_output: &[f64]) {
        let mut grad = grad_output.to_vec();
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad);
        }
    }

    fn zero_grad(&mut self) {
        self.layers.iter_mut().for_each(Layer::zero_grad);
    }

    fn parameters(&mut self) -> Vec<Param<'_>> {
        let mut params = Vec::with_capacity(self.layers.len() * 2);
        for layer in self.layers.iter_mut() {
            params.push(Param { value: &mut layer.weights, grad: &layer.weights_grad });
            params.push(Param { value: &mut layer.biases, grad: &layer.biases_grad });
        }
        params
    }

    fn is_training(&self) -> bool {
        self.training
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn snapshot(&self) -> NetworkState {
        NetworkState {
            layers: self.layers.iter()
                .map(|l| LayerState { weights: l.weights.clone(), biases: l.biases.clone() })
                .collect(),
        }
    }

    fn restore(&mut self, state: &NetworkState) -> Result<()> {
        if state.layers.len() != self.layers.len() {
            return Err(TrainError::model(format!(
                "checkpoint has {} layers, network has {}",
                state.layers.len(),
                self.layers.len()
            )));
        }
        for (i, (layer, saved)) in self.layers.iter().zip(&state.layers).enumerate() {
            if !layer.weights.same_shape(&saved.weights) || !layer.biases.same_shape(&saved.biases) {
                return Err(TrainError::model(format!(
                    "checkpoint layer {} is {}x{}, network layer is {}x{}",
                    i, saved.weights.rows, saved.weights.cols, layer.weights.rows, layer.weights.cols
                )));
            }
        }
        for (layer, saved) in self.layers.iter_mut().zip(&state.layers) {
            layer.weights = saved.weights.clone();
            layer.biases = saved.biases.clone();
        }
        Ok(())
    }
}
