use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Result, TrainError};

/// Describes one layer in a network specification.
///
/// Fields:
/// - `size`       — number of neurons in this layer
/// - `input_size` — output size of the previous layer, or the raw input
///                  dimension for the first layer
/// - `activation` — activation function applied after the linear transform
/// - `dropout`    — drop probability in trainable mode (0 disables it)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
    #[serde(default)]
    pub dropout: f64,
}

/// A serializable description of a network architecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name, logged at run start.
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
}

impl NetworkSpec {
    /// Multi-layer perceptron: `hidden` is a list of `(size, dropout)`
    /// ReLU layers followed by a sigmoid output layer.
    pub fn mlp(name: &str, input_size: usize, hidden: &[(usize, f64)], output_size: usize) -> NetworkSpec {
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut fan_in = input_size;
        for &(size, dropout) in hidden {
            layers.push(LayerSpec { size, input_size: fan_in, activation: ActivationFunction::ReLU, dropout });
            fan_in = size;
        }
        layers.push(LayerSpec {
            size: output_size,
            input_size: fan_in,
            activation: ActivationFunction::Sigmoid,
            dropout: 0.0,
        });
        NetworkSpec { name: name.to_owned(), layers }
    }

    pub fn input_size(&self) -> Option<usize> {
        self.layers.first().map(|l| l.input_size)
    }

    pub fn output_size(&self) -> Option<usize> {
        self.layers.last().map(|l| l.size)
    }

    /// Checks that consecutive layers line up and dropout rates are valid.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(TrainError::model(format!("network '{}' has no layers", self.name)));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.size == 0 || layer.input_size == 0 {
                return Err(TrainError::model(format!("layer {} of '{}' has a zero dimension", i, self.name)));
            }
            if !(0.0..1.0).contains(&layer.dropout) {
                return Err(TrainError::model(format!(
                    "layer {} of '{}' has dropout {} outside [0, 1)", i, self.name, layer.dropout
                )));
            }
            if i > 0 && self.layers[i - 1].size != layer.input_size {
                return Err(TrainError::model(format!(
                    "layer {} of '{}' expects {} inputs but the previous layer has {} outputs",
                    i, self.name, layer.input_size, self.layers[i - 1].size
                )));
            }
        }
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &Path) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
