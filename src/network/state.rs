use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::matrix::Matrix;

/// Parameter values of one dense layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerState {
    pub weights: Matrix,
    pub biases: Matrix,
}

/// Value copy of a [`Network`](super::Network)'s parameters. This is the
/// checkpoint file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkState {
    pub layers: Vec<LayerState>,
}

impl NetworkState {
    /// Serializes the parameters to a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Deserializes parameters previously written by `save_json`.
    pub fn load_json(path: &Path) -> Result<NetworkState> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
