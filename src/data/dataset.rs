use std::sync::Arc;

use crate::error::{Result, TrainError};

/// One `(input, target)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

impl Sample {
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> Sample {
        Sample { input, target }
    }
}

/// A finite, indexable collection of samples.
///
/// `get` must return the same sample for the same index every time, so a
/// non-shuffled pass over a dataset is reproducible.
pub trait Dataset: Send + Sync {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Result<Sample>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type SharedDataset = Arc<dyn Dataset>;

fn out_of_range(index: usize, len: usize) -> TrainError {
    TrainError::dataset(format!("sample index {} out of range for {} samples", index, len))
}

/// Samples held in memory.
#[derive(Debug, Clone, Default)]
pub struct VecDataset {
    samples: Vec<Sample>,
}

impl VecDataset {
    pub fn new(samples: Vec<Sample>) -> VecDataset {
        VecDataset { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl Dataset for VecDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        self.samples.get(index).cloned().ok_or_else(|| out_of_range(index, self.samples.len()))
    }
}

/// A view of selected indices of a shared dataset.
#[derive(Clone)]
pub struct Subset {
    inner: SharedDataset,
    indices: Vec<usize>,
}

impl Subset {
    pub fn new(inner: SharedDataset, indices: Vec<usize>) -> Subset {
        Subset { inner, indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl Dataset for Subset {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let inner_index = *self.indices.get(index).ok_or_else(|| out_of_range(index, self.indices.len()))?;
        self.inner.get(inner_index)
    }
}
