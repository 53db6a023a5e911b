use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::dataset::{Dataset, SharedDataset};
use crate::error::Result;

/// A mini-batch of samples, split into inputs and targets.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<Vec<f64>>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Groups a dataset into fixed-size batches.
///
/// With `shuffle`, every call to [`DataLoader::epoch`] draws a fresh order
/// from the loader's seeded RNG. With `drop_last`, a final batch smaller
/// than `batch_size` is skipped so every batch has the same size.
pub struct DataLoader {
    dataset: SharedDataset,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    rng: StdRng,
}

impl DataLoader {
    /// # Panics
    /// Panics if `batch_size == 0`.
    pub fn new(dataset: SharedDataset, batch_size: usize, shuffle: bool, drop_last: bool, seed: u64) -> DataLoader {
        assert!(batch_size > 0, "batch_size must be at least 1");
        DataLoader {
            dataset,
            batch_size,
            shuffle,
            drop_last,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn dataset(&self) -> &dyn Dataset {
        self.dataset.as_ref()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Batches produced by one pass.
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    /// Samples covered by one pass.
    pub fn num_samples(&self) -> usize {
        if self.drop_last {
            self.num_batches() * self.batch_size
        } else {
            self.dataset.len()
        }
    }

    /// One pass in training order, shuffled if the loader shuffles.
    pub fn epoch(&mut self) -> Batches<'_> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            order.shuffle(&mut self.rng);
        }
        self.batches(order)
    }

    /// One pass in index order, regardless of `shuffle`.
    pub fn in_order(&self) -> Batches<'_> {
        self.batches((0..self.dataset.len()).collect())
    }

    fn batches(&self, order: Vec<usize>) -> Batches<'_> {
        Batches {
            dataset: self.dataset.as_ref(),
            order,
            batch_size: self.batch_size,
            drop_last: self.drop_last,
            position: 0,
        }
    }
}

/// Iterator over the batches of one pass.
pub struct Batches<'a> {
    dataset: &'a dyn Dataset,
    order: Vec<usize>,
    batch_size: usize,
    drop_last: bool,
    position: usize,
}

impl Iterator for Batches<'_> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.order.len() - self.position;
        if remaining == 0 || (self.drop_last && remaining < self.batch_size) {
            return None;
        }
        let end = self.position + remaining.min(self.batch_size);
        let indices = &self.order[self.position..end];
        self.position = end;

        let mut batch = Batch {
            inputs: Vec::with_capacity(indices.len()),
            targets: Vec::with_capacity(indices.len()),
        };
        for &index in indices {
            match self.dataset.get(index) {
                Ok(sample) => {
                    batch.inputs.push(sample.input);
                    batch.targets.push(sample.target);
                }
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::{Sample, VecDataset};
    use std::sync::Arc;

    fn loader(n: usize, batch_size: usize, shuffle: bool, drop_last: bool) -> DataLoader {
        let data = VecDataset::new((0..n).map(|i| Sample::new(vec![i as f64], vec![0.0])).collect());
        DataLoader::new(Arc::new(data), batch_size, shuffle, drop_last, 5)
    }

    fn firsts(batches: Batches<'_>) -> Vec<Vec<f64>> {
        batches.map(|b| b.unwrap().inputs.iter().map(|x| x[0]).collect()).collect()
    }

    #[test]
    fn drop_last_skips_short_batch() {
        let l = loader(10, 4, false, true);
        assert_eq!(l.num_batches(), 2);
        assert_eq!(l.num_samples(), 8);
        assert_eq!(firsts(l.in_order()), vec![vec![0.0, 1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0, 7.0]]);
    }

    #[test]
    fn keep_last_emits_short_batch() {
        let l = loader(10, 4, false, false);
        assert_eq!(l.num_batches(), 3);
        assert_eq!(firsts(l.in_order()).last().unwrap(), &vec![8.0, 9.0]);
    }

    #[test]
    fn shuffled_epochs_cover_every_sample_once() {
        let mut l = loader(12, 3, true, true);
        let first: Vec<f64> = firsts(l.epoch()).concat();
        let second: Vec<f64> = firsts(l.epoch()).concat();

        let mut sorted = first.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(sorted, (0..12).map(|i| i as f64).collect::<Vec<_>>());
        assert_ne!(first, second);
    }

    #[test]
    fn in_order_is_repeatable_on_shuffling_loader() {
        let l = loader(9, 2, true, true);
        assert_eq!(firsts(l.in_order()), firsts(l.in_order()));
    }

    #[test]
    #[should_panic(expected = "batch_size must be at least 1")]
    fn zero_batch_size_panics() {
        loader(4, 0, false, true);
    }
}
