use std::path::{Path, PathBuf};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::data::dataset::{Dataset, Sample};
use crate::data::image::{list_images, load_grayscale, rotate_half_turn};
use crate::error::Result;

/// Board images labelled by viewing side.
///
/// Source images are assumed to be drawn from white's side. Each index is
/// assigned a rotation flag once, at construction: rotated samples are
/// turned 180° and get target `1.0` (black's side), the rest keep `0.0`.
pub struct OrientationDataset {
    files: Vec<PathBuf>,
    rotated: Vec<bool>,
    width: u32,
    height: u32,
}

impl OrientationDataset {
    pub fn open(
        dir: &Path,
        max: Option<usize>,
        rotate_probability: f64,
        width: u32,
        height: u32,
        seed: u64,
    ) -> Result<OrientationDataset> {
        let files = list_images(dir, max)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let rotated = files.iter().map(|_| rng.gen_bool(rotate_probability)).collect();
        Ok(OrientationDataset { files, rotated, width, height })
    }

    pub fn rotated_count(&self) -> usize {
        self.rotated.iter().filter(|&&r| r).count()
    }
}

impl Dataset for OrientationDataset {
    fn len(&self) -> usize {
        self.files.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let pixels = load_grayscale(&self.files[index], self.width, self.height)?;
        if self.rotated[index] {
            Ok(Sample::new(rotate_half_turn(&pixels), vec![1.0]))
        } else {
            Ok(Sample::new(pixels, vec![0.0]))
        }
    }
}
