use std::path::{Path, PathBuf};

use crate::board::fen::encode_placement;
use crate::data::dataset::{Dataset, Sample};
use crate::data::image::{list_images, load_grayscale};
use crate::error::{Result, TrainError};

/// Board images labelled by the position they show.
///
/// File stems carry the FEN piece placement with `-` in place of `/`,
/// e.g. `rnbqkbnr-pppppppp-8-8-8-8-PPPPPPPP-RNBQKBNR.png`. Every name is
/// validated when the dataset is opened.
pub struct FenImageDataset {
    files: Vec<PathBuf>,
    placements: Vec<String>,
    width: u32,
    height: u32,
}

/// FEN piece placement encoded in an image file name.
pub fn placement_from_file_name(path: &Path) -> Result<String> {
    let stem = path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| TrainError::dataset(format!("unreadable file name {}", path.display())))?;
    // Allow a suffix such as `..._0042` to disambiguate duplicate positions.
    let placement = stem.split('_').next().unwrap_or(stem).replace('-', "/");
    encode_placement(&placement)
        .map_err(|e| TrainError::dataset(format!("{}: {}", path.display(), e)))?;
    Ok(placement)
}

impl FenImageDataset {
    pub fn open(dir: &Path, max: Option<usize>, width: u32, height: u32) -> Result<FenImageDataset> {
        let files = list_images(dir, max)?;
        let placements = files.iter()
            .map(|f| placement_from_file_name(f))
            .collect::<Result<Vec<_>>>()?;
        Ok(FenImageDataset { files, placements, width, height })
    }
}

impl Dataset for FenImageDataset {
    fn len(&self) -> usize {
        self.files.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let input = load_grayscale(&self.files[index], self.width, self.height)?;
        let target = encode_placement(&self.placements[index])?;
        Ok(Sample::new(input, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen::{decode_placement, BOARD_TENSOR_LEN};

    #[test]
    fn file_names_become_targets() {
        let dir = tempfile::tempdir().unwrap();
        image::GrayImage::new(8, 8)
            .save(dir.path().join("8-8-8-4k3-8-8-8-4K3_01.png"))
            .unwrap();

        let ds = FenImageDataset::open(dir.path(), None, 8, 8).unwrap();
        let sample = ds.get(0).unwrap();
        assert_eq!(sample.input.len(), 64);
        assert_eq!(sample.target.len(), BOARD_TENSOR_LEN);
        assert_eq!(decode_placement(&sample.target).unwrap(), "8/8/8/4k3/8/8/8/4K3");
    }

    #[test]
    fn invalid_names_fail_at_open() {
        let dir = tempfile::tempdir().unwrap();
        image::GrayImage::new(8, 8).save(dir.path().join("not-a-board.png")).unwrap();
        assert!(matches!(FenImageDataset::open(dir.path(), None, 8, 8), Err(TrainError::Dataset(_))));
    }
}
