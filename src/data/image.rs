//! Board image preprocessing.
//!
//! Images are decoded (PNG/JPEG/BMP/GIF), resized to the configured
//! dimensions, converted to grayscale and normalized to [0, 1].

use std::path::{Path, PathBuf};

use crate::error::{Result, TrainError};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Loads an image file as a flat grayscale vector of length `width * height`.
pub fn load_grayscale(path: &Path, width: u32, height: u32) -> Result<Vec<f64>> {
    let img = image::open(path)?;
    let resized = img.resize_exact(width, height, image::imageops::FilterType::Triangle);
    let gray = resized.to_luma8();
    Ok(gray.pixels().map(|p| p.0[0] as f64 / 255.0).collect())
}

/// Turns a flat row-major image by 180°.
pub fn rotate_half_turn(pixels: &[f64]) -> Vec<f64> {
    pixels.iter().rev().copied().collect()
}

/// Lists the image files directly inside `dir`, sorted by name and capped
/// at `max` entries.
pub fn list_images(dir: &Path, max: Option<usize>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TrainError::dataset(format!("data source {} is not a directory", dir.display())));
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_image = path.is_file()
            && path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if is_image {
            files.push(path);
        }
    }
    files.sort();
    if let Some(max) = max {
        files.truncate(max);
    }
    if files.is_empty() {
        return Err(TrainError::dataset(format!("data source {} contains no images", dir.display())));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_turn_reverses_pixels() {
        assert_eq!(rotate_half_turn(&[0.0, 0.25, 0.5, 1.0]), vec![1.0, 0.5, 0.25, 0.0]);
    }

    #[test]
    fn grayscale_is_normalized_and_resized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("white.png");
        image::GrayImage::from_pixel(8, 8, image::Luma([255u8])).save(&path).unwrap();

        let pixels = load_grayscale(&path, 4, 2).unwrap();
        assert_eq!(pixels.len(), 8);
        assert!(pixels.iter().all(|&p| (p - 1.0).abs() < 1e-9));
    }

    #[test]
    fn listing_skips_other_files_and_caps() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "c.png"] {
            image::GrayImage::new(2, 2).save(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = list_images(dir.path(), Some(2)).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn missing_source_is_a_dataset_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(list_images(&missing, None), Err(TrainError::Dataset(_))));
        assert!(matches!(list_images(dir.path(), None), Err(TrainError::Dataset(_))));
    }
}
