pub mod dataset;
pub mod fen_images;
pub mod image;
pub mod loader;
pub mod orientation;
pub mod partition;

pub use dataset::{Dataset, Sample, SharedDataset, Subset, VecDataset};
pub use fen_images::FenImageDataset;
pub use loader::{Batch, Batches, DataLoader};
pub use orientation::OrientationDataset;
pub use partition::{random_split, test_size, PartitionStrategy};
