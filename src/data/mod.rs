//! Graph batches, datasets and loaders
//!
//! A batch carries padded node coordinates `[B, N, D]`, padded adjacency
//! `[B, N, N]` and one class label per graph. Node counts are never stored;
//! they are recovered from the coordinates with [`GraphBatch::num_nodes`].

mod batch;
mod dataset;
mod loader;

pub use batch::{GraphBatch, LayoutShape, COORD_DIM, NUM_CLASSES};
pub use dataset::{GraphDataset, GraphRecord};
pub use loader::{BatchLoader, GraphLoader};
