//! Batch loaders

use super::batch::GraphBatch;
use super::dataset::GraphDataset;
use crate::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Source of batches for one pass over a split
pub trait GraphLoader {
    /// Number of batches per pass
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce the batches of one pass
    fn batches(&mut self) -> Result<Vec<GraphBatch>>;
}

/// Fixed-size batches over an in-memory dataset; the last batch may be short
pub struct BatchLoader {
    dataset: GraphDataset,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
}

impl BatchLoader {
    pub fn new(dataset: GraphDataset, batch_size: usize, shuffle: bool, seed: u64) -> Self {
        Self {
            dataset,
            batch_size: batch_size.max(1),
            shuffle,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn dataset(&self) -> &GraphDataset {
        &self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl GraphLoader for BatchLoader {
    fn len(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    fn batches(&mut self) -> Result<Vec<GraphBatch>> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            order.shuffle(&mut self.rng);
        }
        order
            .chunks(self.batch_size)
            .map(|chunk| self.dataset.collate(chunk))
            .collect()
    }
}
