//! Periodic PNG snapshots of generated layouts

use crate::data::LayoutShape;
use crate::nn::Renderer;
use crate::{Error, Result, Tensor};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of snapshot `image` taken at `epoch`, `batch`
pub fn snapshot_file_name(epoch: usize, batch: usize, image: usize) -> String {
    format!("epoch_{epoch}_batch_{batch}_image_{image}.png")
}

/// Writes the first few layouts of every `every`-th batch
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
    every: usize,
    count: usize,
}

impl SnapshotWriter {
    /// `every == 0` disables snapshots
    pub fn new(dir: impl AsRef<Path>, every: usize, count: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if every > 0 {
            fs::create_dir_all(&dir)
                .map_err(|e| Error::io(format!("creating {}", dir.display()), e))?;
        }
        Ok(Self { dir, every, count })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Batch 0 is always due when enabled
    pub fn is_due(&self, batch: usize) -> bool {
        self.every > 0 && batch % self.every == 0
    }

    /// Render and save up to `count` graphs of the batch
    #[allow(clippy::too_many_arguments)]
    pub fn write<R: Renderer + ?Sized>(
        &self,
        renderer: &R,
        layouts: &Tensor,
        adjacency: &Tensor,
        num_nodes: &[usize],
        shape: LayoutShape,
        epoch: usize,
        batch: usize,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for i in 0..self.count.min(shape.batch_size) {
            let image = renderer.snapshot(layouts, adjacency, num_nodes, shape, i)?;
            let path = self.dir.join(snapshot_file_name(epoch, batch, i));
            image.save(&path)?;
            written.push(path);
        }
        log::debug!(
            "saved {} snapshots to {}",
            written.len(),
            self.dir.display()
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GraphDataset;
    use crate::nn::SplatRenderer;
    use tempfile::TempDir;

    #[test]
    fn test_schedule() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("snaps"), 10, 3).unwrap();
        assert!(writer.is_due(0));
        assert!(!writer.is_due(5));
        assert!(writer.is_due(20));
        let off = SnapshotWriter::new(dir.path().join("off"), 0, 3).unwrap();
        assert!(!off.is_due(0));
        assert!(!dir.path().join("off").exists());
    }

    #[test]
    fn test_writes_named_pngs() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path(), 1, 3).unwrap();
        let batch = GraphDataset::synthetic(2, 5, 0).collate(&[0, 1]).unwrap();
        let renderer = SplatRenderer::new(8, 0.2, 1.0);

        let (layouts, adjacency) = (&batch.layouts, &batch.adjacency);
        let (num_nodes, shape) = (batch.num_nodes(), batch.shape);
        let paths = writer
            .write(&renderer, layouts, adjacency, &num_nodes, shape, 4, 30)
            .unwrap();
        // only two graphs in the batch
        assert_eq!(paths.len(), 2);
        assert!(dir.path().join("epoch_4_batch_30_image_1.png").exists());
        let img = image::open(&paths[0]).unwrap();
        assert_eq!(img.width(), 8);
    }
}
