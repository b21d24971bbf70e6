//! Graph datasets: JSON files and a synthetic demo set

use super::batch::{GraphBatch, LayoutShape, COORD_DIM, NUM_CLASSES};
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fs;
use std::path::Path;

/// One graph as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// One `[x, y]` pair per node
    pub coordinates: Vec<[f32; COORD_DIM]>,
    /// Square 0/1 matrix over the nodes
    pub adjacency: Vec<Vec<u8>>,
    pub label: usize,
}

impl GraphRecord {
    pub fn num_nodes(&self) -> usize {
        self.coordinates.len()
    }

    fn check(&self, index: usize, max_nodes: usize) -> Result<()> {
        let n = self.num_nodes();
        if n > max_nodes {
            return Err(Error::InvalidBatch(format!(
                "graph {index} has {n} nodes, more than max_nodes = {max_nodes}"
            )));
        }
        if self.adjacency.len() != n || self.adjacency.iter().any(|row| row.len() != n) {
            return Err(Error::InvalidBatch(format!(
                "graph {index}: adjacency must be {n}x{n}"
            )));
        }
        if self.adjacency.iter().flatten().any(|&a| a > 1) {
            return Err(Error::InvalidBatch(format!(
                "graph {index}: adjacency entries must be 0 or 1"
            )));
        }
        if let Some(node) = self.coordinates.iter().position(|c| c == &[0.0; COORD_DIM]) {
            return Err(Error::InvalidBatch(format!(
                "graph {index}: node {node} sits at the origin and would read as padding"
            )));
        }
        if self.label >= NUM_CLASSES {
            return Err(Error::InvalidBatch(format!(
                "graph {index}: label {} outside 0..{NUM_CLASSES}",
                self.label
            )));
        }
        Ok(())
    }
}

/// A list of graphs sharing one padding size
#[derive(Debug, Clone)]
pub struct GraphDataset {
    records: Vec<GraphRecord>,
    max_nodes: usize,
}

impl GraphDataset {
    /// Wrap records, checking each against `max_nodes`
    pub fn new(records: Vec<GraphRecord>, max_nodes: usize) -> Result<Self> {
        for (i, record) in records.iter().enumerate() {
            record.check(i, max_nodes)?;
        }
        Ok(Self { records, max_nodes })
    }

    /// Load a JSON array of [`GraphRecord`]s
    pub fn from_json_file(path: impl AsRef<Path>, max_nodes: usize) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("reading dataset {}", path.display()), e))?;
        let records: Vec<GraphRecord> = serde_json::from_str(&content)?;
        Self::new(records, max_nodes)
    }

    /// Labelled demo graphs: rings are class 0, stars are class 1
    ///
    /// Node counts vary between 3 and `max_nodes`; positions are jittered.
    pub fn synthetic(count: usize, max_nodes: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let records = (0..count)
            .map(|i| {
                let label = i % NUM_CLASSES;
                let n = if max_nodes <= 3 {
                    max_nodes
                } else {
                    rng.gen_range(3..=max_nodes)
                };
                if label == 0 {
                    ring(n, &mut rng)
                } else {
                    star(n, &mut rng)
                }
            })
            .collect();
        Self { records, max_nodes }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    pub fn records(&self) -> &[GraphRecord] {
        &self.records
    }

    /// Pad the selected records into one batch
    pub fn collate(&self, indices: &[usize]) -> Result<GraphBatch> {
        let shape = LayoutShape::new(indices.len(), self.max_nodes);
        let n = self.max_nodes;
        let mut layouts = vec![0.0; shape.layout_len()];
        let mut adjacency = vec![0.0; shape.adjacency_len()];
        let mut labels = Vec::with_capacity(indices.len());

        for (b, &idx) in indices.iter().enumerate() {
            let record = self.records.get(idx).ok_or_else(|| {
                Error::InvalidBatch(format!("index {idx} outside dataset of {}", self.len()))
            })?;
            for (i, coord) in record.coordinates.iter().enumerate() {
                let at = b * shape.layout_stride() + i * COORD_DIM;
                layouts[at..at + COORD_DIM].copy_from_slice(coord);
            }
            for (i, row) in record.adjacency.iter().enumerate() {
                for (j, &a) in row.iter().enumerate() {
                    adjacency[b * shape.adjacency_stride() + i * n + j] = f32::from(a);
                }
            }
            labels.push(record.label);
        }

        GraphBatch::new(layouts, adjacency, labels, shape)
    }
}

fn jitter(rng: &mut StdRng) -> f32 {
    rng.gen_range(-0.05..0.05)
}

fn ring(n: usize, rng: &mut StdRng) -> GraphRecord {
    let radius = rng.gen_range(0.5..0.8);
    let coordinates = (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f32 / n as f32;
            [
                radius * angle.cos() + jitter(rng),
                radius * angle.sin() + jitter(rng),
            ]
        })
        .collect();
    let mut adjacency = vec![vec![0u8; n]; n];
    if n > 1 {
        for i in 0..n {
            let j = (i + 1) % n;
            if i != j {
                adjacency[i][j] = 1;
                adjacency[j][i] = 1;
            }
        }
    }
    GraphRecord {
        coordinates,
        adjacency,
        label: 0,
    }
}

fn star(n: usize, rng: &mut StdRng) -> GraphRecord {
    let radius = rng.gen_range(0.5..0.8);
    let mut coordinates = Vec::with_capacity(n);
    if n > 0 {
        // keep the hub off the origin so it is not read as padding
        coordinates.push([0.1 + jitter(rng), 0.1 + jitter(rng)]);
    }
    for i in 1..n {
        let angle = 2.0 * PI * i as f32 / (n - 1) as f32;
        coordinates.push([
            radius * angle.cos() + jitter(rng),
            radius * angle.sin() + jitter(rng),
        ]);
    }
    let mut adjacency = vec![vec![0u8; n]; n];
    for i in 1..n {
        adjacency[0][i] = 1;
        adjacency[i][0] = 1;
    }
    GraphRecord {
        coordinates,
        adjacency,
        label: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_synthetic_is_deterministic_and_balanced() {
        let a = GraphDataset::synthetic(10, 8, 7);
        let b = GraphDataset::synthetic(10, 8, 7);
        assert_eq!(a.records(), b.records());
        let ones = a.records().iter().filter(|r| r.label == 1).count();
        assert_eq!(ones, 5);
        assert!(a.records().iter().all(|r| (3..=8).contains(&r.num_nodes())));
    }

    #[test]
    fn test_collate_pads_and_preserves_node_counts() {
        let dataset = GraphDataset::synthetic(6, 9, 1);
        let batch = dataset.collate(&[0, 1, 2, 3]).unwrap();
        let records = &dataset.records()[..4];
        let expected: Vec<usize> = records.iter().map(|r| r.num_nodes()).collect();
        assert_eq!(batch.num_nodes(), expected);
        assert_eq!(batch.layouts.len(), 4 * 9 * 2);
        assert_eq!(batch.adjacency.len(), 4 * 9 * 9);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"coordinates":[[0.5,0.5],[-0.5,0.2]],"adjacency":[[0,1],[1,0]],"label":1}}]"#
        )
        .unwrap();
        let dataset = GraphDataset::from_json_file(file.path(), 4).unwrap();
        assert_eq!(dataset.len(), 1);
        let batch = dataset.collate(&[0]).unwrap();
        assert_eq!(batch.num_nodes(), vec![2]);
        assert_eq!(batch.labels, vec![1]);
    }

    #[test]
    fn test_rejects_oversized_graph() {
        let record = GraphRecord {
            coordinates: vec![[1.0, 1.0]; 5],
            adjacency: vec![vec![0; 5]; 5],
            label: 0,
        };
        assert!(GraphDataset::new(vec![record], 4).is_err());
    }

    #[test]
    fn test_rejects_node_at_origin() {
        let record = GraphRecord {
            coordinates: vec![[1.0, 1.0], [0.0, 0.0]],
            adjacency: vec![vec![0; 2]; 2],
            label: 0,
        };
        assert!(GraphDataset::new(vec![record], 4).is_err());
    }
}
