//! Padded graph batch

use crate::{Error, Result, Tensor};

/// Number of coordinates per node
pub const COORD_DIM: usize = 2;

/// Number of classes judged by the classifier
pub const NUM_CLASSES: usize = 2;

/// Dimensions of a padded batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutShape {
    pub batch_size: usize,
    pub max_nodes: usize,
    pub coord_dim: usize,
}

impl LayoutShape {
    pub fn new(batch_size: usize, max_nodes: usize) -> Self {
        Self {
            batch_size,
            max_nodes,
            coord_dim: COORD_DIM,
        }
    }

    /// Coordinates per graph (N * D)
    pub fn layout_stride(&self) -> usize {
        self.max_nodes * self.coord_dim
    }

    /// Adjacency entries per graph (N * N)
    pub fn adjacency_stride(&self) -> usize {
        self.max_nodes * self.max_nodes
    }

    pub fn layout_len(&self) -> usize {
        self.batch_size * self.layout_stride()
    }

    pub fn adjacency_len(&self) -> usize {
        self.batch_size * self.adjacency_stride()
    }
}

/// One batch of padded graphs
#[derive(Debug, Clone)]
pub struct GraphBatch {
    /// Node coordinates, `[B, N, D]` row-major, zero rows for absent nodes
    pub layouts: Tensor,
    /// 0/1 adjacency, `[B, N, N]` row-major
    pub adjacency: Tensor,
    /// Class index per graph
    pub labels: Vec<usize>,
    pub shape: LayoutShape,
}

impl GraphBatch {
    /// Build a batch, rejecting buffers that violate the padding invariants
    pub fn new(
        layouts: Vec<f32>,
        adjacency: Vec<f32>,
        labels: Vec<usize>,
        shape: LayoutShape,
    ) -> Result<Self> {
        let batch = Self {
            layouts: Tensor::from_vec(layouts, false),
            adjacency: Tensor::from_vec(adjacency, false),
            labels,
            shape,
        };
        batch.validate()?;
        Ok(batch)
    }

    pub fn len(&self) -> usize {
        self.shape.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.shape.batch_size == 0
    }

    /// Real node count per graph: rows of the layout with nonzero L2 norm
    pub fn num_nodes(&self) -> Vec<usize> {
        count_nodes(&self.layouts.to_vec(), self.shape)
    }

    /// Check buffer lengths, label range and adjacency padding
    pub fn validate(&self) -> Result<()> {
        let shape = self.shape;
        if self.layouts.len() != shape.layout_len() {
            return Err(Error::shape(
                "layouts",
                vec![shape.batch_size, shape.max_nodes, shape.coord_dim],
                vec![self.layouts.len()],
            ));
        }
        if self.adjacency.len() != shape.adjacency_len() {
            return Err(Error::shape(
                "adjacency",
                vec![shape.batch_size, shape.max_nodes, shape.max_nodes],
                vec![self.adjacency.len()],
            ));
        }
        if self.labels.len() != shape.batch_size {
            return Err(Error::shape(
                "labels",
                vec![shape.batch_size],
                vec![self.labels.len()],
            ));
        }
        if let Some(label) = self.labels.iter().find(|&&l| l >= NUM_CLASSES) {
            return Err(Error::InvalidBatch(format!(
                "label {label} outside 0..{NUM_CLASSES}"
            )));
        }

        let adjacency = self.adjacency.data();
        let n = shape.max_nodes;
        for (b, &count) in self.num_nodes().iter().enumerate() {
            let base = b * shape.adjacency_stride();
            for i in 0..n {
                for j in 0..n {
                    if (i >= count || j >= count) && adjacency[base + i * n + j] != 0.0 {
                        return Err(Error::InvalidBatch(format!(
                            "graph {b} has {count} nodes but adjacency[{i}][{j}] is set"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Count nonzero-norm coordinate rows per graph
pub(crate) fn count_nodes(layouts: &[f32], shape: LayoutShape) -> Vec<usize> {
    let d = shape.coord_dim;
    (0..shape.batch_size)
        .map(|b| {
            (0..shape.max_nodes)
                .filter(|&n| {
                    let start = b * shape.layout_stride() + n * d;
                    layouts[start..start + d].iter().any(|&x| x != 0.0)
                })
                .count()
        })
        .collect()
}
