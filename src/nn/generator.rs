//! Per-node MLP generator

use super::linear::{xavier, Linear};
use super::{Generator, Module};
use crate::autograd::{add, matmul, mul, tanh};
use crate::data::LayoutShape;
use crate::Tensor;
use rand::Rng;

/// Moves each real node by an offset predicted from the graph's noise
/// vector, the node's own coordinates and its adjacency row
///
/// `out = mask ⊙ (layout + W_o tanh(E·(z W_z + b_z) + layout W_l + adj W_a) + b_o)`
/// where `E` copies each graph's noise projection to its nodes and `mask`
/// zeroes padded rows.
pub struct MlpGenerator {
    noise_proj: Linear,
    w_layout: Tensor,
    w_adjacency: Tensor,
    out: Linear,
    max_nodes: usize,
    coord_dim: usize,
    hidden_dim: usize,
}

impl MlpGenerator {
    pub fn new(
        max_nodes: usize,
        coord_dim: usize,
        noise_dim: usize,
        hidden_dim: usize,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            noise_proj: Linear::new(noise_dim, hidden_dim, rng),
            w_layout: xavier(coord_dim, hidden_dim, 1.0, rng),
            w_adjacency: xavier(max_nodes, hidden_dim, 1.0, rng),
            // small offsets at start so the first outputs stay near the input
            out: Linear::scaled(hidden_dim, coord_dim, 0.1, rng),
            max_nodes,
            coord_dim,
            hidden_dim,
        }
    }
}

/// (B*N x B) matrix with E[b*N + n, b] = 1
fn node_expansion(batch_size: usize, max_nodes: usize) -> Tensor {
    let mut data = vec![0.0; batch_size * max_nodes * batch_size];
    for b in 0..batch_size {
        for n in 0..max_nodes {
            data[(b * max_nodes + n) * batch_size + b] = 1.0;
        }
    }
    Tensor::from_vec(data, false)
}

/// 1 for every coordinate of a real node, 0 for padding
fn node_mask(num_nodes: &[usize], shape: LayoutShape) -> Tensor {
    let mut data = vec![0.0; shape.layout_len()];
    for (b, &count) in num_nodes.iter().enumerate() {
        let start = b * shape.layout_stride();
        let real = count.min(shape.max_nodes) * shape.coord_dim;
        data[start..start + real].fill(1.0);
    }
    Tensor::from_vec(data, false)
}

impl Module for MlpGenerator {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        let mut params = self.noise_proj.named_parameters("noise_proj");
        params.push(("layout_proj.weight".to_string(), &self.w_layout));
        params.push(("adjacency_proj.weight".to_string(), &self.w_adjacency));
        params.extend(self.out.named_parameters("out"));
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.noise_proj.parameters_mut();
        params.push(&mut self.w_layout);
        params.push(&mut self.w_adjacency);
        params.extend(self.out.parameters_mut());
        params
    }
}

impl Generator for MlpGenerator {
    fn noise_dim(&self) -> usize {
        self.noise_proj.in_features()
    }

    fn generate(
        &self,
        noise: &Tensor,
        layout: &Tensor,
        adjacency: &Tensor,
        num_nodes: &[usize],
        shape: LayoutShape,
    ) -> Tensor {
        assert_eq!(shape.max_nodes, self.max_nodes, "generator size mismatch");
        assert_eq!(shape.coord_dim, self.coord_dim);
        let b = shape.batch_size;
        let rows = b * self.max_nodes;
        let h = self.hidden_dim;

        let noise_h = self.noise_proj.forward(noise, b);
        let per_node = matmul(&node_expansion(b, self.max_nodes), &noise_h, rows, b, h);
        let layout_h = matmul(layout, &self.w_layout, rows, self.coord_dim, h);
        let adjacency_h = matmul(adjacency, &self.w_adjacency, rows, self.max_nodes, h);

        let hidden = tanh(&add(&add(&per_node, &layout_h), &adjacency_h));
        let offset = self.out.forward(&hidden, rows);
        mul(&add(layout, &offset), &node_mask(num_nodes, shape))
    }
}
