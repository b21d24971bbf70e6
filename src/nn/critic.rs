//! Single hidden layer critic with analytic input gradients

use super::linear::xavier;
use super::{Critic, InputGradients, Module};
use crate::autograd::{
    add, add_bias, add_scalar, broadcast_rows, matmul, mul, scale, tanh, transposed,
};
use crate::data::LayoutShape;
use crate::Tensor;
use rand::Rng;

/// `score_b = v · tanh(x_b W_x + a_b W_a + c) + d`
///
/// `x_b` is the flattened layout and `a_b` the flattened adjacency of graph b.
pub struct MlpCritic {
    w_layout: Tensor,
    w_adjacency: Tensor,
    hidden_bias: Tensor,
    v: Tensor,
    out_bias: Tensor,
    max_nodes: usize,
    coord_dim: usize,
    hidden_dim: usize,
}

impl MlpCritic {
    pub fn new(max_nodes: usize, coord_dim: usize, hidden_dim: usize, rng: &mut impl Rng) -> Self {
        Self {
            w_layout: xavier(max_nodes * coord_dim, hidden_dim, 1.0, rng),
            w_adjacency: xavier(max_nodes * max_nodes, hidden_dim, 1.0, rng),
            hidden_bias: Tensor::zeros(hidden_dim, true),
            v: xavier(hidden_dim, 1, 1.0, rng),
            out_bias: Tensor::zeros(1, true),
            max_nodes,
            coord_dim,
            hidden_dim,
        }
    }

    fn hidden(&self, layout: &Tensor, adjacency: &Tensor, batch_size: usize) -> Tensor {
        let n = self.max_nodes;
        let (b, h) = (batch_size, self.hidden_dim);
        let from_layout = matmul(layout, &self.w_layout, b, n * self.coord_dim, h);
        let from_adjacency = matmul(adjacency, &self.w_adjacency, b, n * n, h);
        let pre = add(&from_layout, &from_adjacency);
        tanh(&add_bias(&pre, &self.hidden_bias, b, h))
    }
}

impl Module for MlpCritic {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        vec![
            ("layout_proj.weight".to_string(), &self.w_layout),
            ("adjacency_proj.weight".to_string(), &self.w_adjacency),
            ("hidden.bias".to_string(), &self.hidden_bias),
            ("score.weight".to_string(), &self.v),
            ("score.bias".to_string(), &self.out_bias),
        ]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![
            &mut self.w_layout,
            &mut self.w_adjacency,
            &mut self.hidden_bias,
            &mut self.v,
            &mut self.out_bias,
        ]
    }
}

impl Critic for MlpCritic {
    fn score(&self, layout: &Tensor, adjacency: &Tensor, shape: LayoutShape) -> Tensor {
        assert_eq!(shape.max_nodes, self.max_nodes, "critic size mismatch");
        let b = shape.batch_size;
        let hidden = self.hidden(layout, adjacency, b);
        let raw = matmul(&hidden, &self.v, b, self.hidden_dim, 1);
        add_bias(&raw, &self.out_bias, b, 1)
    }

    fn input_gradients(
        &self,
        layout: &Tensor,
        adjacency: &Tensor,
        shape: LayoutShape,
    ) -> InputGradients {
        let b = shape.batch_size;
        let n = self.max_nodes;
        let h = self.hidden_dim;
        let hidden = self.hidden(layout, adjacency, b);

        // ∂score_b/∂pre_bh = v_h (1 - tanh²)
        let slope = add_scalar(&scale(&mul(&hidden, &hidden), -1.0), 1.0);
        let weighted = mul(&slope, &broadcast_rows(&self.v, b));

        let layout_cols = n * self.coord_dim;
        let w_layout_t = transposed(&self.w_layout, layout_cols, h);
        let w_adjacency_t = transposed(&self.w_adjacency, n * n, h);
        InputGradients {
            layout: matmul(&weighted, &w_layout_t, b, h, layout_cols),
            adjacency: matmul(&weighted, &w_adjacency_t, b, h, n * n),
        }
    }
}
