//! Fully connected layer

use crate::autograd::{add_bias, matmul};
use crate::Tensor;
use rand::Rng;

/// y = x W + b, with W stored row-major as (in_features x out_features)
pub struct Linear {
    pub weight: Tensor,
    pub bias: Tensor,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Xavier-uniform weights, zero bias
    pub fn new(in_features: usize, out_features: usize, rng: &mut impl Rng) -> Self {
        Self::scaled(in_features, out_features, 1.0, rng)
    }

    /// Xavier-uniform weights multiplied by `gain`
    pub fn scaled(in_features: usize, out_features: usize, gain: f32, rng: &mut impl Rng) -> Self {
        Self {
            weight: xavier(in_features, out_features, gain, rng),
            bias: Tensor::zeros(out_features, true),
            in_features,
            out_features,
        }
    }

    /// Forward pass over `rows` stacked inputs
    pub fn forward(&self, x: &Tensor, rows: usize) -> Tensor {
        let projected = matmul(x, &self.weight, rows, self.in_features, self.out_features);
        add_bias(&projected, &self.bias, rows, self.out_features)
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub(crate) fn named_parameters(&self, prefix: &str) -> Vec<(String, &Tensor)> {
        vec![
            (format!("{prefix}.weight"), &self.weight),
            (format!("{prefix}.bias"), &self.bias),
        ]
    }

    pub(crate) fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }
}

/// Xavier-uniform initialized (rows x cols) weight
pub(crate) fn xavier(rows: usize, cols: usize, gain: f32, rng: &mut impl Rng) -> Tensor {
    let bound = gain * (6.0 / (rows + cols).max(1) as f32).sqrt();
    let data = (0..rows * cols)
        .map(|_| if bound > 0.0 { rng.gen_range(-bound..bound) } else { 0.0 })
        .collect();
    Tensor::from_vec(data, true)
}
