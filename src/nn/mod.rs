//! Network and renderer contracts used by the training loops
//!
//! The loops only see the traits in this module. The MLP networks and the
//! splat renderer are small reference implementations; any type implementing
//! the traits can replace them.

mod classifier;
mod critic;
mod generator;
mod linear;
mod render;

pub use classifier::MlpClassifier;
pub use critic::MlpCritic;
pub use generator::MlpGenerator;
pub use linear::Linear;
pub use render::SplatRenderer;

use crate::autograd::no_grad;
use crate::data::LayoutShape;
use crate::{Error, Result, Tensor};
use image::GrayImage;

/// A collection of trainable parameters
///
/// `named_parameters` and `parameters_mut` must list parameters in the same
/// order; optimizers and checkpoints rely on it.
pub trait Module {
    fn named_parameters(&self) -> Vec<(String, &Tensor)>;

    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// Switch between training and inference behaviour
    fn set_training(&mut self, _training: bool) {}

    fn parameters(&self) -> Vec<&Tensor> {
        self.named_parameters()
            .into_iter()
            .map(|(_, t)| t)
            .collect()
    }

    fn zero_grad(&self) {
        for param in self.parameters() {
            param.zero_grad();
        }
    }

    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|t| t.len()).sum()
    }
}

/// Produces a layout conditioned on a graph's structure
pub trait Generator: Module {
    fn noise_dim(&self) -> usize;

    /// Map noise `[B, Z]`, conditioning layout `[B, N, D]` and adjacency
    /// `[B, N, N]` to a layout of the same padded shape
    fn generate(
        &self,
        noise: &Tensor,
        layout: &Tensor,
        adjacency: &Tensor,
        num_nodes: &[usize],
        shape: LayoutShape,
    ) -> Tensor;
}

/// Gradients of the summed critic score w.r.t. both critic inputs
pub struct InputGradients {
    /// `[B, N, D]`
    pub layout: Tensor,
    /// `[B, N, N]`
    pub adjacency: Tensor,
}

/// Scores (layout, adjacency) pairs; higher means more real
pub trait Critic: Module {
    /// One score per graph, `[B]`
    fn score(&self, layout: &Tensor, adjacency: &Tensor, shape: LayoutShape) -> Tensor;

    /// ∂Σscore/∂inputs, recorded as a differentiable function of the critic
    /// parameters so a penalty on them can be backpropagated
    fn input_gradients(
        &self,
        layout: &Tensor,
        adjacency: &Tensor,
        shape: LayoutShape,
    ) -> InputGradients;
}

/// Judges rendered layouts
pub trait Classifier: Module {
    /// Raw logits `[B, NUM_CLASSES]` for images `[B, S*S]`
    fn classify(&self, images: &Tensor, batch_size: usize) -> Tensor;
}

/// Rasterizes layouts into grayscale images
pub trait Renderer {
    /// Side length S of the square output
    fn image_size(&self) -> usize;

    /// Differentiable rendering, `[B, S*S]` with pixels in [0, 1]
    fn render(
        &self,
        layouts: &Tensor,
        adjacency: &Tensor,
        num_nodes: &[usize],
        shape: LayoutShape,
    ) -> Tensor;

    /// Render graph `index` of a batch to an image file buffer
    fn snapshot(
        &self,
        layouts: &Tensor,
        adjacency: &Tensor,
        num_nodes: &[usize],
        shape: LayoutShape,
        index: usize,
    ) -> Result<GrayImage> {
        if index >= shape.batch_size {
            return Err(Error::InvalidBatch(format!(
                "snapshot index {index} outside batch of {}",
                shape.batch_size
            )));
        }
        let size = self.image_size();
        let pixels = no_grad(|| self.render(layouts, adjacency, num_nodes, shape));
        let start = index * size * size;
        let bytes = pixels.data().as_slice().map_or_else(Vec::new, |all| {
            all[start..start + size * size]
                .iter()
                .map(|&p| (p.clamp(0.0, 1.0) * 255.0).round() as u8)
                .collect()
        });
        GrayImage::from_raw(size as u32, size as u32, bytes).ok_or_else(|| {
            Error::shape(
                "snapshot",
                vec![size, size],
                vec![pixels.len() / shape.batch_size.max(1)],
            )
        })
    }
}
