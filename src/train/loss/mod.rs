//! Loss functions for the adversarial and classification objectives

mod cross_entropy;
mod gradient_penalty;
mod mse;
mod wasserstein;

pub use cross_entropy::CrossEntropyLoss;
pub use gradient_penalty::{gradient_penalty, DEFAULT_PENALTY_WEIGHT};
pub use mse::MSELoss;
pub use wasserstein::{MeanGapWasserstein, WassersteinLoss};

use crate::Tensor;

/// Trait for loss functions
pub trait LossFn {
    /// Compute loss given predictions and targets
    ///
    /// Returns a scalar loss tensor wired for backpropagation
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor;

    /// Name of the loss function
    fn name(&self) -> &str;
}
