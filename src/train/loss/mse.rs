//! Mean Squared Error Loss

use super::LossFn;
use crate::autograd::{mean, mul, sub};
use crate::Tensor;

/// Mean Squared Error Loss
///
/// L = mean((predictions - targets)²)
///
/// # Example
///
/// ```
/// use layoutgan::train::{LossFn, MSELoss};
/// use layoutgan::Tensor;
///
/// let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
/// let target = Tensor::from_vec(vec![1.5, 2.5, 3.5], false);
///
/// let loss = MSELoss.forward(&pred, &target);
/// assert!((loss.item() - 0.25).abs() < 1e-6);
/// ```
pub struct MSELoss;

impl LossFn for MSELoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );
        let diff = sub(predictions, targets);
        mean(&mul(&diff, &diff))
    }

    fn name(&self) -> &str {
        "MSE"
    }
}
