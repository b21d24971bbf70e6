//! Cross Entropy Loss over a batch of logits

use super::LossFn;
use crate::autograd::{tracks, BackwardOp};
use crate::Tensor;
use ndarray::Array1;
use std::rc::Rc;

/// Cross Entropy Loss averaged over a batch
///
/// `predictions` holds `[B, num_classes]` raw logits row-major and `targets`
/// holds one class index per row (stored as `f32`).
///
/// L = mean_b(-log softmax(logits_b)[target_b])
pub struct CrossEntropyLoss {
    num_classes: usize,
}

impl CrossEntropyLoss {
    pub fn new(num_classes: usize) -> Self {
        Self { num_classes }
    }

    /// Compute softmax: exp(x_i) / sum(exp(x_j))
    pub(crate) fn softmax(x: &[f32]) -> Vec<f32> {
        let max = x.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let exp_x: Vec<f32> = x.iter().map(|v| (v - max).exp()).collect();
        let sum: f32 = exp_x.iter().sum();
        exp_x.into_iter().map(|e| e / sum).collect()
    }

    /// Class indices as a target tensor
    pub fn targets(labels: &[usize]) -> Tensor {
        Tensor::from_vec(labels.iter().map(|&l| l as f32).collect(), false)
    }
}

impl LossFn for CrossEntropyLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        let c = self.num_classes;
        let batch = targets.len();
        assert_eq!(predictions.len(), batch * c, "expected {batch}x{c} logits");

        let logits = predictions.to_vec();
        let mut loss = 0.0;
        // d(CE)/d(logits) = (probs - one_hot) / B
        let mut grad = Array1::zeros(batch * c);
        for (b, &target) in targets.data().iter().enumerate() {
            let target = target as usize;
            let probs = Self::softmax(&logits[b * c..(b + 1) * c]);
            loss -= probs[target].max(f32::MIN_POSITIVE).ln();
            for (k, p) in probs.iter().enumerate() {
                let one_hot = if k == target { 1.0 } else { 0.0 };
                grad[b * c + k] = (p - one_hot) / batch.max(1) as f32;
            }
        }
        if batch > 0 {
            loss /= batch as f32;
        }

        let requires_grad = tracks(&[predictions]);
        let mut result = Tensor::from_vec(vec![loss], requires_grad);
        if requires_grad {
            result.set_backward_op(Rc::new(CrossEntropyBackward {
                inputs: [predictions.clone()],
                grad,
            }));
        }
        result
    }

    fn name(&self) -> &str {
        "CrossEntropy"
    }
}

struct CrossEntropyBackward {
    inputs: [Tensor; 1],
    grad: Array1<f32>,
}

impl BackwardOp for CrossEntropyBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad_output: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        vec![Some(&self.grad * grad_output[0])]
    }
}
