//! Wasserstein critic / generator objectives

use crate::autograd::{mean, scale, sub};
use crate::Tensor;

/// Adversarial loss pair for a Wasserstein critic
///
/// Both methods return scalars to minimize.
pub trait WassersteinLoss {
    /// Loss for the critic given real and fake scores
    fn critic_loss(&self, real_scores: &Tensor, fake_scores: &Tensor) -> Tensor;

    /// Loss for the generator given scores of its output
    fn generator_loss(&self, fake_scores: &Tensor) -> Tensor;
}

/// `mean(fake) - mean(real)` for the critic, `-mean(fake)` for the generator
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanGapWasserstein;

impl WassersteinLoss for MeanGapWasserstein {
    fn critic_loss(&self, real_scores: &Tensor, fake_scores: &Tensor) -> Tensor {
        sub(&mean(fake_scores), &mean(real_scores))
    }

    fn generator_loss(&self, fake_scores: &Tensor) -> Tensor {
        scale(&mean(fake_scores), -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_critic_loss_is_mean_gap() {
        let real = Tensor::from_vec(vec![2.0, 4.0], true);
        let fake = Tensor::from_vec(vec![1.0, 0.0, -1.0], true);
        let loss = MeanGapWasserstein.critic_loss(&real, &fake);
        assert_abs_diff_eq!(loss.item(), -3.0, epsilon = 1e-6);

        backward(&loss, None);
        assert_eq!(real.grad().unwrap().to_vec(), vec![-0.5, -0.5]);
        for g in fake.grad().unwrap().iter() {
            assert_abs_diff_eq!(*g, 1.0 / 3.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_generator_loss() {
        let fake = Tensor::from_vec(vec![1.0, 3.0], false);
        let loss = MeanGapWasserstein.generator_loss(&fake);
        assert_abs_diff_eq!(loss.item(), -2.0, epsilon = 1e-6);
    }
}
