//! A network bundled with its optimizer and learning-rate schedule

use crate::nn::Module;
use crate::optim::{ConstantLR, LRScheduler, Optimizer};

/// One participant of the adversarial game
///
/// Each player owns its parameters, optimizer state and schedule; nothing is
/// shared between players.
pub struct Player<N: ?Sized> {
    pub net: Box<N>,
    pub optimizer: Box<dyn Optimizer>,
    pub scheduler: Box<dyn LRScheduler>,
}

impl<N: Module + ?Sized> Player<N> {
    pub fn new(
        net: Box<N>,
        optimizer: Box<dyn Optimizer>,
        scheduler: Box<dyn LRScheduler>,
    ) -> Self {
        Self {
            net,
            optimizer,
            scheduler,
        }
    }

    /// Player whose learning rate never changes
    pub fn with_constant_lr(net: Box<N>, optimizer: Box<dyn Optimizer>) -> Self {
        let scheduler = Box::new(ConstantLR::new(optimizer.lr()));
        Self::new(net, optimizer, scheduler)
    }

    pub fn zero_grad(&self) {
        self.net.zero_grad();
    }

    /// Apply one optimizer update from the accumulated gradients
    pub fn step(&mut self) {
        let mut params = self.net.parameters_mut();
        self.optimizer.step_refs(&mut params);
    }

    /// Advance the schedule by one epoch and apply the new rate
    pub fn advance_schedule(&mut self) {
        self.scheduler.step();
        self.scheduler.apply(self.optimizer.as_mut());
    }

    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{backward, sum};
    use crate::nn::{Classifier, MlpClassifier};
    use crate::optim::{StepDecayLR, SGD};
    use crate::Tensor;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_step_and_schedule() {
        let mut rng = StdRng::seed_from_u64(0);
        let net: Box<dyn Classifier> = Box::new(MlpClassifier::new(2, 3, &mut rng));
        let mut player = Player::new(
            net,
            Box::new(SGD::new(0.1, 0.0)),
            Box::new(StepDecayLR::new(0.1, 1, 0.5)),
        );
        let before: Vec<f32> = player.net.parameters()[3].to_vec();

        let images = Tensor::from_vec(vec![1.0; 8], false);
        let logits = player.net.classify(&images, 2);
        player.zero_grad();
        backward(&sum(&logits), None);
        player.step();
        assert_ne!(player.net.parameters()[3].to_vec(), before);
        assert_eq!(player.optimizer.step_count(), 1);

        player.advance_schedule();
        assert!((player.lr() - 0.05).abs() < 1e-7);
    }
}
