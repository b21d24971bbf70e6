//! Learning rate schedulers
//!
//! Each network in a run owns one scheduler, stepped once per epoch:
//! - `StepDecayLR` - Step decay by factor every N epochs
//! - `CosineAnnealingLR` - Smooth cosine decay
//! - `ConstantLR` - Fixed rate

mod constant;
mod cosine_annealing;
mod step_decay;

#[cfg(test)]
mod tests;

pub use constant::ConstantLR;
pub use cosine_annealing::CosineAnnealingLR;
pub use step_decay::StepDecayLR;

use crate::optim::Optimizer;

/// Learning rate scheduler trait
pub trait LRScheduler {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Step the scheduler (called once per epoch)
    fn step(&mut self);

    /// Apply the current learning rate to an optimizer
    fn apply(&self, optimizer: &mut dyn Optimizer) {
        optimizer.set_lr(self.get_lr());
    }
}
