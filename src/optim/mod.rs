//! Optimizers and learning-rate schedulers

mod adam;
mod adamw;
mod optimizer;
mod scheduler;
mod sgd;

pub use adam::Adam;
pub use adamw::AdamW;
pub use optimizer::{Optimizer, OptimizerState};
pub use scheduler::{ConstantLR, CosineAnnealingLR, LRScheduler, StepDecayLR};
pub use sgd::SGD;
