//! Adam optimizer

use super::{AdamW, Optimizer, OptimizerState};
use crate::{Result, Tensor};

/// Adam optimizer (Kingma & Ba)
///
/// Shares the moment bookkeeping of [`AdamW`] with weight decay disabled.
pub struct Adam {
    inner: AdamW,
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            inner: AdamW::new(lr, beta1, beta2, epsilon, 0.0),
        }
    }

    /// Create Adam with default parameters
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn step_refs(&mut self, params: &mut [&mut Tensor]) {
        self.inner.step_refs(params);
    }

    fn lr(&self) -> f32 {
        self.inner.lr()
    }

    fn set_lr(&mut self, lr: f32) {
        self.inner.set_lr(lr);
    }

    fn step_count(&self) -> u64 {
        self.inner.step_count()
    }

    fn state(&self) -> OptimizerState {
        self.inner.state_named("adam")
    }

    fn load_state(&mut self, state: &OptimizerState) -> Result<()> {
        self.inner.load_state_named(state, "adam")
    }
}
