//! Stochastic Gradient Descent optimizer

use super::optimizer::{from_buffers, to_buffers};
use super::{Optimizer, OptimizerState};
use crate::{Result, Tensor};
use ndarray::Array1;
use std::collections::BTreeMap;

/// SGD optimizer with optional momentum
pub struct SGD {
    lr: f32,
    momentum: f32,
    steps: u64,
    velocities: Vec<Option<Array1<f32>>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            momentum,
            steps: 0,
            velocities: Vec::new(),
        }
    }
}

impl Optimizer for SGD {
    fn step_refs(&mut self, params: &mut [&mut Tensor]) {
        if self.velocities.len() < params.len() {
            self.velocities.resize(params.len(), None);
        }
        self.steps += 1;

        for (i, param) in params.iter_mut().enumerate() {
            let Some(grad) = param.grad() else { continue };

            if self.momentum > 0.0 {
                // v = momentum * v - lr * grad
                let velocity = match &self.velocities[i] {
                    Some(v) => v * self.momentum - &grad * self.lr,
                    None => &grad * (-self.lr),
                };
                let updated = param.data() + &velocity;
                *param.data_mut() = updated;
                self.velocities[i] = Some(velocity);
            } else {
                // param -= lr * grad
                let updated = param.data() - &(&grad * self.lr);
                *param.data_mut() = updated;
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn step_count(&self) -> u64 {
        self.steps
    }

    fn state(&self) -> OptimizerState {
        let mut buffers = BTreeMap::new();
        buffers.insert("velocity".to_string(), to_buffers(&self.velocities));
        OptimizerState {
            name: "sgd".to_string(),
            lr: self.lr,
            step_count: self.steps,
            buffers,
        }
    }

    fn load_state(&mut self, state: &OptimizerState) -> Result<()> {
        state.check_name("sgd")?;
        self.lr = state.lr;
        self.steps = state.step_count;
        self.velocities = from_buffers(state, "velocity");
        Ok(())
    }
}
